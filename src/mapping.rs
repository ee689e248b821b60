// Local projections from the service's snake_case records into the shapes
// the browser client keeps. Nothing here touches the network.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::api::{LoginResponse, TreeRecord};

/// Fixed creation time written into the previewed frontend user.
pub const FRONTEND_USER_CREATED_AT: &str = "2025-11-09T00:00:00.000Z";

/// The `user` object a browser client stores after login.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrontendUser {
    pub id: String,
    pub email: String,
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

impl FrontendUser {
    pub fn from_login(login: &LoginResponse, email: &str) -> Self {
        FrontendUser {
            id: display_value(&login.user_id),
            email: email.to_string(),
            display_name: login.username.clone(),
            created_at: FRONTEND_USER_CREATED_AT.to_string(),
        }
    }
}

/// A tree as the browser client represents it. The camelCase aliases sit
/// next to the snake_case names and always carry the same value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrontendTree {
    pub id: String,
    pub user_id: Option<Value>,
    #[serde(rename = "ownerId")]
    pub owner_id: Option<Value>,
    pub species: Option<Value>,
    #[serde(rename = "healthIndex")]
    pub health_index: Option<Value>,
    pub health_score: Option<Value>,
    #[serde(rename = "plantedAt")]
    pub planted_at: Option<Value>,
    pub planting_date: Option<Value>,
    pub current_value: Option<Value>,
}

impl From<&TreeRecord> for FrontendTree {
    fn from(tree: &TreeRecord) -> Self {
        FrontendTree {
            id: display_value(&tree.id),
            user_id: tree.user_id.clone(),
            owner_id: tree.user_id.clone(),
            species: tree.species.clone(),
            health_index: tree.health_score.clone(),
            health_score: tree.health_score.clone(),
            planted_at: tree.planting_date.clone(),
            planting_date: tree.planting_date.clone(),
            current_value: tree.current_value.clone(),
        }
    }
}

impl FrontendTree {
    /// Field names and rendered values, in display order.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("id", self.id.clone()),
            ("user_id", display_field(self.user_id.as_ref())),
            ("ownerId", display_field(self.owner_id.as_ref())),
            ("species", display_field(self.species.as_ref())),
            ("healthIndex", display_field(self.health_index.as_ref())),
            ("health_score", display_field(self.health_score.as_ref())),
            ("plantedAt", display_field(self.planted_at.as_ref())),
            ("planting_date", display_field(self.planting_date.as_ref())),
            ("current_value", display_field(self.current_value.as_ref())),
        ]
    }
}

/// The backend fields shown on the left-hand side of the mapping report.
pub fn backend_fields(tree: &TreeRecord) -> Vec<(&'static str, String)> {
    vec![
        ("id", display_value(&tree.id)),
        ("user_id", display_field(tree.user_id.as_ref())),
        ("species", display_field(tree.species.as_ref())),
        ("health_score", display_field(tree.health_score.as_ref())),
        ("planting_date", display_field(tree.planting_date.as_ref())),
        ("current_value", display_field(tree.current_value.as_ref())),
    ]
}

/// Find the tree whose id equals `id`. Numbers compare by value, so `42`
/// matches `42.0`; a numeric id never matches its string spelling.
pub fn find_tree<'a>(trees: &'a [TreeRecord], id: &Value) -> Option<&'a TreeRecord> {
    trees.iter().find(|tree| ids_match(&tree.id, id))
}

fn ids_match(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x == y || x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Health label used by the browser client's health badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthBand {
    Excellent,
    Good,
    Fair,
    NeedsCare,
    Critical,
}

impl HealthBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            HealthBand::Excellent
        } else if score >= 70.0 {
            HealthBand::Good
        } else if score >= 50.0 {
            HealthBand::Fair
        } else if score >= 30.0 {
            HealthBand::NeedsCare
        } else {
            HealthBand::Critical
        }
    }
}

impl fmt::Display for HealthBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HealthBand::Excellent => "Excellent",
            HealthBand::Good => "Good",
            HealthBand::Fair => "Fair",
            HealthBand::NeedsCare => "Needs Care",
            HealthBand::Critical => "Critical",
        })
    }
}

/// `"abc"` renders as `abc`, numbers as themselves, `null` as `null`.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `display_value` for an optional field, `None` rendering as `null`.
pub fn display_field(value: Option<&Value>) -> String {
    value.map_or_else(|| "null".to_string(), display_value)
}

pub fn display_opt<T: fmt::Display>(value: Option<&T>) -> String {
    value.map_or_else(|| "null".to_string(), |v| v.to_string())
}
