// API client module: a small blocking HTTP client that talks to the tree
// service. Each call checks for the exact status the probe expects and
// turns anything else into a `ProbeError` tagged with the stage.

use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::error::{ProbeError, Stage};

/// Blocking API client holding the reqwest client, the API root and the
/// bearer token obtained from login.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

/// Login request payload.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response from the login endpoint. `user_id` stays a `serde_json::Value`
/// because the service may hand back either a number or a string.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub user_id: Value,
    #[serde(default)]
    pub username: Option<String>,
}

/// Tree species accepted by the service.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    Oak,
    Pine,
    Birch,
    Maple,
    Elm,
    Spruce,
}

impl Species {
    pub const ALL: [Species; 6] = [
        Species::Oak,
        Species::Pine,
        Species::Birch,
        Species::Maple,
        Species::Elm,
        Species::Spruce,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Species::Oak => "oak",
            Species::Pine => "pine",
            Species::Birch => "birch",
            Species::Maple => "maple",
            Species::Elm => "elm",
            Species::Spruce => "spruce",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown species `{0}` (expected one of: oak, pine, birch, maple, elm, spruce)")]
pub struct ParseSpeciesError(String);

impl FromStr for Species {
    type Err = ParseSpeciesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Species::ALL
            .into_iter()
            .find(|species| species.as_str() == wanted)
            .ok_or_else(|| ParseSpeciesError(s.to_string()))
    }
}

/// Body of `POST /trees`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TreeCreateRequest {
    pub species: Species,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TreeCreateRequest {
    /// The fixed test payload planted by every probe run.
    pub fn sample(species: Species) -> Self {
        TreeCreateRequest {
            species,
            latitude: 40.7128,
            longitude: -74.0060,
            location_name: Some("Test Location".into()),
            description: Some("Test tree for debugging".into()),
        }
    }
}

/// A tree as returned by the service, either from create or from the
/// listing. Only `id` is required to be present (it defaults to `null`
/// otherwise). The remaining fields are kept as raw JSON values so an odd
/// type in one record is printed as-is instead of failing the whole listing.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TreeRecord {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub user_id: Option<Value>,
    #[serde(default)]
    pub species: Option<Value>,
    #[serde(default)]
    pub latitude: Option<Value>,
    #[serde(default)]
    pub longitude: Option<Value>,
    #[serde(default)]
    pub location_name: Option<Value>,
    #[serde(default)]
    pub description: Option<Value>,
    #[serde(default)]
    pub planting_date: Option<Value>,
    #[serde(default)]
    pub health_score: Option<Value>,
    #[serde(default)]
    pub current_value: Option<Value>,
    #[serde(default)]
    pub created_at: Option<Value>,
    #[serde(default)]
    pub updated_at: Option<Value>,
}

impl TreeRecord {
    /// Health score as a number, when the service sent one.
    pub fn health(&self) -> Option<f64> {
        self.health_score.as_ref().and_then(Value::as_f64)
    }
}

impl ApiClient {
    /// Create a client rooted at `base_url` (e.g. `http://localhost:8000/api`).
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ApiClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Store the bearer token for subsequent authenticated requests.
    pub fn set_token(&mut self, token: &str) {
        self.token = Some(token.to_string());
    }

    /// Returns whether a token is present in the client.
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach the bearer token when one is set.
    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(t) => req.bearer_auth(t),
            None => req,
        }
    }

    /// `POST /auth/login`; the service must answer 200.
    #[instrument(skip(self, req), fields(username = %req.username))]
    pub fn login(&self, req: &LoginRequest) -> Result<LoginResponse, ProbeError> {
        let url = self.url("/auth/login");
        debug!(%url, "sending login request");
        let res = self
            .client
            .post(&url)
            .json(req)
            .send()
            .map_err(|source| ProbeError::Transport { stage: Stage::Login, source })?;
        let res = expect_status(res, StatusCode::OK, Stage::Login)?;
        res.json()
            .map_err(|source| ProbeError::Decode { stage: Stage::Login, source })
    }

    /// `POST /trees`; the service must answer 201.
    #[instrument(skip(self, req), fields(species = %req.species))]
    pub fn create_tree(&self, req: &TreeCreateRequest) -> Result<TreeRecord, ProbeError> {
        let url = self.url("/trees");
        if !self.has_token() {
            warn!("planting a tree without a bearer token");
        }
        debug!(%url, "sending create tree request");
        let res = self
            .authorized(self.client.post(&url))
            .json(req)
            .send()
            .map_err(|source| ProbeError::Transport { stage: Stage::PlantTree, source })?;
        let res = expect_status(res, StatusCode::CREATED, Stage::PlantTree)?;
        res.json()
            .map_err(|source| ProbeError::Decode { stage: Stage::PlantTree, source })
    }

    /// `GET /trees`; the service must answer 200 with a JSON array.
    #[instrument(skip(self))]
    pub fn list_trees(&self) -> Result<Vec<TreeRecord>, ProbeError> {
        let url = self.url("/trees");
        debug!(%url, "sending list trees request");
        let res = self
            .authorized(self.client.get(&url))
            .send()
            .map_err(|source| ProbeError::Transport { stage: Stage::FetchTrees, source })?;
        let res = expect_status(res, StatusCode::OK, Stage::FetchTrees)?;
        let trees: Vec<TreeRecord> = res
            .json()
            .map_err(|source| ProbeError::Decode { stage: Stage::FetchTrees, source })?;
        debug!(count = trees.len(), "trees listed");
        Ok(trees)
    }
}

/// Pass the response through when its status is exactly `expected`,
/// otherwise capture the body for the failure report.
fn expect_status(res: Response, expected: StatusCode, stage: Stage) -> Result<Response, ProbeError> {
    let actual = res.status();
    debug!(%stage, %actual, "response received");
    if actual == expected {
        return Ok(res);
    }
    let body = res.text().unwrap_or_default();
    warn!(%stage, %expected, %actual, "unexpected status");
    Err(ProbeError::UnexpectedStatus { stage, expected, actual, body })
}
