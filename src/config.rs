// Probe configuration: where the API lives, who logs in, and what gets
// planted. Every field has a built-in default so the probe runs with no
// arguments; environment variables and CLI flags can override them.

use crate::api::{Species, TreeCreateRequest};
use crate::error::ProbeError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_USERNAME: &str = "alice";
pub const DEFAULT_PASSWORD: &str = "password123";
pub const DEFAULT_EMAIL: &str = "alice@example.com";
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:8080";

#[derive(Debug, Clone, PartialEq)]
pub struct ProbeConfig {
    /// API root, e.g. `http://localhost:8000/api`. Never ends with `/`.
    pub base_url: String,
    pub username: String,
    pub password: String,
    /// Only used for the frontend session preview; the service never sees it.
    pub email: String,
    /// Origin named in the manual browser checklist.
    pub frontend_url: String,
    pub tree: TreeCreateRequest,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        ProbeConfig {
            base_url: DEFAULT_BASE_URL.into(),
            username: DEFAULT_USERNAME.into(),
            password: DEFAULT_PASSWORD.into(),
            email: DEFAULT_EMAIL.into(),
            frontend_url: DEFAULT_FRONTEND_URL.into(),
            tree: TreeCreateRequest::sample(Species::Oak),
        }
    }
}

impl ProbeConfig {
    /// Build a config from `TREE_PROBE_*` environment variables, falling
    /// back to the defaults. A `.env` file in the working directory is
    /// loaded first if present.
    pub fn from_env() -> Result<Self, ProbeError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ProbeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ProbeConfig::default();
        if let Some(v) = lookup("TREE_PROBE_BASE_URL") {
            config.base_url = v;
        }
        if let Some(v) = lookup("TREE_PROBE_USERNAME") {
            config.username = v;
        }
        if let Some(v) = lookup("TREE_PROBE_PASSWORD") {
            config.password = v;
        }
        if let Some(v) = lookup("TREE_PROBE_EMAIL") {
            config.email = v;
        }
        if let Some(v) = lookup("TREE_PROBE_FRONTEND_URL") {
            config.frontend_url = v;
        }
        config.normalize()
    }

    /// Strip trailing slashes and reject an empty base URL.
    pub fn normalize(mut self) -> Result<Self, ProbeError> {
        let trimmed = self.base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(ProbeError::Config("base URL must not be empty".into()));
        }
        self.base_url = trimmed.to_string();
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_the_seeded_local_service() {
        let config = ProbeConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.base_url, "http://localhost:8000/api");
        assert_eq!(config.username, "alice");
        assert_eq!(config.password, "password123");
        assert_eq!(config.tree.species, Species::Oak);
        assert_eq!(config.tree.latitude, 40.7128);
        assert_eq!(config.tree.longitude, -74.0060);
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = ProbeConfig::from_lookup(lookup_from(&[
            ("TREE_PROBE_BASE_URL", "http://api.test:9000/api/"),
            ("TREE_PROBE_USERNAME", "bob"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://api.test:9000/api");
        assert_eq!(config.username, "bob");
        assert_eq!(config.password, DEFAULT_PASSWORD);
    }

    #[test]
    fn empty_base_url_is_rejected() {
        let err = ProbeConfig::from_lookup(lookup_from(&[("TREE_PROBE_BASE_URL", " / ")]))
            .unwrap_err();
        assert!(matches!(err, ProbeError::Config(_)));
    }
}
