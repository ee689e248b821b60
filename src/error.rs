// Error types shared by the probe library.
//
// The probe only distinguishes a handful of failure kinds: the service
// answered with a status we did not expect, the request never completed,
// or the body could not be decoded. Every variant that comes from the
// network carries the `Stage` it happened in so the reporter can say
// "Login failed" rather than just printing a reqwest error.

use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

/// One of the networked steps of a probe run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Login,
    PlantTree,
    FetchTrees,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::Login => "Login",
            Stage::PlantTree => "Plant tree",
            Stage::FetchTrees => "Fetch trees",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Error)]
pub enum ProbeError {
    /// The service answered, but not with the status the stage requires.
    #[error("{stage} failed: {actual}")]
    UnexpectedStatus {
        stage: Stage,
        expected: StatusCode,
        actual: StatusCode,
        body: String,
    },

    #[error("{stage} failed: request error: {source}")]
    Transport {
        stage: Stage,
        #[source]
        source: reqwest::Error,
    },

    #[error("{stage} failed: could not decode response: {source}")]
    Decode {
        stage: Stage,
        #[source]
        source: reqwest::Error,
    },

    /// The status was right but the body is unusable, e.g. an empty token.
    #[error("{stage} failed: {reason}")]
    InvalidResponse { stage: Stage, reason: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProbeError {
    /// The stage the error belongs to, if it came from the network.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            ProbeError::UnexpectedStatus { stage, .. }
            | ProbeError::Transport { stage, .. }
            | ProbeError::Decode { stage, .. }
            | ProbeError::InvalidResponse { stage, .. } => Some(*stage),
            ProbeError::Config(_) | ProbeError::Json(_) | ProbeError::Io(_) => None,
        }
    }

    /// True when an authenticated call was refused, i.e. the bearer token was rejected.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            ProbeError::UnexpectedStatus { stage, actual, .. }
                if *stage != Stage::Login && *actual == StatusCode::UNAUTHORIZED
        )
    }
}
