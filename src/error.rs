//! Error types for the resolver
//!
//! Per-item lookup failures are never surfaced as `Err` from the batch run;
//! they become `ResolutionOutcome` data. These types cover the remote search
//! seam, configuration loading, and client construction.

use thiserror::Error;

/// Failure of a single remote search request
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("registry returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed search response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl SearchError {
    /// Whether the request should be retried with backoff.
    ///
    /// Non-success statuses (429, 5xx, anything but 200) and transport
    /// failures are transient. A body that cannot be decoded is not.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Status { .. } | Self::Transport(_))
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Transport(format!("request timed out: {}", err))
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Configuration loading and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid config value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Errors that prevent a run from starting at all
#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Client(String),
}
