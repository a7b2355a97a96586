//! Resolver configuration
//!
//! Loads the tuning surface from YAML (all keys optional) and provides
//! strongly-typed views for the lookup client and the batch orchestrator.
//! Values are fixed for the duration of a run.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default RPO search endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.statistics.sk/rpo/v1/search";

/// Root configuration for a resolution run
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Search endpoint (receives `fullName` and `onlyActive` query params)
    pub base_url: String,
    /// Restrict search to active entities
    pub only_active: bool,
    /// Concurrent workers per batch
    pub max_workers: usize,
    /// Ceiling on outbound requests per 60-second window
    pub max_requests_per_minute: u32,
    /// Items per batch
    pub batch_size: usize,
    /// Per-request timeout
    pub request_timeout_secs: u64,
    /// Attempts per query variant
    pub retry_count: u32,
    /// Backoff unit; attempt `k` sleeps `k * base`
    pub retry_backoff_base_ms: u64,
    /// Pause between consecutive batches
    pub batch_pause_ms: u64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            only_active: true,
            max_workers: 6,
            max_requests_per_minute: 60,
            batch_size: 60,
            request_timeout_secs: 12,
            retry_count: 3,
            retry_backoff_base_ms: 700,
            batch_pause_ms: 1000,
        }
    }
}

impl ResolverConfig {
    /// Load configuration from a YAML file. Missing keys take defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would stall or misconfigure a run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(invalid("base_url", "must not be empty"));
        }
        if self.max_workers == 0 {
            return Err(invalid("max_workers", "must be at least 1"));
        }
        if self.batch_size == 0 {
            return Err(invalid("batch_size", "must be at least 1"));
        }
        if self.max_workers > self.batch_size {
            return Err(invalid(
                "max_workers",
                format!(
                    "{} exceeds batch_size {}; extra workers would sit idle",
                    self.max_workers, self.batch_size
                ),
            ));
        }
        if self.max_requests_per_minute == 0 {
            return Err(invalid("max_requests_per_minute", "must be at least 1"));
        }
        if self.retry_count == 0 {
            return Err(invalid("retry_count", "must be at least 1"));
        }
        if self.request_timeout_secs == 0 {
            return Err(invalid("request_timeout_secs", "must be at least 1"));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.retry_count,
            backoff_base: Duration::from_millis(self.retry_backoff_base_ms),
        }
    }

    pub fn batch_settings(&self) -> BatchSettings {
        BatchSettings {
            batch_size: self.batch_size,
            max_workers: self.max_workers,
            batch_pause: Duration::from_millis(self.batch_pause_ms),
        }
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// Retry behaviour for one query variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub attempts: u32,
    pub backoff_base: Duration,
}

impl RetryPolicy {
    /// Sleep after failed attempt `attempt` (1-based): `base * attempt`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_base.saturating_mul(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        ResolverConfig::default().retry_policy()
    }
}

/// Pacing of the batch orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSettings {
    pub batch_size: usize,
    pub max_workers: usize,
    pub batch_pause: Duration,
}

impl Default for BatchSettings {
    fn default() -> Self {
        ResolverConfig::default().batch_settings()
    }
}
