//! RPO API Client
//!
//! HTTP client for the register search endpoint. Pacing and retries live in
//! the lookup client; this layer performs exactly one request per call and
//! classifies the result.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use super::types::{CandidateRecord, SearchResponse};
use crate::config::ResolverConfig;
use crate::error::{ResolverError, SearchError};

/// Body excerpt length kept in status errors
const ERROR_BODY_CHARS: usize = 200;

/// One remote search request for a name query
#[async_trait]
pub trait RegistrySearch: Send + Sync {
    /// Search the register by full name.
    ///
    /// `Ok(vec![])` is a confirmed zero-result answer. Non-success statuses and
    /// transport failures are `Err` with a transient `SearchError`.
    async fn search(
        &self,
        query: &str,
        only_active: bool,
    ) -> Result<Vec<CandidateRecord>, SearchError>;
}

/// reqwest-backed register search client
pub struct RpoClient {
    http: Client,
    base_url: String,
}

impl RpoClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ResolverError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ResolverError::Client(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    pub fn from_config(config: &ResolverConfig) -> Result<Self, ResolverError> {
        Self::new(config.base_url.clone(), config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl RegistrySearch for RpoClient {
    async fn search(
        &self,
        query: &str,
        only_active: bool,
    ) -> Result<Vec<CandidateRecord>, SearchError> {
        let only_active = if only_active { "true" } else { "false" };
        let response = self
            .http
            .get(&self.base_url)
            .query(&[("fullName", query), ("onlyActive", only_active)])
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Status {
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_CHARS).collect(),
            });
        }

        let text = response.text().await?;
        let records = parse_search_body(&text)?;
        debug!(query, results = records.len(), "RPO search completed");
        Ok(records)
    }
}

/// Decode a 200 response body into candidate records.
pub fn parse_search_body(text: &str) -> Result<Vec<CandidateRecord>, SearchError> {
    let response: SearchResponse = serde_json::from_str(text)?;
    Ok(response.into_records())
}
