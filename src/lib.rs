//! RPO Resolver - organization name to registry identifier (ICO)
//!
//! Resolves free-text company names against the RPO search API under a
//! global request ceiling, with bounded worker concurrency and retrying
//! lookups.
//!
//! ## Pipeline
//!
//! ```text
//! names ──► BatchOrchestrator ──► (per item) LookupClient
//!                                      │
//!                                      ├─► query_variants()          (normalize)
//!                                      ├─► RateLimiter::acquire()    (shared window)
//!                                      ├─► RegistrySearch::search()  (rpo::RpoClient)
//!                                      └─► select_best_record() / extract_identifier()
//!                                                 │
//!                                                 ▼
//!                                  Vec<ResolutionOutcome> (input order)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rpo_resolver::{resolve_all, ResolverConfig};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let names = vec!["Slovnaft, a.s.".to_string(), "Tatra banka".to_string()];
//! let outcomes = resolve_all(&ResolverConfig::default(), &names).await?;
//! assert_eq!(outcomes.len(), names.len());
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod config;
pub mod error;
pub mod identifier;
pub mod lookup;
pub mod matcher;
pub mod normalize;
pub mod outcome;
pub mod rate_limit;
pub mod rpo;

use std::sync::Arc;

pub use batch::{BatchOrchestrator, ProgressSnapshot, ProgressTracker};
pub use config::{BatchSettings, ResolverConfig, RetryPolicy};
pub use error::{ConfigError, ResolverError, SearchError};
pub use identifier::RegistryId;
pub use lookup::LookupClient;
pub use matcher::{extract_identifier, select_best_record};
pub use normalize::{clean_company_name, query_variants, strip_accents};
pub use outcome::{IdentifierKind, MatchStrategy, OutcomeStatus, ResolutionOutcome, RunSummary};
pub use rate_limit::RateLimiter;
pub use rpo::{CandidateRecord, RegistrySearch, RpoClient};

/// Resolve every name against the live RPO API using `config`.
///
/// Returns exactly one outcome per input name, in input order.
pub async fn resolve_all(
    config: &ResolverConfig,
    names: &[String],
) -> Result<Vec<ResolutionOutcome>, ResolverError> {
    config.validate()?;
    let search = Arc::new(RpoClient::from_config(config)?);
    let orchestrator = BatchOrchestrator::from_config(config, search);
    Ok(orchestrator.run(names).await)
}
