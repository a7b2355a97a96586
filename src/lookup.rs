//! Lookup client: one resolution per raw name
//!
//! Walks the query variants in order. Each variant gets up to
//! `RetryPolicy::attempts` requests; transient failures back off linearly
//! (`base * attempt`) and retry, a confirmed zero-result answer moves straight
//! to the next variant. The first decisive answer ends the search.
//!
//! ```text
//! TryVariant(i) ──► Attempt(i, k) ──┬─ results ─────────────► Decided
//!      ▲                             ├─ zero results ───┐
//!      │                             ├─ transient, k<max ─► Attempt(i, k+1)
//!      │                             ├─ transient, k=max ┤
//!      │                             └─ malformed ───────┼─► Decided (exception)
//!      └──────────── NextVariant(i) ◄────────────────────┘
//! TryVariant(n) ──► Exhausted
//! ```

use std::sync::Arc;

use tokio::time::sleep;
use tracing::{debug, instrument, warn};

use crate::config::RetryPolicy;
use crate::matcher::{extract_identifier, matched_full_name, select_best_record};
use crate::normalize::query_variants;
use crate::outcome::ResolutionOutcome;
use crate::rate_limit::RateLimiter;
use crate::rpo::{CandidateRecord, RegistrySearch};

/// Search state for one invocation of [`LookupClient::resolve`]
#[derive(Debug)]
enum Step {
    /// Start variant `i`
    TryVariant(usize),
    /// Attempt `k` (1-based) for variant `i`
    Attempt { variant: usize, attempt: u32 },
    /// Variant `i` produced nothing decisive
    NextVariant(usize),
    /// A decisive answer; ends the search
    Decided(ResolutionOutcome),
    /// Every variant tried without a decisive answer
    Exhausted,
}

pub struct LookupClient {
    search: Arc<dyn RegistrySearch>,
    limiter: Arc<RateLimiter>,
    retry: RetryPolicy,
    only_active: bool,
}

impl LookupClient {
    pub fn new(
        search: Arc<dyn RegistrySearch>,
        limiter: Arc<RateLimiter>,
        retry: RetryPolicy,
        only_active: bool,
    ) -> Self {
        Self {
            search,
            limiter,
            retry,
            only_active,
        }
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Resolve one raw name. Never fails: every failure mode is an outcome.
    #[instrument(skip(self))]
    pub async fn resolve(&self, raw_name: &str) -> ResolutionOutcome {
        let variants = query_variants(raw_name);
        if variants.is_empty() {
            debug!("Blank input, skipping remote search");
            return ResolutionOutcome::empty_input(raw_name);
        }

        let mut step = Step::TryVariant(0);
        loop {
            step = match step {
                Step::TryVariant(i) if i < variants.len() => Step::Attempt {
                    variant: i,
                    attempt: 1,
                },
                Step::TryVariant(_) => Step::Exhausted,
                Step::Attempt { variant, attempt } => {
                    self.attempt(raw_name, &variants[variant], variant, attempt).await
                }
                Step::NextVariant(i) => Step::TryVariant(i + 1),
                Step::Decided(outcome) => return outcome,
                Step::Exhausted => {
                    debug!(variants = variants.len(), "No decisive result for any variant");
                    return ResolutionOutcome::not_found(raw_name, Some(variants[0].as_str()));
                }
            };
        }
    }

    async fn attempt(&self, raw_name: &str, query: &str, variant: usize, attempt: u32) -> Step {
        self.limiter.acquire().await;

        match self.search.search(query, self.only_active).await {
            Ok(records) if records.is_empty() => {
                debug!(query, "Zero results, trying next variant");
                Step::NextVariant(variant)
            }
            Ok(records) => match decide(raw_name, query, &records) {
                Some(outcome) => Step::Decided(outcome),
                None => Step::NextVariant(variant),
            },
            Err(err) if err.is_transient() => {
                if attempt < self.retry.attempts {
                    let backoff = self.retry.backoff(attempt);
                    warn!(
                        query,
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %err,
                        "Transient search failure, retrying"
                    );
                    sleep(backoff).await;
                    Step::Attempt {
                        variant,
                        attempt: attempt + 1,
                    }
                } else {
                    warn!(query, attempt, error = %err, "Retries exhausted for variant");
                    Step::NextVariant(variant)
                }
            }
            Err(err) => {
                warn!(query, error = %err, "Unusable search response");
                Step::Decided(ResolutionOutcome::exception(raw_name, Some(query), err))
            }
        }
    }
}

/// Turn a non-empty result list into a decisive outcome.
fn decide(raw_name: &str, query: &str, records: &[CandidateRecord]) -> Option<ResolutionOutcome> {
    let (best, strategy) = select_best_record(records, query);
    let record = best?;
    let matched = matched_full_name(record);

    let outcome = match extract_identifier(record) {
        (Some(id), kind) => {
            debug!(query, identifier = %id, %strategy, "Identifier resolved");
            ResolutionOutcome::found(raw_name, query, matched, id, kind, strategy)
        }
        (None, _) => {
            debug!(query, %strategy, "Record found without a valid identifier");
            ResolutionOutcome::without_identifier(raw_name, query, matched, strategy)
        }
    };
    Some(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SearchError;
    use crate::outcome::{IdentifierKind, MatchStrategy, OutcomeStatus};
    use crate::rpo::IdentifierEntry;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Answers by exact query; unknown queries return zero results.
    struct FixedRegistry {
        answers: HashMap<String, Vec<CandidateRecord>>,
        calls: Mutex<Vec<String>>,
    }

    impl FixedRegistry {
        fn new(answers: Vec<(&str, Vec<CandidateRecord>)>) -> Self {
            Self {
                answers: answers
                    .into_iter()
                    .map(|(q, r)| (q.to_string(), r))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RegistrySearch for FixedRegistry {
        async fn search(
            &self,
            query: &str,
            _only_active: bool,
        ) -> Result<Vec<CandidateRecord>, SearchError> {
            self.calls.lock().unwrap().push(query.to_string());
            Ok(self.answers.get(query).cloned().unwrap_or_default())
        }
    }

    fn client(registry: Arc<FixedRegistry>) -> LookupClient {
        LookupClient::new(
            registry,
            Arc::new(RateLimiter::per_minute(1000)),
            RetryPolicy {
                attempts: 3,
                backoff_base: Duration::from_millis(700),
            },
            true,
        )
    }

    #[tokio::test]
    async fn test_blank_input_makes_no_calls() {
        let registry = Arc::new(FixedRegistry::new(vec![]));
        let outcome = client(registry.clone()).resolve("   ").await;
        assert_eq!(outcome.status, OutcomeStatus::EmptyInput);
        assert_eq!(outcome.note.as_deref(), Some("empty input"));
        assert!(registry.calls().is_empty());
    }

    #[tokio::test]
    async fn test_second_variant_wins() {
        let registry = Arc::new(FixedRegistry::new(vec![(
            "Acme",
            vec![CandidateRecord::new(
                &["Acme s.r.o."],
                vec![IdentifierEntry::new("31619428", Some("ICO"))],
            )],
        )]));
        let outcome = client(registry.clone()).resolve("Acme, s.r.o.").await;

        assert_eq!(outcome.status, OutcomeStatus::Found);
        assert_eq!(outcome.identifier.unwrap().as_str(), "31619428");
        assert_eq!(outcome.identifier_kind, Some(IdentifierKind::Ico));
        assert_eq!(outcome.used_query_variant.as_deref(), Some("Acme"));
        assert_eq!(outcome.match_strategy, MatchStrategy::Exact);
        assert_eq!(outcome.matched_full_name.as_deref(), Some("Acme s.r.o."));
        assert_eq!(registry.calls(), vec!["Acme, s.r.o.", "Acme"]);
    }

    #[tokio::test]
    async fn test_record_without_identifier_is_decisive() {
        let registry = Arc::new(FixedRegistry::new(vec![(
            "Nadácia Dobro",
            vec![CandidateRecord::new(&["Nadácia Dobro n.o."], vec![])],
        )]));
        let outcome = client(registry.clone()).resolve("Nadácia Dobro").await;

        assert_eq!(outcome.status, OutcomeStatus::NoIdentifier);
        assert_eq!(outcome.note.as_deref(), Some("found but no valid identifier"));
        assert_eq!(outcome.match_strategy, MatchStrategy::Exact);
        // Accent-free variant never tried
        assert_eq!(registry.calls(), vec!["Nadácia Dobro"]);
    }

    #[tokio::test]
    async fn test_exhausted_carries_first_variant() {
        let registry = Arc::new(FixedRegistry::new(vec![]));
        let outcome = client(registry.clone()).resolve("Čierna, a.s.").await;

        assert_eq!(outcome.status, OutcomeStatus::NotFound);
        assert_eq!(outcome.used_query_variant.as_deref(), Some("Čierna, a.s."));
        assert_eq!(
            registry.calls(),
            vec!["Čierna, a.s.", "Čierna", "Cierna, a.s.", "Cierna"]
        );
    }
}
