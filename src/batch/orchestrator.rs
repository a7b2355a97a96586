//! Batch orchestrator
//!
//! Splits the input into fixed-size batches processed strictly one after
//! another. Within a batch every item becomes a tokio task gated by a
//! semaphore of `max_workers` permits. Each task owns its input index, so
//! results land in input order no matter which finishes first.

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use tokio::time::sleep;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use super::progress::ProgressTracker;
use crate::config::{BatchSettings, ResolverConfig};
use crate::lookup::LookupClient;
use crate::outcome::{ResolutionOutcome, RunSummary};
use crate::rate_limit::RateLimiter;
use crate::rpo::RegistrySearch;

pub struct BatchOrchestrator {
    client: Arc<LookupClient>,
    settings: BatchSettings,
    progress: Arc<ProgressTracker>,
}

impl BatchOrchestrator {
    pub fn new(client: Arc<LookupClient>, settings: BatchSettings) -> Self {
        Self {
            client,
            settings,
            progress: Arc::new(ProgressTracker::new()),
        }
    }

    /// Wire a lookup client, a fresh shared rate limiter and batch pacing
    /// from `config`.
    pub fn from_config(config: &ResolverConfig, search: Arc<dyn RegistrySearch>) -> Self {
        let limiter = Arc::new(RateLimiter::per_minute(config.max_requests_per_minute));
        let client = LookupClient::new(search, limiter, config.retry_policy(), config.only_active);
        Self::new(Arc::new(client), config.batch_settings())
    }

    /// Report into an externally owned tracker.
    pub fn with_progress(mut self, progress: Arc<ProgressTracker>) -> Self {
        self.progress = progress;
        self
    }

    pub fn progress(&self) -> Arc<ProgressTracker> {
        Arc::clone(&self.progress)
    }

    /// Resolve every name. Always returns exactly `names.len()` outcomes in
    /// input order; items skipped after a stop request are `cancelled`.
    pub async fn run(&self, names: &[String]) -> Vec<ResolutionOutcome> {
        let run_id = Uuid::new_v4();
        let span = info_span!("run", %run_id, total = names.len());
        self.run_batches(names).instrument(span).await
    }

    async fn run_batches(&self, names: &[String]) -> Vec<ResolutionOutcome> {
        let total = names.len();
        let batch_size = self.settings.batch_size.max(1);
        let batch_count = total.div_ceil(batch_size);
        let workers = Arc::new(Semaphore::new(self.settings.max_workers.max(1)));

        self.progress.start(total);
        info!(
            batches = batch_count,
            batch_size,
            workers = self.settings.max_workers,
            "Starting resolution run"
        );

        let mut slots: Vec<Option<ResolutionOutcome>> = (0..total).map(|_| None).collect();

        for (batch_index, offset) in (0..total).step_by(batch_size).enumerate() {
            if self.progress.stop_requested() {
                info!(
                    remaining = total - offset,
                    "Stop requested, skipping remaining batches"
                );
                break;
            }

            let end = (offset + batch_size).min(total);
            info!(
                batch = batch_index + 1,
                of = batch_count,
                items = end - offset,
                "Processing batch"
            );

            let mut in_flight = FuturesUnordered::new();
            for (index, name) in names.iter().enumerate().take(end).skip(offset) {
                let name = name.clone();
                let client = Arc::clone(&self.client);
                let workers = Arc::clone(&workers);
                let handle = tokio::spawn(
                    async move {
                        let _permit = workers.acquire_owned().await.ok();
                        client.resolve(&name).await
                    }
                    .in_current_span(),
                );
                self.progress.record_submitted();
                in_flight.push(async move { (index, handle.await) });
            }

            while let Some((index, joined)) = in_flight.next().await {
                let outcome = match joined {
                    Ok(outcome) => outcome,
                    Err(err) => {
                        error!(index, name = %names[index], error = %err, "Lookup task failed");
                        ResolutionOutcome::exception(&names[index], None, err)
                    }
                };
                self.progress
                    .record_completed(&names[index], outcome.is_found());
                slots[index] = Some(outcome);
            }

            if end < total && !self.settings.batch_pause.is_zero() {
                sleep(self.settings.batch_pause).await;
            }
        }

        self.progress.finish();

        let outcomes: Vec<ResolutionOutcome> = slots
            .into_iter()
            .zip(names)
            .map(|(slot, name)| slot.unwrap_or_else(|| ResolutionOutcome::cancelled(name)))
            .collect();

        let summary = RunSummary::from_outcomes(&outcomes);
        let snapshot = self.progress.snapshot();
        info!(
            found = summary.found,
            total = summary.total,
            cancelled = summary.cancelled,
            elapsed_secs = snapshot.elapsed_secs,
            "Resolution run finished"
        );
        outcomes
    }
}
