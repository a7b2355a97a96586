//! Run progress tracking
//!
//! Owned by the orchestrator and shared by `Arc` with any external reporter.
//! Counters are mutated under one lock; `snapshot()` returns a consistent copy.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::Instant;

#[derive(Debug, Default)]
struct ProgressState {
    total: usize,
    submitted: usize,
    completed: usize,
    succeeded: usize,
    failed: usize,
    started_at: Option<Instant>,
    started_at_utc: Option<DateTime<Utc>>,
    finished_at: Option<Instant>,
    current_item: Option<String>,
    running: bool,
}

/// Live progress of one orchestration run
#[derive(Debug, Default)]
pub struct ProgressTracker {
    state: Mutex<ProgressState>,
    stop_requested: AtomicBool,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ProgressState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reset counters for a run over `total` items. A pending stop request
    /// is kept; see [`ProgressTracker::clear_stop`].
    pub fn start(&self, total: usize) {
        let mut state = self.lock();
        *state = ProgressState {
            total,
            started_at: Some(Instant::now()),
            started_at_utc: Some(Utc::now()),
            running: true,
            ..ProgressState::default()
        };
    }

    pub fn record_submitted(&self) {
        self.lock().submitted += 1;
    }

    pub fn record_completed(&self, name: &str, succeeded: bool) {
        let mut state = self.lock();
        state.completed += 1;
        if succeeded {
            state.succeeded += 1;
        } else {
            state.failed += 1;
        }
        state.current_item = Some(name.to_string());
    }

    pub fn finish(&self) {
        let mut state = self.lock();
        state.running = false;
        state.finished_at = Some(Instant::now());
    }

    /// Ask the run to stop at the next batch boundary. In-flight items finish.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
    }

    /// Withdraw a stop request so the tracker can drive another run.
    pub fn clear_stop(&self) {
        self.stop_requested.store(false, Ordering::SeqCst);
    }

    pub fn stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let state = self.lock();
        let elapsed = match (state.started_at, state.finished_at) {
            (Some(start), Some(end)) => end.duration_since(start),
            (Some(start), None) => start.elapsed(),
            _ => Duration::ZERO,
        };

        ProgressSnapshot {
            total: state.total,
            submitted: state.submitted,
            completed: state.completed,
            succeeded: state.succeeded,
            failed: state.failed,
            elapsed_secs: elapsed.as_secs_f64(),
            started_at: state.started_at_utc,
            current_item: state.current_item.clone(),
            is_running: state.running,
            stop_requested: self.stop_requested(),
        }
    }
}

/// Point-in-time copy of run progress
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    pub total: usize,
    pub submitted: usize,
    pub completed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub elapsed_secs: f64,
    pub started_at: Option<DateTime<Utc>>,
    /// Most recently completed item
    pub current_item: Option<String>,
    pub is_running: bool,
    pub stop_requested: bool,
}

impl ProgressSnapshot {
    pub fn elapsed(&self) -> Duration {
        Duration::from_secs_f64(self.elapsed_secs)
    }

    /// Completed share of the total, 0.0..=1.0
    pub fn fraction_complete(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }

    /// Succeeded share of completed items in percent
    pub fn success_rate(&self) -> f64 {
        self.succeeded as f64 * 100.0 / self.completed.max(1) as f64
    }

    /// Completed items per minute of elapsed time
    pub fn items_per_minute(&self) -> f64 {
        if self.elapsed_secs > 0.0 {
            self.completed as f64 * 60.0 / self.elapsed_secs
        } else {
            0.0
        }
    }

    pub fn avg_time_per_item(&self) -> Option<Duration> {
        (self.completed > 0)
            .then(|| Duration::from_secs_f64(self.elapsed_secs / self.completed as f64))
    }

    /// Remaining time at the current throughput
    pub fn eta(&self) -> Option<Duration> {
        let per_item = self.avg_time_per_item()?;
        let remaining = self.total.saturating_sub(self.completed) as u32;
        Some(per_item * remaining)
    }
}
