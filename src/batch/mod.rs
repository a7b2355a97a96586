//! Batch orchestration over a list of names
//!
//! - `orchestrator`: bounded-concurrency batches, output in input order
//! - `progress`: lock-guarded counters readable while a run is in flight

pub mod orchestrator;
pub mod progress;

pub use orchestrator::BatchOrchestrator;
pub use progress::{ProgressSnapshot, ProgressTracker};
