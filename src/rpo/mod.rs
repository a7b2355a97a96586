//! RPO (register of legal entities) search integration
//!
//! This module provides:
//! - Wire types for the search response
//! - The `RegistrySearch` seam used by the lookup client
//! - A reqwest-backed client for the public search endpoint

pub mod client;
pub mod types;

pub use client::{RegistrySearch, RpoClient};
pub use types::*;
