//! Ratings Sync
//!
//! Background ingestion of the external rating feed. A trigger creates a pending
//! job and returns it immediately; a detached task drains the feed, commits the
//! records in fixed-size chunks and records progress on the job as it goes.

pub mod config;
pub mod pipeline;
pub mod service;
pub mod tracker;

#[cfg(test)]
mod testing;

pub use config::SyncConfig;
pub use pipeline::{IngestionPipeline, SyncOutcome};
pub use service::SyncService;
pub use tracker::JobTracker;
