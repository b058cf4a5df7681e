use ratings_core::EXTERNAL_API_SYNC;
use std::time::Duration;

const DEFAULT_CHUNK_SIZE: usize = 100;
const DEFAULT_DEADLINE_SECS: u64 = 30 * 60;

/// Settings for one ingestion run.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Tag stored on every job this service creates
    pub job_type: String,
    /// Records committed per batch write
    pub chunk_size: usize,
    /// Upper bound on a single run
    pub deadline: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            job_type: EXTERNAL_API_SYNC.to_string(),
            chunk_size: std::env::var("SYNC_CHUNK_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(DEFAULT_CHUNK_SIZE),
            deadline: Duration::from_secs(
                std::env::var("SYNC_DEADLINE_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_DEADLINE_SECS),
            ),
        }
    }
}

impl SyncConfig {
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }
}
