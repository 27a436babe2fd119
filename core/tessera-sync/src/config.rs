//! Sync engine configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Message shown once per save when any relationship update failed.
pub const DEFAULT_ERROR_MESSAGE: &str = "Error saving relationship.";

/// Configuration for the relation sync engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Upper bound for one target's load-mutate-save cycle (ms).
    /// `None` waits indefinitely.
    ///
    /// Expiry stops waiting; it does not cancel a write the store has already
    /// started. A blocking store such as `SqliteStore` may still commit the
    /// target after the reference was reported as `SyncError::Timeout`.
    pub link_timeout_ms: Option<u64>,
    /// When the session baseline moves forward after a save.
    pub baseline_policy: BaselinePolicy,
    /// Aggregate notification text for failed relationship updates.
    pub error_message: String,
}

impl SyncConfig {
    pub fn link_timeout(&self) -> Option<Duration> {
        self.link_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            link_timeout_ms: Some(30_000),
            baseline_policy: BaselinePolicy::default(),
            error_message: DEFAULT_ERROR_MESSAGE.to_string(),
        }
    }
}

/// When an edit session replaces its relation baseline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselinePolicy {
    /// After every successful item save, whatever synchronization reported.
    /// A failed removal is then not re-detected by the next diff.
    #[default]
    AfterSave,
    /// Only when synchronization finished without a single failure.
    AfterCleanSync,
}
