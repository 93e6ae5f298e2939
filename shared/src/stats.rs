//! Sweep statistics
//!
//! Every reconciliation pass reports what it did. The completeness contract
//! holds even under partial failure: every item of the universe lands in
//! exactly one bucket.

use serde::{Deserialize, Serialize};

/// Outcome of one stock reconciliation sweep
///
/// Invariant: `synced + skipped + errors.len() == total`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncStats {
    pub total: usize,
    pub synced: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
}

impl SyncStats {
    pub fn record_synced(&mut self) {
        self.total += 1;
        self.synced += 1;
    }

    pub fn record_skipped(&mut self) {
        self.total += 1;
        self.skipped += 1;
    }

    pub fn record_error(&mut self, message: impl Into<String>) {
        self.total += 1;
        self.errors.push(message.into());
    }

    /// Completeness check: every item accounted for exactly once
    pub fn is_complete(&self) -> bool {
        self.synced + self.skipped + self.errors.len() == self.total
    }
}

/// Outcome of one order synchronization pass
///
/// Invariant: `successful + failed == processed`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderSyncStats {
    pub processed: usize,
    pub successful: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

impl OrderSyncStats {
    pub fn record_success(&mut self) {
        self.processed += 1;
        self.successful += 1;
    }

    pub fn record_failure(&mut self, message: impl Into<String>) {
        self.processed += 1;
        self.failed += 1;
        self.errors.push(message.into());
    }

    pub fn is_complete(&self) -> bool {
        self.successful + self.failed == self.processed && self.failed == self.errors.len()
    }
}
