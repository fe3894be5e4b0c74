//! Per-batch relay outcome

use serde::{Deserialize, Serialize};

/// Counts for one relayed batch
///
/// Alerts that passed the filter but failed to send are counted in neither
/// `processed` nor `skipped`, so `processed + skipped <= total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayResult {
    /// Alerts delivered as SMS
    pub processed: usize,
    /// Alerts dropped by the filter
    pub skipped: usize,
    /// Batch size
    pub total: usize,
}

impl RelayResult {
    /// Alerts that were attempted but not delivered
    pub fn failed(&self) -> usize {
        self.total - self.processed - self.skipped
    }
}
