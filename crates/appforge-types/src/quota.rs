//! Quota snapshot type for token admission control.

use serde::{Deserialize, Serialize};

/// Point-in-time view of process-wide token consumption.
///
/// Produced by `QuotaTracker::snapshot()` in appforge-core. Resets only
/// on process restart; there is no rollover policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuotaSnapshot {
    /// Total tokens consumed so far.
    pub total_tokens: u64,
    /// Configured limit. Zero means unlimited.
    pub limit: u64,
    /// `total_tokens / limit * 100`, or 0.0 when unlimited.
    pub percentage: f64,
}

impl QuotaSnapshot {
    /// Whether new generation requests should be rejected.
    ///
    /// Soft admission-control gate: requests already in flight are not
    /// interrupted.
    pub fn is_exhausted(&self) -> bool {
        self.percentage > 95.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhaustion_threshold() {
        let mut snap = QuotaSnapshot {
            total_tokens: 95,
            limit: 100,
            percentage: 95.0,
        };
        assert!(!snap.is_exhausted());
        snap.percentage = 95.1;
        assert!(snap.is_exhausted());
    }
}
