//! Process-wide token quota tracking.
//!
//! An explicitly owned counter shared via `Arc`, accumulated by the
//! model gateway as completions report usage. Reads are pure; the
//! counter resets only on process restart and is scoped to a single
//! process.

use std::sync::atomic::{AtomicU64, Ordering};

use appforge_types::quota::QuotaSnapshot;

/// Accumulates tokens consumed across all requests in this process.
#[derive(Debug)]
pub struct QuotaTracker {
    total_tokens: AtomicU64,
    limit: u64,
}

impl QuotaTracker {
    /// Create a tracker with the given limit. Zero means unlimited.
    pub fn new(limit: u64) -> Self {
        Self {
            total_tokens: AtomicU64::new(0),
            limit,
        }
    }

    /// Add consumed tokens to the running total.
    pub fn record(&self, tokens: u64) {
        self.total_tokens.fetch_add(tokens, Ordering::Relaxed);
    }

    /// Pure read of the current usage. No side effects.
    pub fn snapshot(&self) -> QuotaSnapshot {
        let total_tokens = self.total_tokens.load(Ordering::Relaxed);
        let percentage = if self.limit == 0 {
            0.0
        } else {
            total_tokens as f64 / self.limit as f64 * 100.0
        };
        QuotaSnapshot {
            total_tokens,
            limit: self.limit,
            percentage,
        }
    }
}
