//! # Mediator Statistics
//!
//! Lock-free counters updated on every `handle` call, and the plain
//! snapshot type handed to callers.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time view of a mediator's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediatorStats {
    /// Requests that passed the admission policy.
    pub admitted: u64,
    /// Requests rejected by the admission policy.
    pub denied: u64,
    /// Admitted requests answered from the memo table.
    pub hits: u64,
    /// Admitted requests that had to reach the delegate.
    pub misses: u64,
    /// Successful delegate constructions (0 or 1).
    pub constructions: u64,
    /// Successful delegate invocations.
    pub invocations: u64,
    /// Failed constructions or invocations.
    pub failures: u64,
    /// Entries currently in the memo table.
    pub cached_entries: usize,
}

impl MediatorStats {
    /// Hit rate as integer percentage (0-100) of admitted requests.
    #[must_use]
    pub fn hit_rate_percent(&self) -> u8 {
        let total = self.hits.saturating_add(self.misses);
        if total == 0 {
            0
        } else {
            (self.hits.saturating_mul(100) / total) as u8
        }
    }
}

/// Internal atomic counters.
#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub(crate) admitted: AtomicU64,
    pub(crate) denied: AtomicU64,
    pub(crate) hits: AtomicU64,
    pub(crate) misses: AtomicU64,
    pub(crate) constructions: AtomicU64,
    pub(crate) invocations: AtomicU64,
    pub(crate) failures: AtomicU64,
}

impl Counters {
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, cached_entries: usize) -> MediatorStats {
        MediatorStats {
            admitted: self.admitted.load(Ordering::Relaxed),
            denied: self.denied.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            constructions: self.constructions.load(Ordering::Relaxed),
            invocations: self.invocations.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            cached_entries,
        }
    }
}
