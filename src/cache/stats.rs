//! Cache Statistics Module
//!
//! Tracks registry activity: entry lifecycles, fetch attempts and cycle outcomes.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Cache Stats ==
/// Point-in-time copy of the registry counters.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct CacheStats {
    /// Entries created since the registry started
    pub entries_created: u64,
    /// Entries retired after their idle lifetime elapsed
    pub entries_expired: u64,
    /// Individual fetch attempts, retries included
    pub fetch_attempts: u64,
    /// Fetch attempts that failed
    pub fetch_failures: u64,
    /// Cycles that ended with a successful fetch
    pub cycles_succeeded: u64,
    /// Cycles that ran out of retries
    pub cycles_failed: u64,
    /// Current number of live entries
    pub live_entries: usize,
}

impl CacheStats {
    // == Success Rate ==
    /// Fraction of cycles that succeeded, or 0.0 if no cycle completed yet.
    pub fn success_rate(&self) -> f64 {
        let total = self.cycles_succeeded + self.cycles_failed;
        if total == 0 {
            0.0
        } else {
            self.cycles_succeeded as f64 / total as f64
        }
    }
}

// == Stats Recorder ==
/// Lock-free counters shared between the registry and its refresh loops.
#[derive(Debug, Default)]
pub struct StatsRecorder {
    entries_created: AtomicU64,
    entries_expired: AtomicU64,
    fetch_attempts: AtomicU64,
    fetch_failures: AtomicU64,
    cycles_succeeded: AtomicU64,
    cycles_failed: AtomicU64,
}

impl StatsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_created(&self) {
        self.entries_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_expired(&self) {
        self.entries_expired.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_attempt(&self) {
        self.fetch_attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cycle(&self, succeeded: bool) {
        if succeeded {
            self.cycles_succeeded.fetch_add(1, Ordering::Relaxed);
        } else {
            self.cycles_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Copies the counters, attaching the current live entry count.
    pub fn snapshot(&self, live_entries: usize) -> CacheStats {
        CacheStats {
            entries_created: self.entries_created.load(Ordering::Relaxed),
            entries_expired: self.entries_expired.load(Ordering::Relaxed),
            fetch_attempts: self.fetch_attempts.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            cycles_succeeded: self.cycles_succeeded.load(Ordering::Relaxed),
            cycles_failed: self.cycles_failed.load(Ordering::Relaxed),
            live_entries,
        }
    }
}
