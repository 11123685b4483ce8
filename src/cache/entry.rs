//! Cache Entry Module
//!
//! Holds the latest payload for one identifier together with its refresh
//! bookkeeping. The refresh loop is the only writer; readers wait on a watch
//! channel for the payload to appear.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tokio::time::Instant;

use crate::cache::Options;
use crate::error::{CacheError, Result};

// == Snapshot ==
/// State published by the refresh loop after every completed cycle.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Latest fetched data, `None` until the first successful fetch
    pub payload: Option<Bytes>,
    /// Whether the most recent cycle succeeded
    pub last_success: bool,
    /// Wall-clock time of the last successful fetch
    pub last_updated_at: Option<DateTime<Utc>>,
}

// == Entry Summary ==
/// Serializable view of an entry for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct EntrySummary {
    pub identifier: String,
    pub available: bool,
    pub last_success: bool,
    pub last_updated_at: Option<DateTime<Utc>>,
    pub payload_bytes: usize,
    pub interval_secs: f64,
}

// == Entry ==
/// A rolling cache entry bound to a single identifier.
#[derive(Debug)]
pub struct Entry {
    identifier: String,
    options: Options,
    created_at: Instant,
    /// Nanoseconds after `created_at` of the most recent read
    last_requested_ns: AtomicU64,
    state: watch::Sender<Snapshot>,
}

impl Entry {
    // == Constructor ==
    /// Creates an empty entry whose last request time is now.
    pub fn new(identifier: impl Into<String>, options: Options) -> Self {
        let (state, _) = watch::channel(Snapshot::default());
        Self {
            identifier: identifier.into(),
            options,
            created_at: Instant::now(),
            last_requested_ns: AtomicU64::new(0),
            state,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    // == Read Accessors ==
    /// Returns a copy of the current state without waiting.
    pub fn snapshot(&self) -> Snapshot {
        self.state.borrow().clone()
    }

    /// Latest payload, if any fetch has succeeded yet.
    pub fn payload(&self) -> Option<Bytes> {
        self.state.borrow().payload.clone()
    }

    /// Returns true if there is data available for this entry.
    pub fn is_available(&self) -> bool {
        self.state.borrow().payload.is_some()
    }

    pub fn last_success(&self) -> bool {
        self.state.borrow().last_success
    }

    pub fn last_updated_at(&self) -> Option<DateTime<Utc>> {
        self.state.borrow().last_updated_at
    }

    pub fn last_requested_at(&self) -> Instant {
        self.created_at + Duration::from_nanos(self.last_requested_ns.load(Ordering::Acquire))
    }

    pub fn summary(&self) -> EntrySummary {
        let snapshot = self.snapshot();
        EntrySummary {
            identifier: self.identifier.clone(),
            available: snapshot.payload.is_some(),
            last_success: snapshot.last_success,
            last_updated_at: snapshot.last_updated_at,
            payload_bytes: snapshot.payload.as_ref().map_or(0, Bytes::len),
            interval_secs: self.options.interval.as_secs_f64(),
        }
    }

    // == Reader API ==
    /// Waits until data is available and returns it.
    ///
    /// Never times out: an identifier that never fetches successfully blocks
    /// the caller forever. Stale data from an earlier cycle is returned as is.
    pub async fn get(&self) -> Bytes {
        self.touch();
        self.wait_for_payload().await
    }

    /// Like [`Entry::get`], but gives up with [`CacheError::Timeout`] once
    /// `timeout` elapses without data becoming available.
    pub async fn get_with_timeout(&self, timeout: Duration) -> Result<Bytes> {
        self.touch();
        tokio::time::timeout(timeout, self.wait_for_payload())
            .await
            .map_err(|_| CacheError::Timeout(timeout))
    }

    async fn wait_for_payload(&self) -> Bytes {
        let mut rx = self.state.subscribe();
        loop {
            let current = rx.borrow_and_update().payload.clone();
            if let Some(payload) = current {
                return payload;
            }
            // The sender is owned by `self`, so the channel stays open while we wait.
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }

    /// Records a read for idle-lifetime tracking.
    pub fn touch(&self) {
        let elapsed = Instant::now().saturating_duration_since(self.created_at);
        let elapsed_ns = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        self.last_requested_ns.fetch_max(elapsed_ns, Ordering::AcqRel);
    }

    // == Expiry ==
    /// Returns true if the entry has gone unread for longer than its lifetime.
    ///
    /// A deadline too far out to be represented as an `Instant` never passes.
    pub fn is_idle_expired(&self, now: Instant) -> bool {
        self.options
            .idle_lifetime()
            .and_then(|lifetime| self.last_requested_at().checked_add(lifetime))
            .is_some_and(|deadline| now > deadline)
    }

    // == Writer API (refresh loop only) ==
    pub(crate) fn record_success(&self, payload: Bytes) {
        self.state.send_modify(|state| {
            state.payload = Some(payload);
            state.last_success = true;
            state.last_updated_at = Some(Utc::now());
        });
    }

    pub(crate) fn record_failure(&self) {
        self.state.send_modify(|state| state.last_success = false);
    }
}
