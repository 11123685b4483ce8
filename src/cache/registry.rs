//! Registry Module
//!
//! Maps identifiers to their rolling cache entries. Entries are created
//! lazily, each with its own refresh task, and removed by that task once the
//! entry has gone unread for longer than its lifetime.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::cache::{CacheStats, Entry, EntrySummary, Fetcher, Options, StatsRecorder};
use crate::error::Result;
use crate::tasks::spawn_refresh_task;

/// A live entry together with the task refreshing it.
struct Slot {
    entry: Arc<Entry>,
    handle: JoinHandle<()>,
}

impl Slot {
    /// False once the refresh task has stopped, e.g. after a panic.
    fn is_live(&self) -> bool {
        !self.handle.is_finished()
    }
}

/// State shared between registry handles and (weakly) the refresh tasks.
pub(crate) struct Shared {
    entries: RwLock<HashMap<String, Slot>>,
    fetcher: Arc<dyn Fetcher>,
    stats: Arc<StatsRecorder>,
}

impl Shared {
    /// Removes an idle `entry` from the map. Returns true if its refresh
    /// task should stop.
    ///
    /// Expiry is checked again under the write lock: readers touch entries
    /// while holding the lock in `get_or_create`, so an entry read after the
    /// task's own check is kept and false is returned. An entry that no
    /// longer owns its identifier's slot has been replaced or shut down, and
    /// its task stops without touching the map.
    pub(crate) async fn retire(&self, entry: &Arc<Entry>) -> bool {
        let mut entries = self.entries.write().await;
        let owned = entries
            .get(entry.identifier())
            .is_some_and(|slot| Arc::ptr_eq(&slot.entry, entry));
        if !owned {
            return true;
        }
        if !entry.is_idle_expired(Instant::now()) {
            return false;
        }

        entries.remove(entry.identifier());
        debug!(
            "Removed rolling cache `{}`, {} remaining",
            entry.identifier(),
            entries.len()
        );
        true
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        for slot in self.entries.get_mut().values() {
            slot.handle.abort();
        }
    }
}

// == Registry ==
/// Process-wide set of rolling caches, keyed by identifier.
///
/// Cloning is cheap and every clone refers to the same entries. Dropping the
/// last clone stops all refresh tasks.
#[derive(Clone)]
pub struct Registry {
    shared: Arc<Shared>,
}

impl Registry {
    // == Constructor ==
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            shared: Arc::new(Shared {
                entries: RwLock::new(HashMap::new()),
                fetcher,
                stats: Arc::new(StatsRecorder::new()),
            }),
        }
    }

    // == Get Or Create ==
    /// Returns the entry for `identifier`, creating it and starting its
    /// refresh task if none exists.
    ///
    /// The returned entry counts as requested now. `options` only apply when
    /// a new entry is created; an existing entry keeps the options it was
    /// created with. Creation fails with a configuration error if
    /// `options.interval` is zero. An entry whose task has died is replaced.
    pub async fn get_or_create(&self, identifier: &str, options: Options) -> Result<Arc<Entry>> {
        if let Some(slot) = self.shared.entries.read().await.get(identifier) {
            if slot.is_live() {
                slot.entry.touch();
                return Ok(slot.entry.clone());
            }
        }

        let mut entries = self.shared.entries.write().await;
        // Another caller may have created it while we waited for the write lock
        if let Some(slot) = entries.get(identifier) {
            if slot.is_live() {
                slot.entry.touch();
                return Ok(slot.entry.clone());
            }
        }

        options.validate()?;

        if entries.remove(identifier).is_some() {
            warn!("Refresh task for rolling cache `{}` stopped unexpectedly, restarting", identifier);
        }

        let entry = Arc::new(Entry::new(identifier, options));
        let handle = spawn_refresh_task(
            entry.clone(),
            self.shared.fetcher.clone(),
            self.shared.stats.clone(),
            Arc::downgrade(&self.shared),
        );
        entries.insert(
            identifier.to_string(),
            Slot {
                entry: entry.clone(),
                handle,
            },
        );
        self.shared.stats.record_created();

        info!(
            "Started rolling cache `{}` (interval {:?}, lifetime {:?})",
            identifier,
            entry.options().interval,
            entry.options().idle_lifetime()
        );

        Ok(entry)
    }

    // == Convenience Readers ==
    /// Blocks until data for `identifier` is available and returns it.
    ///
    /// A new entry refreshes every `interval` and lives for ten intervals
    /// without reads.
    pub async fn get(&self, identifier: &str, interval: Duration) -> Result<Bytes> {
        self.get_with_options(identifier, Options::rolling(interval))
            .await
    }

    /// Like [`Registry::get`], but waits at most `timeout` for the first data.
    pub async fn get_with_timeout(
        &self,
        identifier: &str,
        interval: Duration,
        timeout: Duration,
    ) -> Result<Bytes> {
        self.get_with_options_timeout(identifier, Options::rolling(interval), Some(timeout))
            .await
    }

    pub async fn get_with_options(&self, identifier: &str, options: Options) -> Result<Bytes> {
        self.get_with_options_timeout(identifier, options, None)
            .await
    }

    /// Reads through an entry created with `options`; `None` waits forever.
    pub async fn get_with_options_timeout(
        &self,
        identifier: &str,
        options: Options,
        timeout: Option<Duration>,
    ) -> Result<Bytes> {
        let entry = self.get_or_create(identifier, options).await?;
        match timeout {
            Some(timeout) => entry.get_with_timeout(timeout).await,
            None => Ok(entry.get().await),
        }
    }

    // == Introspection ==
    /// Returns the number of rolling caches currently running.
    pub async fn count(&self) -> usize {
        self.shared
            .entries
            .read()
            .await
            .values()
            .filter(|slot| slot.is_live())
            .count()
    }

    /// Returns the live entry for `identifier` without creating one.
    pub async fn lookup(&self, identifier: &str) -> Option<Arc<Entry>> {
        self.shared
            .entries
            .read()
            .await
            .get(identifier)
            .filter(|slot| slot.is_live())
            .map(|slot| slot.entry.clone())
    }

    /// Summaries of all live entries, ordered by identifier.
    pub async fn entries(&self) -> Vec<EntrySummary> {
        let mut summaries: Vec<EntrySummary> = self
            .shared
            .entries
            .read()
            .await
            .values()
            .filter(|slot| slot.is_live())
            .map(|slot| slot.entry.summary())
            .collect();
        summaries.sort_by(|a, b| a.identifier.cmp(&b.identifier));
        summaries
    }

    pub async fn stats(&self) -> CacheStats {
        let live = self.count().await;
        self.shared.stats.snapshot(live)
    }

    // == Shutdown ==
    /// Stops every refresh task and forgets all entries.
    ///
    /// Readers still waiting on an entry keep waiting; callers are expected
    /// to shut down after they stop reading. Returns the number of entries
    /// that were stopped.
    pub async fn shutdown(&self) -> usize {
        let mut entries = self.shared.entries.write().await;
        let stopped = entries.len();
        for (_, slot) in entries.drain() {
            slot.handle.abort();
        }
        info!("Stopped {} rolling caches", stopped);
        stopped
    }
}
