//! Refresh Task
//!
//! Background task that keeps a single entry up to date and retires it once
//! it has gone unread for longer than its lifetime.

use std::fmt;
use std::sync::{Arc, Weak};

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::cache::{Entry, Fetcher, Shared, StatsRecorder};

/// Logs refresh activity at info level for entries created with `debug`,
/// trace otherwise.
fn log_activity(entry: &Entry, message: fmt::Arguments<'_>) {
    if entry.options().debug {
        info!("{}", message);
    } else {
        trace!("{}", message);
    }
}

/// Spawns the refresh task for `entry`.
///
/// The task alternates fetch cycles with sleeps of `interval` (after a
/// successful cycle) or `fail_interval` (after a failed one). Before each
/// cycle it checks the entry's idle lifetime; once that has elapsed it asks
/// the registry to retire the entry and exits, unless a reader got to the
/// entry first.
///
/// The registry is held weakly: if it is already gone when the entry expires
/// there is nothing left to remove the entry from.
pub(crate) fn spawn_refresh_task(
    entry: Arc<Entry>,
    fetcher: Arc<dyn Fetcher>,
    stats: Arc<StatsRecorder>,
    registry: Weak<Shared>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if entry.is_idle_expired(Instant::now()) {
                let retired = match registry.upgrade() {
                    Some(shared) => shared.retire(&entry).await,
                    None => true,
                };
                if retired {
                    log_activity(
                        &entry,
                        format_args!("Reached rolling cache end of life: {}", entry.identifier()),
                    );
                    break;
                }
            }

            let succeeded = run_cycle(&entry, fetcher.as_ref(), &stats).await;
            stats.record_cycle(succeeded);

            let delay = if succeeded {
                entry.options().interval
            } else {
                entry.options().effective_fail_interval()
            };
            tokio::time::sleep(delay).await;
        }

        stats.record_expired();
    })
}

/// Runs one fetch cycle: the first attempt plus any retries.
///
/// Retries follow immediately with no delay. Returns whether the cycle ended
/// with a successful fetch. On failure the previous payload is kept.
pub(crate) async fn run_cycle(entry: &Entry, fetcher: &dyn Fetcher, stats: &StatsRecorder) -> bool {
    let max_retries = entry.options().max_retries;
    let mut retries: u32 = 0;

    loop {
        log_activity(
            entry,
            format_args!("Making rolling cache request: {}", entry.identifier()),
        );
        stats.record_attempt();

        match fetcher.fetch(entry.identifier()).await {
            Ok(payload) => {
                log_activity(
                    entry,
                    format_args!("Rolling cache data updated with {} bytes", payload.len()),
                );
                entry.record_success(payload);
                return true;
            }
            Err(err) => {
                stats.record_failure();
                if max_retries.is_exhausted(retries) {
                    warn!(
                        "Too many errors when requesting rolling cache `{}` ({} retries): {}",
                        entry.identifier(),
                        retries,
                        err
                    );
                    entry.record_failure();
                    return false;
                }

                debug!(
                    "Error while requesting rolling cache `{}`, retrying: {}",
                    entry.identifier(),
                    err
                );
                retries = retries.saturating_add(1);
                tokio::task::yield_now().await;
            }
        }
    }
}
