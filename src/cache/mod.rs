//! Cache Module
//!
//! Rolling caches: entries that keep the latest copy of a remote resource
//! fresh in the background and retire themselves when nobody reads them.

mod entry;
mod fetcher;
mod options;
mod registry;
mod stats;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export public types
pub use entry::{Entry, EntrySummary, Snapshot};
pub use fetcher::{Fetcher, HttpFetcher, DEFAULT_USER_AGENT};
pub use options::{MaxRetries, Options, LIFETIME_FACTOR};
pub use registry::Registry;
pub use stats::{CacheStats, StatsRecorder};

pub(crate) use registry::Shared;
