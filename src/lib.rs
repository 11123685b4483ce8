//! Rolling Cache - background-refreshed caches for remote resources
//!
//! Each registered URL is re-fetched on a fixed interval by its own task.
//! Readers get the latest successfully fetched payload, and caches retire
//! themselves after going unread for longer than their lifetime.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
mod tasks;

pub use api::AppState;
pub use cache::{Entry, Fetcher, HttpFetcher, MaxRetries, Options, Registry};
pub use config::Config;
pub use error::{CacheError, FetchError};
