//! Background Tasks Module
//!
//! Contains the background tasks spawned by the registry.
//!
//! # Tasks
//! - Refresh: re-fetches one entry on its interval until it goes idle

mod refresh;

pub(crate) use refresh::spawn_refresh_task;
#[cfg(test)]
pub(crate) use refresh::run_cycle;
