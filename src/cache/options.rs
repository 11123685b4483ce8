//! Entry Options Module
//!
//! Immutable refresh configuration supplied when an entry is created.

use std::time::Duration;

use crate::error::{CacheError, Result};

/// Multiplier used by [`Options::rolling`] to derive the idle lifetime.
pub const LIFETIME_FACTOR: u32 = 10;

// == Max Retries ==
/// How many in-cycle retries are allowed before a cycle is declared failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxRetries {
    /// Give up after this many retries (0 = a single attempt per cycle)
    Limited(u32),
    /// Keep retrying within the cycle until a fetch succeeds
    Unlimited,
}

impl MaxRetries {
    /// Returns true once `retries` has reached the cap.
    pub fn is_exhausted(&self, retries: u32) -> bool {
        match self {
            MaxRetries::Limited(max) => retries >= *max,
            MaxRetries::Unlimited => false,
        }
    }
}

impl Default for MaxRetries {
    fn default() -> Self {
        MaxRetries::Limited(0)
    }
}

impl From<i64> for MaxRetries {
    /// Negative values mean unlimited retries.
    fn from(value: i64) -> Self {
        if value < 0 {
            MaxRetries::Unlimited
        } else {
            MaxRetries::Limited(u32::try_from(value).unwrap_or(u32::MAX))
        }
    }
}

// == Options ==
/// Refresh configuration for a single entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Delay between cycles after a successful cycle
    pub interval: Duration,
    /// Delay between cycles after a failed cycle, `None` = same as `interval`
    pub fail_interval: Option<Duration>,
    /// Maximum idle time without reads, zero = unbounded
    pub lifetime: Duration,
    /// In-cycle retry cap
    pub max_retries: MaxRetries,
    /// Log refresh activity at info level
    pub debug: bool,
}

impl Options {
    // == Constructors ==
    /// Creates options with the given interval, no idle lifetime and no retries.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            fail_interval: None,
            lifetime: Duration::ZERO,
            max_retries: MaxRetries::default(),
            debug: false,
        }
    }

    /// Creates options whose lifetime is `interval * 10`.
    pub fn rolling(interval: Duration) -> Self {
        Self::new(interval).with_lifetime(interval.saturating_mul(LIFETIME_FACTOR))
    }

    pub fn with_fail_interval(mut self, fail_interval: Duration) -> Self {
        self.fail_interval = Some(fail_interval);
        self
    }

    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    pub fn with_max_retries(mut self, max_retries: MaxRetries) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    // == Validation ==
    /// Rejects options that cannot drive a refresh loop.
    pub fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            return Err(CacheError::Configuration(
                "a rolling cache interval must be set".to_string(),
            ));
        }
        Ok(())
    }

    // == Derived Values ==
    /// Delay used after a failed cycle.
    pub fn effective_fail_interval(&self) -> Duration {
        match self.fail_interval {
            Some(fail) if !fail.is_zero() => fail,
            _ => self.interval,
        }
    }

    /// Idle lifetime, or `None` when the entry never expires.
    pub fn idle_lifetime(&self) -> Option<Duration> {
        if self.lifetime.is_zero() {
            None
        } else {
            Some(self.lifetime)
        }
    }
}
