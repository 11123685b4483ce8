//! Configuration Module
//!
//! Handles loading the proxy configuration and default entry options from
//! environment variables.

use std::env;
use std::time::Duration;

use crate::cache::{MaxRetries, Options, DEFAULT_USER_AGENT, LIFETIME_FACTOR};

/// Proxy configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Default refresh interval in seconds
    pub refresh_interval: u64,
    /// Refresh interval in seconds after a failed cycle, None = same as refresh_interval
    pub fail_interval: Option<u64>,
    /// Idle lifetime as a multiple of the refresh interval, 0 = unbounded
    pub lifetime_factor: u32,
    /// In-cycle retries, negative = unlimited
    pub max_retries: i64,
    /// Default wait for the first payload in milliseconds, 0 = wait forever
    pub read_timeout_ms: u64,
    /// Timeout for a single upstream request in seconds
    pub request_timeout: u64,
    /// User agent sent upstream
    pub user_agent: String,
    /// Log refresh activity of every entry at info level
    pub debug: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `REFRESH_INTERVAL` - Refresh interval in seconds (default: 10)
    /// - `FAIL_INTERVAL` - Interval after failures in seconds (default: unset)
    /// - `LIFETIME_FACTOR` - Idle lifetime in intervals (default: 10)
    /// - `MAX_RETRIES` - Retries per cycle, -1 for unlimited (default: 3)
    /// - `READ_TIMEOUT_MS` - Wait for first data in ms (default: 5000)
    /// - `REQUEST_TIMEOUT` - Upstream request timeout in seconds (default: 30)
    /// - `USER_AGENT` - Upstream user agent
    /// - `CACHE_DEBUG` - Verbose refresh logging (default: false)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            refresh_interval: parse_var("REFRESH_INTERVAL").unwrap_or(defaults.refresh_interval),
            fail_interval: parse_var("FAIL_INTERVAL").or(defaults.fail_interval),
            lifetime_factor: parse_var("LIFETIME_FACTOR").unwrap_or(defaults.lifetime_factor),
            max_retries: parse_var("MAX_RETRIES").unwrap_or(defaults.max_retries),
            read_timeout_ms: parse_var("READ_TIMEOUT_MS").unwrap_or(defaults.read_timeout_ms),
            request_timeout: parse_var("REQUEST_TIMEOUT").unwrap_or(defaults.request_timeout),
            user_agent: env::var("USER_AGENT").unwrap_or(defaults.user_agent),
            debug: parse_var("CACHE_DEBUG").unwrap_or(defaults.debug),
        }
    }

    /// Entry options for the given refresh interval, using the configured
    /// fail interval, lifetime factor, retries and debug flag.
    pub fn options_for(&self, interval: Duration) -> Options {
        let mut options = Options::new(interval)
            .with_lifetime(interval.saturating_mul(self.lifetime_factor))
            .with_max_retries(MaxRetries::from(self.max_retries))
            .with_debug(self.debug);
        if let Some(fail) = self.fail_interval {
            options = options.with_fail_interval(Duration::from_secs(fail));
        }
        options
    }

    /// Entry options for the configured default interval.
    pub fn default_options(&self) -> Options {
        self.options_for(Duration::from_secs(self.refresh_interval))
    }

    /// Default read timeout, `None` when readers should wait indefinitely.
    pub fn read_timeout(&self) -> Option<Duration> {
        match self.read_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            refresh_interval: 10,
            fail_interval: None,
            lifetime_factor: LIFETIME_FACTOR,
            max_retries: 3,
            read_timeout_ms: 5000,
            request_timeout: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            debug: false,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}
