//! Runtime settings, read from `LEVELWATCH_*` environment variables.

use crate::monitor::scheduler::SchedulerConfig;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_SYMBOL: &str = "BTCUSDT";

pub const DEFAULT_LEVELS_FILE: &str = "LevelsFile.txt";

/// Seconds between monitoring ticks
pub const DEFAULT_POLL_SECS: u64 = 2;
pub const MIN_POLL_SECS: u64 = 1;
pub const MAX_POLL_SECS: u64 = 3600;

/// Upper bound on a single price read
pub const DEFAULT_SAMPLE_TIMEOUT_MS: u64 = 1500;
pub const MIN_SAMPLE_TIMEOUT_MS: u64 = 100;
pub const MAX_SAMPLE_TIMEOUT_MS: u64 = 60_000;

/// A ticker older than this is not reported as the current price
pub const DEFAULT_STALE_SECS: u64 = 30;

pub const DEFAULT_RECONNECT_SECS: u64 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub symbol: String,
    pub levels_file: PathBuf,
    pub poll_period: Duration,
    pub sample_timeout: Duration,
    pub stale_after: Duration,
    pub reconnect_delay: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let parse_u64 = |name: &str, default: u64, min: u64, max: u64| {
            match var(name).and_then(|v| v.parse::<u64>().ok()) {
                Some(v) => v.clamp(min, max),
                None => default,
            }
        };

        Self {
            symbol: var("LEVELWATCH_SYMBOL")
                .unwrap_or_else(|| DEFAULT_SYMBOL.to_string())
                .to_uppercase(),
            levels_file: var("LEVELWATCH_LEVELS_FILE")
                .unwrap_or_else(|| DEFAULT_LEVELS_FILE.to_string())
                .into(),
            poll_period: Duration::from_secs(parse_u64(
                "LEVELWATCH_POLL_SECS",
                DEFAULT_POLL_SECS,
                MIN_POLL_SECS,
                MAX_POLL_SECS,
            )),
            sample_timeout: Duration::from_millis(parse_u64(
                "LEVELWATCH_SAMPLE_TIMEOUT_MS",
                DEFAULT_SAMPLE_TIMEOUT_MS,
                MIN_SAMPLE_TIMEOUT_MS,
                MAX_SAMPLE_TIMEOUT_MS,
            )),
            stale_after: Duration::from_secs(parse_u64(
                "LEVELWATCH_STALE_SECS",
                DEFAULT_STALE_SECS,
                1,
                3600,
            )),
            reconnect_delay: Duration::from_secs(parse_u64(
                "LEVELWATCH_RECONNECT_SECS",
                DEFAULT_RECONNECT_SECS,
                1,
                300,
            )),
        }
    }

    pub fn scheduler(&self) -> SchedulerConfig {
        SchedulerConfig {
            period: self.poll_period,
            sample_timeout: self.sample_timeout,
        }
    }
}
