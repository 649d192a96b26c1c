/*!
 * Airport Configuration
 *
 * Runtime configuration for both processes. Counts and limits are fixed in
 * `limits`; only names, paths and timings can be changed.
 */

use super::limits;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// Environment variable overriding the shared memory name
pub const ENV_SHM_NAME: &str = "AIRPORT_SHM_NAME";
/// Environment variable overriding the radio executable path
pub const ENV_RADIO_PATH: &str = "AIRPORT_RADIO_PATH";
/// Environment variable overriding the takeoff duration (milliseconds)
pub const ENV_TAKEOFF_MS: &str = "AIRPORT_TAKEOFF_MS";
/// Environment variable overriding the ground control tick (milliseconds)
pub const ENV_TRAFFIC_INTERVAL_MS: &str = "AIRPORT_TRAFFIC_INTERVAL_MS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AirportConfig {
    /// POSIX shared memory object holding the identity block
    pub shm_name: String,
    /// Radio executable launched by the tower
    pub radio_path: PathBuf,
    /// Time a runway stays occupied per takeoff
    pub takeoff_duration: Duration,
    /// Pause between runway acquisition attempts
    pub runway_backoff: Duration,
    /// Pause after finding no plane waiting
    pub idle_backoff: Duration,
    /// Ground control admission tick
    pub traffic_interval: Duration,
    /// Delay after launching the radio before controllers start
    pub radio_startup_delay: Duration,
    /// Attempts made by ground control to open the segment
    pub shm_open_retries: u32,
    /// Pause between open attempts
    pub shm_open_interval: Duration,
}

impl Default for AirportConfig {
    fn default() -> Self {
        Self {
            shm_name: limits::SHM_NAME.to_string(),
            radio_path: PathBuf::from(limits::RADIO_PATH),
            takeoff_duration: limits::TAKEOFF_DURATION,
            runway_backoff: limits::RUNWAY_BACKOFF,
            idle_backoff: limits::IDLE_BACKOFF,
            traffic_interval: limits::TRAFFIC_INTERVAL,
            radio_startup_delay: limits::RADIO_STARTUP_DELAY,
            shm_open_retries: limits::SHM_OPEN_RETRIES,
            shm_open_interval: limits::SHM_OPEN_INTERVAL,
        }
    }
}

impl AirportConfig {
    /// Defaults overridden by `AIRPORT_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup
    ///
    /// Unparseable durations, and a zero traffic interval, are logged and
    /// ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(name) = lookup(ENV_SHM_NAME) {
            config.shm_name = name;
        }
        if let Some(path) = lookup(ENV_RADIO_PATH) {
            config.radio_path = PathBuf::from(path);
        }
        if let Some(ms) = lookup(ENV_TAKEOFF_MS) {
            if let Some(duration) = parse_millis(ENV_TAKEOFF_MS, &ms) {
                config.takeoff_duration = duration;
            }
        }
        if let Some(ms) = lookup(ENV_TRAFFIC_INTERVAL_MS) {
            match parse_millis(ENV_TRAFFIC_INTERVAL_MS, &ms) {
                Some(duration) if duration.is_zero() => {
                    warn!(variable = ENV_TRAFFIC_INTERVAL_MS, "Ignoring zero traffic interval");
                }
                Some(duration) => config.traffic_interval = duration,
                None => {}
            }
        }

        config
    }

    /// Timings shrunk for tests and local runs
    pub fn fast() -> Self {
        Self {
            takeoff_duration: Duration::from_millis(20),
            traffic_interval: Duration::from_millis(10),
            radio_startup_delay: Duration::from_millis(1),
            shm_open_interval: Duration::from_millis(5),
            ..Self::default()
        }
    }

    /// Replace the shared memory name
    pub fn with_shm_name(mut self, name: impl Into<String>) -> Self {
        self.shm_name = name.into();
        self
    }
}

fn parse_millis(key: &str, value: &str) -> Option<Duration> {
    match value.trim().parse::<u64>() {
        Ok(ms) => Some(Duration::from_millis(ms)),
        Err(e) => {
            warn!(variable = key, value = value, error = %e, "Ignoring invalid duration");
            None
        }
    }
}
