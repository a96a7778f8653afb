//! Engine configuration.
//!
//! Defaults, then an optional file, then `RIDES_`-prefixed environment
//! variables (`RIDES_DISPATCH__TICK_INTERVAL_MS=250`).

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::EngineResult;

/// Main engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    /// Dispatch loop configuration
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Ride fixture configuration
    #[serde(default)]
    pub fixtures: FixtureConfig,

    /// Visitor service configuration
    #[serde(default)]
    pub visitors: VisitorServiceConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Dispatch loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Interval between dispatch ticks in milliseconds
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,

    /// Longest a tick waits for one ride's lock before skipping it
    #[serde(default = "default_lock_wait")]
    pub lock_wait_ms: u64,
}

impl DispatchConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn lock_wait(&self) -> Duration {
        Duration::from_millis(self.lock_wait_ms)
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval(),
            lock_wait_ms: default_lock_wait(),
        }
    }
}

/// Ride fixture configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureConfig {
    /// Path to the JSON ride fixture file
    #[serde(default = "default_fixture_path")]
    pub path: PathBuf,

    /// Cycle duration for fixtures that do not specify one
    #[serde(default = "default_cycle_duration")]
    pub default_cycle_duration_secs: u64,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            path: default_fixture_path(),
            default_cycle_duration_secs: default_cycle_duration(),
        }
    }
}

/// Visitor service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitorServiceConfig {
    /// Base URL of the visitor service
    #[serde(default = "default_visitor_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for VisitorServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_visitor_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value helpers
fn default_tick_interval() -> u64 {
    100
}

fn default_lock_wait() -> u64 {
    50
}

fn default_fixture_path() -> PathBuf {
    PathBuf::from("resources/rides.json")
}

fn default_cycle_duration() -> u64 {
    120
}

fn default_visitor_url() -> String {
    "http://localhost:5001".to_string()
}

fn default_request_timeout() -> u64 {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

impl EngineConfig {
    /// Load configuration from file and environment
    pub fn load(path: Option<&str>) -> EngineResult<Self> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&EngineConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("RIDES")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        Ok(builder.build()?.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.dispatch.tick_interval(), Duration::from_millis(100));
        assert_eq!(config.dispatch.lock_wait(), Duration::from_millis(50));
        assert_eq!(config.fixtures.default_cycle_duration_secs, 120);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
    }

    #[test]
    fn test_zero_tick_interval_is_clamped() {
        let dispatch = DispatchConfig {
            tick_interval_ms: 0,
            lock_wait_ms: 0,
        };
        assert_eq!(dispatch.tick_interval(), Duration::from_millis(1));
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let config = EngineConfig::load(None).unwrap();
        assert_eq!(config.dispatch.tick_interval_ms, 100);
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[dispatch]\ntick_interval_ms = 250\n\n[logging]\nlevel = \"debug\"").unwrap();

        let config = EngineConfig::load(file.path().to_str()).unwrap();
        assert_eq!(config.dispatch.tick_interval_ms, 250);
        assert_eq!(config.dispatch.lock_wait_ms, 50);
        assert_eq!(config.logging.level, "debug");
    }
}
