//! Monitor configuration.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::Path;

use fading_core::{Error, Result};
use fading_detect::{FadingThresholds, MonitorConfig};

/// Recommended polling interval range (seconds)
pub const RECOMMENDED_INTERVAL_SECS: (f64, f64) = (0.1, 2.0);

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Classification thresholds
    pub thresholds: FadingThresholds,

    /// Polling loop configuration
    pub monitor: PollingConfig,

    /// Signal source configuration
    pub source: SourceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Seconds between polls
    pub poll_interval_secs: f64,

    /// Samples passed to the narrator with each event
    pub report_context_len: usize,

    /// Event channel capacity
    pub event_queue_size: usize,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 0.5,
            report_context_len: 40,
            event_queue_size: 256,
        }
    }
}

/// Where readings come from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Simulated,
    /// Windows `netsh wlan show interfaces`
    Netsh,
    /// Linux `iw dev <iface> link`
    Iw,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub kind: SourceKind,

    /// Interface name (`wlan0`, `Wi-Fi`, ...)
    pub interface: Option<String>,

    /// Seed for the simulated source
    pub seed: Option<u64>,
}

impl AppConfig {
    /// Load configuration from file
    pub fn from_file(path: &Path) -> std::result::Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(Self::environment())
            .build()?;

        settings.try_deserialize()
    }

    /// Load from environment variables
    pub fn from_env() -> std::result::Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(Self::environment())
            .build()?;

        settings.try_deserialize()
    }

    /// Load from an optional file plus environment, then validate.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path),
            None => Self::from_env(),
        }
        .map_err(|e| Error::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// `FADING_MONITOR__POLL_INTERVAL_SECS=1.0` style overrides
    fn environment() -> config::Environment {
        config::Environment::with_prefix("FADING")
            .separator("__")
            .try_parsing(true)
    }

    pub fn validate(&self) -> Result<()> {
        self.thresholds.validate()?;

        let interval = self.monitor.poll_interval_secs;
        if !(interval > 0.0 && interval <= 60.0) {
            return Err(Error::Config(format!(
                "poll interval must be in (0, 60] seconds, got {interval}"
            )));
        }

        let (low, high) = RECOMMENDED_INTERVAL_SECS;
        if !(low..=high).contains(&interval) {
            tracing::warn!(
                "Poll interval {interval}s is outside the recommended range {low}-{high}s"
            );
        }

        if self.monitor.event_queue_size == 0 {
            return Err(Error::Config("event queue size must be positive".into()));
        }

        Ok(())
    }

    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            thresholds: self.thresholds,
            report_context_len: self.monitor.report_context_len,
            event_queue_size: self.monitor.event_queue_size,
            ..Default::default()
        }
        .with_poll_interval_secs(self.monitor.poll_interval_secs)
    }
}
