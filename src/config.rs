//! Configuration types for the alarm daemon.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChimeConfig {
    /// Clock discontinuity detection.
    pub clock: ClockConfig,
    /// Upcoming-alarm planner and appointment store.
    pub planner: PlannerConfig,
    /// Wakeup timer behaviour.
    pub timer: TimerConfig,
}

/// Clock watcher configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// How often the watcher samples wall-clock and monotonic time.
    pub poll_interval_secs: u64,
    /// Wall-vs-monotonic drift, in seconds, reported as a clock change.
    ///
    /// Must comfortably exceed scheduler jitter; NTP slews below it are
    /// ignored, steps and suspend/resume gaps above it are reported.
    pub jump_threshold_secs: u64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 5,
            jump_threshold_secs: 10,
        }
    }
}

impl ClockConfig {
    /// Poll interval as a [`Duration`] (never zero).
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    /// Jump threshold as a [`chrono::TimeDelta`].
    pub fn jump_threshold(&self) -> chrono::TimeDelta {
        i64::try_from(self.jump_threshold_secs)
            .ok()
            .and_then(chrono::TimeDelta::try_seconds)
            .unwrap_or(chrono::TimeDelta::MAX)
    }
}

/// Planner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// How far in the past an alarm may be and still count as upcoming.
    ///
    /// Alarms that became due while the device was suspended for less than
    /// this long still fire on resume; older ones are considered stale.
    pub lookback_mins: u64,
    /// Appointment store file (TOML or JSON). `None` uses the default path.
    pub store_path: Option<PathBuf>,
    /// How often the store file is checked for modifications.
    pub reload_interval_secs: u64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            lookback_mins: 60,
            store_path: None,
            reload_interval_secs: 10,
        }
    }
}

impl PlannerConfig {
    /// Lookback window as a [`chrono::TimeDelta`].
    pub fn lookback(&self) -> chrono::TimeDelta {
        i64::try_from(self.lookback_mins)
            .ok()
            .and_then(chrono::TimeDelta::try_minutes)
            .unwrap_or(chrono::TimeDelta::MAX)
    }

    /// Resolved store path.
    pub fn store_path(&self) -> PathBuf {
        self.store_path
            .clone()
            .unwrap_or_else(crate::chime_dirs::store_file)
    }

    /// Reload interval as a [`Duration`] (never zero).
    pub fn reload_interval(&self) -> Duration {
        Duration::from_secs(self.reload_interval_secs.max(1))
    }
}

/// Wakeup timer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    /// Longest single sleep before the timer re-checks the wall clock.
    pub max_sleep_secs: u64,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self { max_sleep_secs: 60 }
    }
}

impl TimerConfig {
    /// Maximum sleep slice as a [`Duration`] (never zero).
    pub fn max_sleep(&self) -> Duration {
        Duration::from_secs(self.max_sleep_secs.max(1))
    }
}

impl ChimeConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| crate::error::ChimeError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::ChimeError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> PathBuf {
        crate::chime_dirs::config_file()
    }
}
