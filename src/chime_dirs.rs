//! Centralized directory paths for chime.
//!
//! Uses the [`dirs`] crate for platform-appropriate directory resolution.
//!
//! | Purpose | Linux | macOS |
//! |---------|-------|-------|
//! | Config | `~/.config/chime/` | `~/Library/Application Support/chime/` |
//! | Data | `~/.local/share/chime/` | `~/Library/Application Support/chime/` |
//!
//! # Environment Overrides
//!
//! - `CHIME_CONFIG_DIR` overrides [`config_dir`]
//! - `CHIME_DATA_DIR` overrides [`data_dir`]

use std::path::PathBuf;

/// Application config directory.
///
/// Holds `config.toml`.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("CHIME_CONFIG_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::config_dir()
        .map(|d| d.join("chime"))
        .unwrap_or_else(|| PathBuf::from("/tmp/chime-config"))
}

/// Application data directory.
///
/// Holds the default appointment store.
#[must_use]
pub fn data_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("CHIME_DATA_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::data_dir()
        .map(|d| d.join("chime"))
        .unwrap_or_else(|| PathBuf::from("/tmp/chime-data"))
}

/// Main config file path (`config_dir()/config.toml`).
#[must_use]
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

/// Default appointment store path (`data_dir()/appointments.toml`).
#[must_use]
pub fn store_file() -> PathBuf {
    data_dir().join("appointments.toml")
}
