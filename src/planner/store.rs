//! File-backed appointment store.
//!
//! Appointments live in a TOML file as `[[appointment]]` tables (each with
//! nested `[[appointment.alarm]]` tables), or in a JSON file holding an
//! array of appointments. [`StoreWatcher`] polls the file's modification
//! time and pushes every successful reload into an [`UpcomingPlanner`].

use super::UpcomingPlanner;
use crate::appointment::Appointment;
use crate::error::{ChimeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default, rename = "appointment")]
    appointments: Vec<Appointment>,
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Load appointments from `path`.
///
/// A missing file is an empty store.
///
/// # Errors
///
/// Returns [`ChimeError::Store`] when the file cannot be read or parsed.
pub fn load_appointments(path: &Path) -> Result<Vec<Appointment>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(ChimeError::Store(format!(
                "cannot read {}: {e}",
                path.display()
            )));
        }
    };

    let appointments = if is_json(path) {
        serde_json::from_str::<Vec<Appointment>>(&content)
            .map_err(|e| ChimeError::Store(format!("cannot parse {}: {e}", path.display())))?
    } else {
        toml::from_str::<StoreFile>(&content)
            .map_err(|e| ChimeError::Store(format!("cannot parse {}: {e}", path.display())))?
            .appointments
    };

    let mut seen = HashSet::new();
    for appt in &appointments {
        if !seen.insert(appt.uid.as_str()) {
            warn!(uid = %appt.uid, "duplicate appointment uid in store");
        }
    }

    Ok(appointments)
}

/// Write appointments to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn save_appointments(path: &Path, appointments: &[Appointment]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = if is_json(path) {
        serde_json::to_string_pretty(appointments)
            .map_err(|e| ChimeError::Store(format!("cannot serialize store: {e}")))?
    } else {
        let file = StoreFile {
            appointments: appointments.to_vec(),
        };
        toml::to_string_pretty(&file)
            .map_err(|e| ChimeError::Store(format!("cannot serialize store: {e}")))?
    };

    std::fs::write(path, content)?;
    Ok(())
}

fn modified_at(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Keeps an [`UpcomingPlanner`] in sync with a store file.
pub struct StoreWatcher {
    path: PathBuf,
    planner: Arc<UpcomingPlanner>,
    cancel: CancellationToken,
    poll_interval: Duration,
    last_modified: Option<SystemTime>,
}

impl StoreWatcher {
    /// Create a watcher feeding `planner` from `path`.
    pub fn new(
        path: PathBuf,
        planner: Arc<UpcomingPlanner>,
        poll_interval: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            path,
            planner,
            cancel,
            poll_interval,
            last_modified: None,
        }
    }

    /// Load the store once, replacing the planner's appointments.
    ///
    /// On a parse failure the planner keeps its previous appointments.
    ///
    /// # Errors
    ///
    /// Returns the load error after logging it.
    pub fn reload(&mut self) -> Result<usize> {
        self.last_modified = modified_at(&self.path);
        let appointments = load_appointments(&self.path).inspect_err(|e| {
            warn!("keeping previous appointments: {e}");
        })?;
        let count = appointments.len();
        if self.planner.set_appointments(appointments) {
            info!(count, path = %self.path.display(), "appointment store reloaded");
        }
        Ok(count)
    }

    /// Poll until cancelled, reloading whenever the modification time changes.
    pub async fn run(mut self) {
        // Errors are logged inside reload.
        let _ = self.reload();

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("store watcher cancelled");
                    break;
                }
                _ = tokio::time::sleep(self.poll_interval) => {
                    let modified = modified_at(&self.path);
                    if modified != self.last_modified {
                        debug!(path = %self.path.display(), "store file changed");
                        let _ = self.reload();
                    }
                }
            }
        }
    }
}
