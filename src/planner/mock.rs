//! Planner with a directly settable snapshot.

use super::Planner;
use crate::appointment::{Alarm, Appointment};
use crate::signal::{Signal, Subscription};
use std::sync::Mutex;

/// A [`Planner`] that reports exactly what the test last gave it.
///
/// The snapshot is returned verbatim, without sorting, so tests can also
/// exercise out-of-order input.
#[derive(Debug, Default)]
pub struct MockPlanner {
    upcoming: Mutex<Vec<(Appointment, Alarm)>>,
    changed: Signal,
}

impl MockPlanner {
    /// Create a planner with the given initial snapshot.
    pub fn new(upcoming: Vec<(Appointment, Alarm)>) -> Self {
        Self {
            upcoming: Mutex::new(upcoming),
            changed: Signal::new(),
        }
    }

    /// Replace the snapshot and notify subscribers.
    pub fn set_upcoming(&self, upcoming: Vec<(Appointment, Alarm)>) {
        *self.lock() = upcoming;
        self.changed.emit();
    }

    /// Replace the snapshot without notifying, as a lagging planner would.
    pub fn set_upcoming_silently(&self, upcoming: Vec<(Appointment, Alarm)>) {
        *self.lock() = upcoming;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(Appointment, Alarm)>> {
        self.upcoming
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Planner for MockPlanner {
    fn upcoming(&self) -> Vec<(Appointment, Alarm)> {
        self.lock().clone()
    }

    fn changed(&self) -> Subscription {
        self.changed.subscribe()
    }
}
