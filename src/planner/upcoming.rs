//! In-memory planner restricted to upcoming alarms.

use super::{Planner, flatten_alarms};
use crate::appointment::{Alarm, Appointment};
use crate::clock::Clock;
use crate::signal::{Signal, Subscription};
use chrono::TimeDelta;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Holds a set of appointments and reports their upcoming alarms.
///
/// "Upcoming" is evaluated against the clock at query time and includes
/// alarms up to `lookback` in the past. Without that slack an alarm would
/// already be filtered out by the time its own wakeup is handled.
pub struct UpcomingPlanner {
    clock: Arc<dyn Clock>,
    lookback: TimeDelta,
    appointments: Mutex<Vec<Appointment>>,
    changed: Signal,
}

impl UpcomingPlanner {
    /// Create an empty planner.
    pub fn new(clock: Arc<dyn Clock>, lookback: TimeDelta) -> Self {
        Self {
            clock,
            lookback,
            appointments: Mutex::new(Vec::new()),
            changed: Signal::new(),
        }
    }

    /// Replace the appointment set.
    ///
    /// Subscribers are notified only when the set actually differs.
    /// Returns `true` when it did.
    pub fn set_appointments(&self, appointments: Vec<Appointment>) -> bool {
        {
            let mut current = self.lock();
            if *current == appointments {
                return false;
            }
            debug!(
                before = current.len(),
                after = appointments.len(),
                "planner appointments replaced"
            );
            *current = appointments;
        }
        self.changed.emit();
        true
    }

    /// Number of appointments held, upcoming or not.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` when no appointments are held.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Appointment>> {
        self.appointments
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Planner for UpcomingPlanner {
    fn upcoming(&self) -> Vec<(Appointment, Alarm)> {
        let cutoff = self.clock.now().checked_sub_signed(self.lookback);
        let appointments = self.lock();
        let mut pairs = flatten_alarms(appointments.iter());
        if let Some(cutoff) = cutoff {
            pairs.retain(|(_, alarm)| alarm.time >= cutoff);
        }
        pairs
    }

    fn changed(&self) -> Subscription {
        self.changed.subscribe()
    }
}
