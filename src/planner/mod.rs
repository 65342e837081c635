//! Upcoming-alarm planners.
//!
//! A [`Planner`] owns appointment storage and query. The alarm queue only
//! ever asks it one question: which (appointment, alarm) pairs are coming
//! up, in time order.

mod mock;
pub mod store;
mod upcoming;

pub use mock::MockPlanner;
pub use store::StoreWatcher;
pub use upcoming::UpcomingPlanner;

use crate::appointment::{Alarm, Appointment};
use crate::signal::Subscription;

/// Continuously maintained, time-ordered set of upcoming alarms.
pub trait Planner: Send + Sync {
    /// Upcoming (appointment, alarm) pairs, ascending by alarm instant.
    fn upcoming(&self) -> Vec<(Appointment, Alarm)>;

    /// Subscribe to notifications of insertions, removals, or reorders.
    fn changed(&self) -> Subscription;
}

/// Flatten appointments into (appointment, alarm) pairs ordered by instant.
///
/// The sort is stable: alarms at the same instant keep appointment order,
/// then their order within the appointment.
pub fn flatten_alarms<'a, I>(appointments: I) -> Vec<(Appointment, Alarm)>
where
    I: IntoIterator<Item = &'a Appointment>,
{
    let mut pairs: Vec<(Appointment, Alarm)> = appointments
        .into_iter()
        .flat_map(|appt| {
            appt.alarms
                .iter()
                .map(move |alarm| (appt.clone(), alarm.clone()))
        })
        .collect();
    pairs.sort_by_key(|(_, alarm)| alarm.time);
    pairs
}
