//! Alarm queues: decide when each upcoming alarm is reached.
//!
//! [`AlarmQueue`] is the contract consumers depend on; it exposes only the
//! "alarm reached" event. [`SimpleAlarmQueue`] is the default strategy: it
//! keeps one wakeup armed for the nearest alarm and re-evaluates whenever
//! the planner, the clock, or the timer reports something.

mod ledger;
mod simple;

pub use simple::{SimpleAlarmQueue, Trigger};

use crate::appointment::{Alarm, Appointment};
use tokio::sync::mpsc;

/// Emitted once for each alarm whose instant has been reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmReached {
    /// The appointment the alarm belongs to.
    pub appointment: Appointment,
    /// The alarm that fired.
    pub alarm: Alarm,
}

/// Receiver for [`AlarmReached`] events.
pub type AlarmReceiver = mpsc::UnboundedReceiver<AlarmReached>;

/// Source of "alarm reached" events.
///
/// Scheduling strategies implement this so presentation code does not care
/// which one is in use.
pub trait AlarmQueue {
    /// Register a listener.
    ///
    /// Events are delivered in firing order: ascending alarm instant, with
    /// same-instant alarms in planner order.
    fn subscribe(&mut self) -> AlarmReceiver;
}
