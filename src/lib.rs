//! Chime: calendar alarm scheduling core.
//!
//! Decides *when* each upcoming calendar alarm is reached and emits an
//! "alarm reached" event for it, exactly once, in time order.
//!
//! # Architecture
//!
//! The queue sits between three collaborators, each behind a trait:
//! - **Clock**: wall-clock time, UTC offset, and change notifications
//! - **Planner**: the current set of upcoming (appointment, alarm) pairs
//! - **WakeupTimer**: a single-shot wakeup at an absolute instant
//!
//! [`SimpleAlarmQueue`] re-evaluates on every notification from any of
//! them, fires what is due, and keeps one wakeup armed for the rest.

pub mod appointment;
pub mod chime_dirs;
pub mod clock;
pub mod config;
pub mod error;
pub mod planner;
pub mod queue;
pub mod signal;
pub mod timer;

pub use appointment::{Alarm, Appointment, AppointmentKind};
pub use config::ChimeConfig;
pub use error::{ChimeError, Result};
pub use queue::{AlarmQueue, AlarmReached, AlarmReceiver, SimpleAlarmQueue, Trigger};
