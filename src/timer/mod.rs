//! One-shot absolute-time wakeups.
//!
//! A [`WakeupTimer`] holds at most one pending wakeup. Arming replaces
//! whatever was armed before; the `fired` notification is emitted once per
//! successful arm, at or after the armed instant.

mod live;
mod mock;

pub use live::LiveWakeupTimer;
pub use mock::{MockWakeupTimer, TimerCall};

use crate::signal::Subscription;
use chrono::{DateTime, Utc};

/// Single-shot wakeup scheduling.
pub trait WakeupTimer: Send + Sync {
    /// Arm a wakeup for `at`, replacing any previously armed instant.
    fn arm(&self, at: DateTime<Utc>);

    /// Clear any armed wakeup.
    fn cancel(&self);

    /// Subscribe to wakeup-fired notifications.
    fn fired(&self) -> Subscription;

    /// Subscribe to clock-change notifications raised by the timer backend.
    ///
    /// Backends that observe time changes themselves (a kernel timerfd with
    /// `TFD_TIMER_CANCEL_ON_SET`, a power daemon) report them here. Returns
    /// `None` when the backend relies on the [`Clock`](crate::clock::Clock)
    /// for this.
    fn clock_changed(&self) -> Option<Subscription> {
        None
    }
}
