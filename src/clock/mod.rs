//! Wall-clock time source.
//!
//! The [`Clock`] is the only source of "now" for the alarm queue. Besides
//! reading time it reports discontinuities: manual time changes, timezone
//! changes, NTP steps, and suspend/resume gaps. Missing one of those can
//! leave an alarm armed for an instant that has already passed, so
//! implementations err on the side of reporting.

mod live;
mod mock;

pub use live::{ClockWatcher, LiveClock};
pub use mock::MockClock;

use crate::signal::Subscription;
use chrono::{DateTime, FixedOffset, Utc};

/// Source of current time and of clock-change notifications.
pub trait Clock: Send + Sync {
    /// Current absolute instant.
    fn now(&self) -> DateTime<Utc>;

    /// Current offset of local time from UTC.
    fn utc_offset(&self) -> FixedOffset;

    /// Current local time.
    fn localtime(&self) -> DateTime<FixedOffset> {
        self.now().with_timezone(&self.utc_offset())
    }

    /// Subscribe to discontinuity notifications.
    fn changed(&self) -> Subscription;
}
