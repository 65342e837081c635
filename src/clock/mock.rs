//! Manually driven clock for deterministic tests.

use super::Clock;
use crate::signal::{Signal, Subscription};
use chrono::{DateTime, FixedOffset, Offset, TimeDelta, Utc};
use std::sync::Mutex;

/// A [`Clock`] whose time only moves when told to.
///
/// Moving the clock does not notify anyone by itself; call
/// [`notify_changed`](Self::notify_changed) to simulate the platform
/// reporting a discontinuity.
#[derive(Debug)]
pub struct MockClock {
    state: Mutex<MockClockState>,
    changed: Signal,
}

#[derive(Debug, Clone, Copy)]
struct MockClockState {
    now: DateTime<Utc>,
    offset: FixedOffset,
}

impl MockClock {
    /// Create a clock at `now` in UTC.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            state: Mutex::new(MockClockState {
                now,
                offset: Utc.fix(),
            }),
            changed: Signal::new(),
        }
    }

    /// Set the current instant.
    pub fn set_now(&self, now: DateTime<Utc>) {
        self.lock().now = now;
    }

    /// Move the current instant by `delta` (may be negative).
    pub fn advance(&self, delta: TimeDelta) {
        let mut state = self.lock();
        state.now += delta;
    }

    /// Set the local UTC offset.
    pub fn set_utc_offset(&self, offset: FixedOffset) {
        self.lock().offset = offset;
    }

    /// Emit a clock-change notification.
    pub fn notify_changed(&self) {
        self.changed.emit();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockClockState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        self.lock().now
    }

    fn utc_offset(&self) -> FixedOffset {
        self.lock().offset
    }

    fn changed(&self) -> Subscription {
        self.changed.subscribe()
    }
}
