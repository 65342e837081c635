//! Recording wakeup timer for deterministic tests.

use super::WakeupTimer;
use crate::signal::{Signal, Subscription};
use chrono::{DateTime, Utc};
use std::sync::Mutex;

/// A call made against a [`MockWakeupTimer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCall {
    /// `arm(at)`.
    Arm(DateTime<Utc>),
    /// `cancel()`.
    Cancel,
}

/// A [`WakeupTimer`] that never fires on its own.
///
/// Tests inspect [`armed`](Self::armed) and [`calls`](Self::calls), and
/// call [`fire`](Self::fire) to simulate the platform delivering the wakeup.
#[derive(Debug, Default)]
pub struct MockWakeupTimer {
    state: Mutex<MockTimerState>,
    fired: Signal,
    clock_changed: Option<Signal>,
}

#[derive(Debug, Default)]
struct MockTimerState {
    armed: Option<DateTime<Utc>>,
    calls: Vec<TimerCall>,
}

impl MockWakeupTimer {
    /// Create a timer with nothing armed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a timer whose backend also reports clock changes.
    pub fn with_clock_changes() -> Self {
        Self {
            clock_changed: Some(Signal::new()),
            ..Self::default()
        }
    }

    /// Currently armed instant.
    pub fn armed(&self) -> Option<DateTime<Utc>> {
        self.lock().armed
    }

    /// Every arm/cancel call so far, oldest first.
    pub fn calls(&self) -> Vec<TimerCall> {
        self.lock().calls.clone()
    }

    /// Forget recorded calls, keeping the armed instant.
    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Deliver the wakeup: disarm and notify subscribers.
    ///
    /// Fires even when nothing is armed, to simulate spurious or coalesced
    /// platform wakeups.
    pub fn fire(&self) {
        self.lock().armed = None;
        self.fired.emit();
    }

    /// Report a clock change from the timer backend.
    ///
    /// Does nothing unless created with [`with_clock_changes`](Self::with_clock_changes).
    pub fn notify_clock_changed(&self) {
        if let Some(signal) = &self.clock_changed {
            signal.emit();
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockTimerState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl WakeupTimer for MockWakeupTimer {
    fn arm(&self, at: DateTime<Utc>) {
        let mut state = self.lock();
        state.armed = Some(at);
        state.calls.push(TimerCall::Arm(at));
    }

    fn cancel(&self) {
        let mut state = self.lock();
        state.armed = None;
        state.calls.push(TimerCall::Cancel);
    }

    fn fired(&self) -> Subscription {
        self.fired.subscribe()
    }

    fn clock_changed(&self) -> Option<Subscription> {
        self.clock_changed.as_ref().map(Signal::subscribe)
    }
}
