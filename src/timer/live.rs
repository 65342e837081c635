//! Wakeup timer backed by tokio sleeps.
//!
//! Each arm spawns one task that sleeps toward the armed instant in slices
//! of at most `max_sleep`, re-reading the wall clock after every slice. The
//! slicing keeps a long wait honest when the wall clock moves underneath a
//! monotonic sleep; the alarm queue still gets the authoritative clock-change
//! notification from the [`Clock`](crate::clock::Clock).

use super::WakeupTimer;
use crate::clock::Clock;
use crate::config::TimerConfig;
use crate::signal::{Signal, Subscription};
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

/// A [`WakeupTimer`] running on a tokio runtime.
pub struct LiveWakeupTimer {
    clock: Arc<dyn Clock>,
    runtime: Handle,
    max_sleep: Duration,
    fired: Arc<Signal>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl LiveWakeupTimer {
    /// Create a timer that measures time with `clock` and spawns onto `runtime`.
    pub fn new(clock: Arc<dyn Clock>, config: &TimerConfig, runtime: Handle) -> Self {
        Self {
            clock,
            runtime,
            max_sleep: config.max_sleep(),
            fired: Arc::new(Signal::new()),
            pending: Mutex::new(None),
        }
    }

    fn replace_pending(&self, next: Option<JoinHandle<()>>) {
        let mut pending = self
            .pending
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(previous) = pending.take() {
            previous.abort();
        }
        *pending = next;
    }
}

impl WakeupTimer for LiveWakeupTimer {
    fn arm(&self, at: DateTime<Utc>) {
        let clock = Arc::clone(&self.clock);
        let fired = Arc::clone(&self.fired);
        let max_sleep = self.max_sleep;
        let task = self.runtime.spawn(async move {
            sleep_until_wall(clock.as_ref(), at, max_sleep).await;
            debug!(%at, "wakeup fired");
            fired.emit();
        });
        self.replace_pending(Some(task));
    }

    fn cancel(&self) {
        self.replace_pending(None);
    }

    fn fired(&self) -> Subscription {
        self.fired.subscribe()
    }
}

impl Drop for LiveWakeupTimer {
    fn drop(&mut self) {
        self.replace_pending(None);
    }
}

/// Sleep until `clock` reads at least `at`.
async fn sleep_until_wall(clock: &dyn Clock, at: DateTime<Utc>, max_sleep: Duration) {
    loop {
        let remaining = at.signed_duration_since(clock.now());
        // Non-positive deltas fail the conversion.
        let Ok(remaining) = remaining.to_std() else {
            return;
        };
        if remaining.is_zero() {
            return;
        }
        tokio::time::sleep(remaining.min(max_sleep)).await;
    }
}
