//! System clock and its discontinuity watcher.
//!
//! [`LiveClock`] reads the system wall clock. Operating systems do not give
//! a portable notification for "the wall clock jumped", so [`ClockWatcher`]
//! samples wall-clock and monotonic time together every few seconds and
//! reports a change when the two disagree by more than a threshold, or when
//! the local UTC offset moves.
//!
//! The monotonic clock does not advance while the machine is suspended, so
//! a suspend/resume cycle shows up as the wall clock running ahead of the
//! monotonic one, the same as a forward manual time change.

use super::Clock;
use crate::config::ClockConfig;
use crate::signal::{Signal, Subscription};
use chrono::{DateTime, FixedOffset, Local, Offset, TimeDelta, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// The system clock.
#[derive(Debug, Default)]
pub struct LiveClock {
    changed: Signal,
}

impl LiveClock {
    /// Create a system clock. No changes are reported until a
    /// [`ClockWatcher`] is running for it.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a clock-change notification.
    ///
    /// Hosts that receive platform notifications (a `SIGHUP` from a time
    /// daemon, a D-Bus `TimeChanged`) can forward them here.
    pub fn notify_changed(&self) {
        self.changed.emit();
    }
}

impl Clock for LiveClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn utc_offset(&self) -> FixedOffset {
        Local::now().offset().fix()
    }

    fn changed(&self) -> Subscription {
        self.changed.subscribe()
    }
}

/// One paired reading of wall-clock time, monotonic time, and UTC offset.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Sample {
    pub(crate) wall: DateTime<Utc>,
    pub(crate) mono: Instant,
    pub(crate) offset: FixedOffset,
}

impl Sample {
    fn take(clock: &LiveClock) -> Self {
        Self {
            wall: clock.now(),
            mono: Instant::now(),
            offset: clock.utc_offset(),
        }
    }
}

/// Why a pair of samples counts as a discontinuity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Discontinuity {
    /// Wall clock moved `drift` more (or less, if negative) than monotonic time.
    Jump { drift: TimeDelta },
    /// The local UTC offset changed.
    OffsetChanged { from: FixedOffset, to: FixedOffset },
}

/// Compare two consecutive samples.
pub(crate) fn detect(prev: &Sample, next: &Sample, threshold: TimeDelta) -> Option<Discontinuity> {
    if prev.offset != next.offset {
        return Some(Discontinuity::OffsetChanged {
            from: prev.offset,
            to: next.offset,
        });
    }

    let mono_elapsed = next.mono.saturating_duration_since(prev.mono);
    let mono_elapsed = TimeDelta::from_std(mono_elapsed).unwrap_or(TimeDelta::MAX);
    let wall_elapsed = next.wall.signed_duration_since(prev.wall);
    let drift = wall_elapsed
        .checked_sub(&mono_elapsed)
        .unwrap_or(TimeDelta::MIN);

    if drift.abs() > threshold {
        Some(Discontinuity::Jump { drift })
    } else {
        None
    }
}

/// Polls the system clock and signals [`LiveClock`] subscribers on jumps.
pub struct ClockWatcher {
    clock: Arc<LiveClock>,
    cancel: CancellationToken,
    poll_interval: Duration,
    threshold: TimeDelta,
}

impl ClockWatcher {
    /// Create a watcher for `clock`.
    ///
    /// Call [`run`](Self::run) to start polling.
    pub fn new(clock: Arc<LiveClock>, config: &ClockConfig, cancel: CancellationToken) -> Self {
        Self {
            clock,
            cancel,
            poll_interval: config.poll_interval(),
            threshold: config.jump_threshold(),
        }
    }

    /// Run the watcher loop until the cancellation token is cancelled.
    ///
    /// ```rust,ignore
    /// let watcher = ClockWatcher::new(clock.clone(), &config.clock, cancel.child_token());
    /// tokio::spawn(watcher.run());
    /// ```
    pub async fn run(self) {
        let mut last = Sample::take(&self.clock);
        info!(
            poll_secs = self.poll_interval.as_secs(),
            threshold_secs = self.threshold.num_seconds(),
            "clock watcher started"
        );

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("clock watcher cancelled");
                    break;
                }
                _ = tokio::time::sleep(self.poll_interval) => {
                    let next = Sample::take(&self.clock);
                    match detect(&last, &next, self.threshold) {
                        Some(Discontinuity::Jump { drift }) => {
                            info!(drift_secs = drift.num_seconds(), "wall clock jumped");
                            self.clock.notify_changed();
                        }
                        Some(Discontinuity::OffsetChanged { from, to }) => {
                            info!(%from, %to, "local UTC offset changed");
                            self.clock.notify_changed();
                        }
                        None => debug!("clock sample consistent"),
                    }
                    last = next;
                }
            }
        }
    }
}
