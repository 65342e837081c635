//! The default alarm queue.
//!
//! [`SimpleAlarmQueue`] keeps exactly one wakeup armed, for the earliest
//! upcoming alarm. Any notification (planner change, clock change, timer
//! fire) triggers a full re-evaluation:
//!
//! 1. Replace the candidate set with the planner's current snapshot, minus
//!    alarms that already fired.
//! 2. Read "now" once, then pop and emit every candidate at or before it,
//!    in instant order.
//! 3. Arm the timer for the earliest remaining candidate, or cancel it when
//!    none remain.
//!
//! A timer fire is never taken to mean "the armed alarm is due"; the clock
//! decides. That is what keeps a wakeup delivered early (the clock was set
//! back after arming) from firing anything, and a clock jump past an armed
//! instant from skipping it.
//!
//! There is no watchdog. If the platform drops a wakeup, the overdue alarm
//! fires on the next notification of any kind.

use super::ledger::{AlarmKey, FiredLedger};
use super::{AlarmQueue, AlarmReached, AlarmReceiver};
use crate::appointment::{Alarm, Appointment};
use crate::clock::Clock;
use crate::planner::Planner;
use crate::signal::Subscription;
use crate::timer::WakeupTimer;
use chrono::{DateTime, Utc};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// What caused a re-evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// The queue was just created.
    Initial,
    /// The planner's upcoming set changed.
    PlannerChanged,
    /// The wall clock or timezone changed.
    ClockChanged,
    /// The armed wakeup fired.
    WakeupFired,
}

/// One not-yet-fired alarm awaiting its instant.
#[derive(Debug, Clone)]
struct Candidate {
    appointment: Appointment,
    alarm: Alarm,
}

impl Candidate {
    fn time(&self) -> DateTime<Utc> {
        self.alarm.time
    }
}

/// Alarm queue that re-derives its state from the planner on every
/// notification.
pub struct SimpleAlarmQueue {
    clock: Arc<dyn Clock>,
    planner: Arc<dyn Planner>,
    timer: Arc<dyn WakeupTimer>,
    planner_changed: Option<Subscription>,
    clock_changed: Option<Subscription>,
    timer_clock_changed: Option<Subscription>,
    timer_fired: Option<Subscription>,
    /// Sorted by instant; ties in planner order.
    candidates: VecDeque<Candidate>,
    armed: Option<DateTime<Utc>>,
    fired: FiredLedger,
    listeners: Vec<mpsc::UnboundedSender<AlarmReached>>,
    /// Events emitted while nobody was listening.
    backlog: Vec<AlarmReached>,
}

impl SimpleAlarmQueue {
    /// Create a queue and evaluate it immediately.
    ///
    /// Alarms already due at construction are held until the first
    /// [`subscribe`](AlarmQueue::subscribe).
    pub fn new(
        clock: Arc<dyn Clock>,
        planner: Arc<dyn Planner>,
        timer: Arc<dyn WakeupTimer>,
    ) -> Self {
        let planner_changed = Some(planner.changed());
        let clock_changed = Some(clock.changed());
        let timer_clock_changed = timer.clock_changed();
        let timer_fired = Some(timer.fired());

        let mut queue = Self {
            clock,
            planner,
            timer,
            planner_changed,
            clock_changed,
            timer_clock_changed,
            timer_fired,
            candidates: VecDeque::new(),
            armed: None,
            fired: FiredLedger::default(),
            listeners: Vec::new(),
            backlog: Vec::new(),
        };
        queue.reevaluate(Trigger::Initial);
        queue
    }

    /// Instant the wakeup is armed for, if any.
    pub fn armed(&self) -> Option<DateTime<Utc>> {
        self.armed
    }

    /// Number of alarms waiting to fire.
    pub fn pending(&self) -> usize {
        self.candidates.len()
    }

    /// Waiting alarms in firing order.
    pub fn upcoming(&self) -> impl Iterator<Item = (&Appointment, &Alarm)> {
        self.candidates.iter().map(|c| (&c.appointment, &c.alarm))
    }

    /// Wait for the next notification and re-evaluate.
    ///
    /// Returns the trigger that was handled, or `None` once every
    /// notification source has closed.
    pub async fn step(&mut self) -> Option<Trigger> {
        loop {
            if self.planner_changed.is_none()
                && self.clock_changed.is_none()
                && self.timer_clock_changed.is_none()
                && self.timer_fired.is_none()
            {
                return None;
            }

            let (trigger, source, alive) = tokio::select! {
                biased;
                alive = recv_or_pending(&mut self.clock_changed) => {
                    (Trigger::ClockChanged, Source::Clock, alive)
                }
                alive = recv_or_pending(&mut self.timer_clock_changed) => {
                    (Trigger::ClockChanged, Source::TimerClock, alive)
                }
                alive = recv_or_pending(&mut self.planner_changed) => {
                    (Trigger::PlannerChanged, Source::Planner, alive)
                }
                alive = recv_or_pending(&mut self.timer_fired) => {
                    (Trigger::WakeupFired, Source::TimerFired, alive)
                }
            };

            if !alive {
                debug!(?source, "notification source closed");
                *self.subscription_mut(source) = None;
                continue;
            }

            self.reevaluate(trigger);
            return Some(trigger);
        }
    }

    /// Spawn a task that handles notifications until `cancel` fires.
    ///
    /// The queue is dropped when the task ends, which cancels any armed
    /// wakeup.
    pub fn run(mut self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                pending = self.pending(),
                armed = ?self.armed,
                "alarm queue started"
            );
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        info!("alarm queue cancelled");
                        break;
                    }
                    trigger = self.step() => {
                        if trigger.is_none() {
                            info!("alarm queue has no notification sources left, stopping");
                            break;
                        }
                    }
                }
            }
        })
    }

    fn subscription_mut(&mut self, source: Source) -> &mut Option<Subscription> {
        match source {
            Source::Clock => &mut self.clock_changed,
            Source::TimerClock => &mut self.timer_clock_changed,
            Source::Planner => &mut self.planner_changed,
            Source::TimerFired => &mut self.timer_fired,
        }
    }

    fn reevaluate(&mut self, trigger: Trigger) {
        let snapshot = self.planner.upcoming();

        let present: HashSet<AlarmKey> = snapshot
            .iter()
            .map(|(appt, alarm)| AlarmKey::of(appt, alarm))
            .collect();
        self.fired.prune(&present, self.clock.now());

        let mut candidates: Vec<Candidate> = snapshot
            .into_iter()
            .filter(|(appt, alarm)| !self.fired.contains(&AlarmKey::of(appt, alarm)))
            .map(|(appointment, alarm)| Candidate { appointment, alarm })
            .collect();
        // Stable: equal instants keep planner order.
        candidates.sort_by_key(Candidate::time);
        self.candidates = candidates.into();

        debug!(
            ?trigger,
            candidates = self.candidates.len(),
            fired = self.fired.len(),
            "re-evaluating alarm queue"
        );

        self.fire_due();
        self.rearm();
    }

    fn fire_due(&mut self) {
        if self.candidates.is_empty() {
            return;
        }

        // One reading for the whole batch.
        let now = self.clock.now();
        while self.candidates.front().is_some_and(|c| c.time() <= now) {
            let Some(due) = self.candidates.pop_front() else {
                break;
            };
            self.fired
                .record_once(AlarmKey::of(&due.appointment, &due.alarm));
            self.emit(AlarmReached {
                appointment: due.appointment,
                alarm: due.alarm,
            });
        }
    }

    fn rearm(&mut self) {
        match self.candidates.front().map(Candidate::time) {
            Some(at) => {
                if self.armed == Some(at) {
                    debug!(%at, "re-arming wakeup");
                } else {
                    info!(%at, pending = self.candidates.len(), "arming wakeup");
                }
                self.timer.arm(at);
                self.armed = Some(at);
            }
            None => {
                if self.armed.take().is_some() {
                    info!("no upcoming alarms, wakeup cancelled");
                }
                self.timer.cancel();
            }
        }
    }

    fn emit(&mut self, event: AlarmReached) {
        info!(
            uid = %event.appointment.uid,
            at = %event.alarm.time,
            summary = %event.appointment.summary,
            "alarm reached"
        );

        self.listeners.retain(|tx| tx.send(event.clone()).is_ok());
        if self.listeners.is_empty() {
            self.backlog.push(event);
        }
    }
}

impl AlarmQueue for SimpleAlarmQueue {
    fn subscribe(&mut self) -> AlarmReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        for event in self.backlog.drain(..) {
            // The receiver is alive; it is returned below.
            let _ = tx.send(event);
        }
        self.listeners.push(tx);
        rx
    }
}

impl Drop for SimpleAlarmQueue {
    fn drop(&mut self) {
        if self.armed.take().is_some() {
            self.timer.cancel();
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Source {
    Clock,
    TimerClock,
    Planner,
    TimerFired,
}

async fn recv_or_pending(subscription: &mut Option<Subscription>) -> bool {
    match subscription {
        Some(sub) => sub.recv().await,
        None => std::future::pending().await,
    }
}
