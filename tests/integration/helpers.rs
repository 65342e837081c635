//! Shared helpers for integration tests.

use chime::clock::MockClock;
use chime::planner::UpcomingPlanner;
use chime::timer::MockWakeupTimer;
use chime::{Alarm, AlarmQueue, AlarmReceiver, Appointment, SimpleAlarmQueue};
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use std::sync::Arc;

/// 2026-03-02 at `h:m:00` UTC.
pub(crate) fn at(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, h, m, 0).unwrap()
}

/// A half-hour appointment with one alarm at `alarm_at`.
pub(crate) fn appointment(uid: &str, alarm_at: DateTime<Utc>) -> Appointment {
    Appointment::new(uid, format!("{uid} meeting"), alarm_at, alarm_at + TimeDelta::minutes(30))
        .with_alarm(Alarm::new(alarm_at, format!("{uid} starts")))
}

/// Mock clock, real in-memory planner, recording timer, and a subscribed queue.
pub(crate) struct Harness {
    pub clock: Arc<MockClock>,
    pub planner: Arc<UpcomingPlanner>,
    pub timer: Arc<MockWakeupTimer>,
    pub queue: SimpleAlarmQueue,
    pub events: AlarmReceiver,
}

impl Harness {
    pub(crate) fn new(now: DateTime<Utc>, appointments: Vec<Appointment>) -> Self {
        let clock = Arc::new(MockClock::new(now));
        let planner = Arc::new(UpcomingPlanner::new(clock.clone(), TimeDelta::minutes(60)));
        planner.set_appointments(appointments);
        let timer = Arc::new(MockWakeupTimer::new());
        let mut queue = SimpleAlarmQueue::new(clock.clone(), planner.clone(), timer.clone());
        let events = queue.subscribe();
        Self {
            clock,
            planner,
            timer,
            queue,
            events,
        }
    }

    /// Move the clock and deliver the wakeup, as the platform would.
    pub(crate) async fn fire_at(&mut self, now: DateTime<Utc>) {
        self.clock.set_now(now);
        self.timer.fire();
        self.queue.step().await;
    }

    /// Set the clock and report a jump.
    pub(crate) async fn jump_to(&mut self, now: DateTime<Utc>) {
        self.clock.set_now(now);
        self.clock.notify_changed();
        self.queue.step().await;
    }

    /// Drain pending events as `(uid, alarm text)` pairs.
    pub(crate) fn fired(&mut self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            out.push((event.appointment.uid, event.alarm.text));
        }
        out
    }

    pub(crate) fn fired_uids(&mut self) -> Vec<String> {
        self.fired().into_iter().map(|(uid, _)| uid).collect()
    }
}
