//! The queue running on its own task with the tokio-backed timer.

use crate::helpers::{appointment, at};
use chime::clock::MockClock;
use chime::config::TimerConfig;
use chime::planner::UpcomingPlanner;
use chime::timer::LiveWakeupTimer;
use chime::{AlarmQueue, SimpleAlarmQueue};
use chrono::TimeDelta;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[tokio::test(start_paused = true)]
async fn running_queue_delivers_alarm_when_wall_clock_arrives() {
    let clock = Arc::new(MockClock::new(at(9, 0)));
    let planner = Arc::new(UpcomingPlanner::new(clock.clone(), TimeDelta::minutes(60)));
    planner.set_appointments(vec![appointment("standup", at(9, 10))]);
    let timer = Arc::new(LiveWakeupTimer::new(
        clock.clone(),
        &TimerConfig { max_sleep_secs: 30 },
        tokio::runtime::Handle::current(),
    ));

    let mut queue = SimpleAlarmQueue::new(clock.clone(), planner, timer);
    let mut events = queue.subscribe();
    let cancel = CancellationToken::new();
    let task = queue.run(cancel.clone());

    // Nothing yet: the wall clock has not moved.
    let early = tokio::time::timeout(Duration::from_secs(60), events.recv()).await;
    assert!(early.is_err());

    clock.set_now(at(9, 10));
    let event = tokio::time::timeout(Duration::from_secs(60), events.recv())
        .await
        .expect("alarm delivered")
        .expect("queue alive");
    assert_eq!(event.appointment.uid, "standup");

    cancel.cancel();
    task.await.expect("queue task");
}

#[tokio::test(start_paused = true)]
async fn clock_jump_is_handled_without_waiting_for_the_timer() {
    let clock = Arc::new(MockClock::new(at(9, 0)));
    let planner = Arc::new(UpcomingPlanner::new(clock.clone(), TimeDelta::minutes(60)));
    planner.set_appointments(vec![appointment("a", at(11, 0))]);
    let timer = Arc::new(LiveWakeupTimer::new(
        clock.clone(),
        &TimerConfig {
            max_sleep_secs: 3600,
        },
        tokio::runtime::Handle::current(),
    ));

    let mut queue = SimpleAlarmQueue::new(clock.clone(), planner, timer);
    let mut events = queue.subscribe();
    let cancel = CancellationToken::new();
    let task = queue.run(cancel.clone());

    clock.set_now(at(11, 30));
    clock.notify_changed();
    let event = tokio::time::timeout(Duration::from_secs(1), events.recv())
        .await
        .expect("alarm delivered on clock change")
        .expect("queue alive");
    assert_eq!(event.appointment.uid, "a");

    cancel.cancel();
    task.await.expect("queue task");
}
