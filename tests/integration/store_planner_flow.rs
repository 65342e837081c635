//! Store file to planner to queue.

use crate::helpers::{appointment, at};
use chime::clock::MockClock;
use chime::planner::store::{load_appointments, save_appointments};
use chime::planner::{Planner, StoreWatcher, UpcomingPlanner};
use chime::timer::MockWakeupTimer;
use chime::{AlarmQueue, SimpleAlarmQueue, Trigger};
use chrono::TimeDelta;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[test]
fn saved_store_loads_back() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("appointments.toml");
    let appointments = vec![appointment("a", at(9, 0)), appointment("b", at(10, 0))];

    save_appointments(&path, &appointments).expect("save");
    assert_eq!(load_appointments(&path).expect("load"), appointments);
}

#[tokio::test]
async fn store_edit_reaches_queue() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("appointments.toml");
    save_appointments(&path, &[appointment("a", at(9, 30))]).expect("save");

    let clock = Arc::new(MockClock::new(at(9, 0)));
    let planner = Arc::new(UpcomingPlanner::new(clock.clone(), TimeDelta::minutes(60)));
    let mut watcher = StoreWatcher::new(
        path.clone(),
        planner.clone(),
        Duration::from_millis(20),
        CancellationToken::new(),
    );
    assert_eq!(watcher.reload().expect("reload"), 1);

    let timer = Arc::new(MockWakeupTimer::new());
    let mut queue = SimpleAlarmQueue::new(clock.clone(), planner.clone(), timer.clone());
    let mut events = queue.subscribe();
    assert_eq!(timer.armed(), Some(at(9, 30)));

    save_appointments(
        &path,
        &[appointment("a", at(9, 30)), appointment("b", at(9, 10))],
    )
    .expect("save");
    watcher.reload().expect("reload");
    assert_eq!(queue.step().await, Some(Trigger::PlannerChanged));
    assert_eq!(timer.armed(), Some(at(9, 10)));

    clock.set_now(at(9, 10));
    timer.fire();
    queue.step().await;
    assert_eq!(events.try_recv().expect("event").appointment.uid, "b");
    assert_eq!(timer.armed(), Some(at(9, 30)));
}

#[tokio::test]
async fn unchanged_reload_does_not_notify() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("appointments.json");
    save_appointments(&path, &[appointment("a", at(9, 30))]).expect("save");

    let clock = Arc::new(MockClock::new(at(9, 0)));
    let planner = Arc::new(UpcomingPlanner::new(clock, TimeDelta::minutes(60)));
    let mut watcher = StoreWatcher::new(
        path,
        planner.clone(),
        Duration::from_secs(1),
        CancellationToken::new(),
    );
    watcher.reload().expect("reload");

    let changed = planner.changed();
    watcher.reload().expect("reload");
    assert!(!changed.is_pending());
}
