//! End-to-end scheduling scenarios: queue driven by the in-memory planner.

use crate::helpers::{Harness, appointment, at};
use chime::timer::TimerCall;
use chime::{Alarm, Trigger};
use chrono::TimeDelta;

#[tokio::test]
async fn morning_of_meetings_fires_in_order() {
    let mut h = Harness::new(
        at(8, 0),
        vec![
            appointment("a", at(9, 0)),
            appointment("b", at(9, 0)),
            appointment("c", at(9, 30)),
        ],
    );
    assert_eq!(h.timer.armed(), Some(at(9, 0)));

    h.fire_at(at(9, 0)).await;
    assert_eq!(h.fired_uids(), vec!["a", "b"]);
    assert_eq!(h.timer.armed(), Some(at(9, 30)));

    h.fire_at(at(9, 30)).await;
    assert_eq!(h.fired_uids(), vec!["c"]);
    assert_eq!(h.timer.armed(), None);
    assert_eq!(h.queue.pending(), 0);
}

#[tokio::test]
async fn each_alarm_fires_once_across_repeated_notifications() {
    let mut h = Harness::new(at(9, 0), vec![appointment("a", at(9, 5))]);

    h.fire_at(at(9, 5)).await;
    // Planner still reports the alarm inside its lookback window.
    h.jump_to(at(9, 6)).await;
    h.fire_at(at(9, 7)).await;
    h.planner
        .set_appointments(vec![appointment("a", at(9, 5)), appointment("z", at(11, 0))]);
    h.queue.step().await;

    assert_eq!(h.fired_uids(), vec!["a"]);
    assert_eq!(h.timer.armed(), Some(at(11, 0)));
}

#[tokio::test]
async fn clock_jump_forward_fires_only_passed_alarms() {
    let mut h = Harness::new(
        at(9, 0),
        vec![appointment("five", at(9, 5)), appointment("ten", at(9, 10))],
    );

    h.jump_to(at(9, 7)).await;
    assert_eq!(h.fired_uids(), vec!["five"]);
    assert_eq!(h.timer.armed(), Some(at(9, 10)));
}

#[tokio::test]
async fn clock_jump_backward_fires_nothing() {
    let mut h = Harness::new(at(9, 0), vec![appointment("five", at(9, 5))]);

    h.jump_to(at(8, 0)).await;
    assert!(h.fired_uids().is_empty());
    assert_eq!(h.timer.armed(), Some(at(9, 5)));
}

#[tokio::test]
async fn cancelled_meeting_never_fires() {
    let mut h = Harness::new(at(9, 0), vec![appointment("gone", at(9, 5))]);
    h.timer.clear_calls();

    h.planner.set_appointments(Vec::new());
    assert_eq!(h.queue.step().await, Some(Trigger::PlannerChanged));
    assert_eq!(h.timer.calls(), vec![TimerCall::Cancel]);
    assert_eq!(h.timer.armed(), None);

    h.jump_to(at(10, 0)).await;
    assert!(h.fired_uids().is_empty());
}

#[tokio::test]
async fn new_earlier_appointment_rearms_wakeup() {
    let mut h = Harness::new(at(9, 0), vec![appointment("late", at(12, 0))]);
    assert_eq!(h.timer.armed(), Some(at(12, 0)));

    h.planner.set_appointments(vec![
        appointment("late", at(12, 0)),
        appointment("early", at(9, 15)),
    ]);
    h.queue.step().await;
    assert_eq!(h.timer.armed(), Some(at(9, 15)));
}

#[tokio::test]
async fn multiple_alarms_of_one_appointment_fire_separately() {
    let begin = at(10, 0);
    let appt = chime::Appointment::new("review", "Design review", begin, begin + TimeDelta::hours(1))
        .with_alarm(Alarm::new(at(9, 45), "in 15 minutes"))
        .with_alarm(Alarm::new(at(9, 55), "in 5 minutes"));
    let mut h = Harness::new(at(9, 0), vec![appt]);
    assert_eq!(h.timer.armed(), Some(at(9, 45)));

    h.fire_at(at(9, 45)).await;
    h.fire_at(at(9, 55)).await;
    assert_eq!(
        h.fired(),
        vec![
            ("review".to_string(), "in 15 minutes".to_string()),
            ("review".to_string(), "in 5 minutes".to_string()),
        ]
    );
}

#[tokio::test]
async fn spurious_wakeup_with_nothing_due_only_rearms() {
    let mut h = Harness::new(at(9, 0), vec![appointment("a", at(9, 30))]);
    h.timer.clear_calls();

    h.fire_at(at(9, 1)).await;
    assert!(h.fired_uids().is_empty());
    assert_eq!(h.timer.calls(), vec![TimerCall::Arm(at(9, 30))]);
}

#[tokio::test]
async fn clock_set_back_after_firing_does_not_fire_again() {
    let mut h = Harness::new(at(9, 0), vec![appointment("a", at(9, 5))]);

    h.fire_at(at(9, 5)).await;
    assert_eq!(h.fired_uids(), vec!["a"]);

    // Past the lookback window the planner stops reporting the alarm...
    h.jump_to(at(10, 10)).await;
    assert_eq!(h.queue.pending(), 0);
    assert_eq!(h.timer.armed(), None);

    // ...and reports it again once the clock is set back.
    h.jump_to(at(9, 10)).await;
    assert!(h.fired_uids().is_empty());
    assert_eq!(h.timer.armed(), None);

    h.jump_to(at(9, 4)).await;
    h.fire_at(at(9, 5)).await;
    assert!(h.fired_uids().is_empty());
}
