use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::common::*;
use crate::workflows::assessment::countdown::{
    spawn_countdown, Clock, CountdownExit, IntervalClock, ManualClock,
};
use crate::workflows::assessment::domain::{CompletionCause, SessionStatus};
use crate::workflows::assessment::session::{Session, SessionEvent};

fn shared_active_session() -> Arc<Mutex<Session>> {
    Arc::new(Mutex::new(active_session()))
}

#[tokio::test]
async fn manual_ticks_expire_the_session_and_fire_the_callback() {
    let clock = ManualClock::new();
    let session = shared_active_session();
    let expired = Arc::new(Mutex::new(None));

    let sink = Arc::clone(&expired);
    let handle = spawn_countdown(Arc::clone(&session), clock.ticker(), move |session| {
        *sink.lock().expect("sink mutex poisoned") = session.result().cloned();
    });
    assert_eq!(handle.attempt(), 1);

    assert_eq!(clock.advance(720), 1);
    assert_eq!(handle.join().await, CountdownExit::Expired);

    let guard = session.lock().expect("session mutex poisoned");
    assert_eq!(guard.status(), SessionStatus::Completed);
    assert_eq!(guard.completion(), Some(CompletionCause::TimeExpired));
    assert_eq!(guard.time_left_seconds(), 0);
    let result = expired
        .lock()
        .expect("sink mutex poisoned")
        .clone()
        .expect("callback received the result");
    assert_eq!(result.time_taken_seconds, 720);
}

#[tokio::test]
async fn submission_supersedes_the_running_countdown() {
    let clock = ManualClock::new();
    let session = shared_active_session();
    let handle = spawn_countdown(Arc::clone(&session), clock.ticker(), |_| {
        panic!("a submitted session must not expire");
    });

    clock.advance(10);
    while session.lock().expect("session mutex poisoned").time_left_seconds() > 710 {
        tokio::task::yield_now().await;
    }
    session
        .lock()
        .expect("session mutex poisoned")
        .apply(SessionEvent::Submit);
    clock.advance(1);

    assert_eq!(handle.join().await, CountdownExit::Superseded);
    let guard = session.lock().expect("session mutex poisoned");
    assert_eq!(guard.completion(), Some(CompletionCause::Submitted));
    assert_eq!(guard.result().expect("result").time_taken_seconds, 10);
}

#[tokio::test]
async fn restart_supersedes_the_previous_attempt_countdown() {
    let clock = ManualClock::new();
    let session = shared_active_session();
    let stale = spawn_countdown(Arc::clone(&session), clock.ticker(), |_| {});

    session
        .lock()
        .expect("session mutex poisoned")
        .apply(SessionEvent::Restart);
    clock.advance(1);

    assert_eq!(stale.join().await, CountdownExit::Superseded);
    let guard = session.lock().expect("session mutex poisoned");
    assert_eq!(guard.attempt(), 2);
    assert_eq!(guard.time_left_seconds(), 720);
}

#[tokio::test]
async fn cancelled_countdowns_stop_ticking() {
    let clock = ManualClock::new();
    let session = shared_active_session();
    let handle = spawn_countdown(Arc::clone(&session), clock.ticker(), |_| {});

    handle.cancel();
    tokio::time::sleep(Duration::from_millis(10)).await;
    clock.advance(5);
    tokio::time::sleep(Duration::from_millis(10)).await;

    let guard = session.lock().expect("session mutex poisoned");
    assert_eq!(guard.time_left_seconds(), 720);
    assert_eq!(guard.status(), SessionStatus::Active);
}

#[tokio::test]
async fn closed_tick_source_ends_the_countdown() {
    let session = shared_active_session();
    let ticker = {
        let clock = ManualClock::new();
        clock.ticker()
    };

    let handle = spawn_countdown(session, ticker, |_| {});

    assert_eq!(handle.join().await, CountdownExit::SourceClosed);
}

#[tokio::test(start_paused = true)]
async fn interval_clock_ticks_once_per_period() {
    let session = shared_active_session();
    let handle = spawn_countdown(
        Arc::clone(&session),
        IntervalClock::new(Duration::from_millis(100)).ticker(),
        |_| {},
    );

    tokio::time::sleep(Duration::from_millis(350)).await;
    assert_eq!(
        session
            .lock()
            .expect("session mutex poisoned")
            .time_left_seconds(),
        717
    );

    handle.cancel();
}
