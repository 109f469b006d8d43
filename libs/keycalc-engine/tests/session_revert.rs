//! Session error auto-revert tests
//!
//! Run on tokio's paused clock so the 2 second revert is deterministic:
//! - Error display appears immediately
//! - Input during the error window is ignored
//! - The revert fires exactly once, after the configured delay

#![allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable

use std::time::Duration;

use keycalc_engine::{
    action_for_key, Action, CalcError, Calculator, Function, Session, SessionConfig,
    SessionHandle,
};
use tokio::task::JoinHandle;

fn start(config: SessionConfig) -> (SessionHandle, JoinHandle<Calculator>) {
    let (session, handle) = Session::new(Calculator::new(), config);
    let task = tokio::spawn(session.run());
    (handle, task)
}

fn keys(handle: &SessionHandle, sequence: &str) {
    for key in sequence.split_whitespace() {
        handle.dispatch(action_for_key(key).unwrap()).unwrap();
    }
}

#[tokio::test(start_paused = true)]
async fn test_error_reverts_after_delay() {
    let (handle, _task) = start(SessionConfig::default());

    keys(&handle, "9 / 0 =");
    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.display, "Error");
    assert_eq!(snapshot.expression, "Division by zero");
    assert!(snapshot.error);

    tokio::time::sleep(Duration::from_millis(1999)).await;
    assert!(handle.snapshot().await.unwrap().error);

    tokio::time::sleep(Duration::from_millis(2)).await;
    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.display, "0");
    assert_eq!(snapshot.expression, "");
    assert!(!snapshot.error);
}

#[tokio::test(start_paused = true)]
async fn test_input_during_error_window_is_ignored() {
    let (handle, _task) = start(SessionConfig::default());

    keys(&handle, "4 + 1 =");
    handle.dispatch(Action::MemoryAdd).unwrap();
    handle.dispatch(Action::Function(Function::Negate)).unwrap();
    handle.dispatch(Action::Function(Function::Sqrt)).unwrap();

    tokio::time::sleep(Duration::from_millis(500)).await;
    keys(&handle, "7 7 . Escape");
    handle.dispatch(Action::MemoryAdd).unwrap();

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.display, "Error");
    assert_eq!(snapshot.expression, "Invalid input for sqrt");
    assert_eq!(snapshot.memory.as_deref(), Some("5"));

    // Revert is still anchored to the original failure
    tokio::time::sleep(Duration::from_millis(1501)).await;
    let snapshot = handle.snapshot().await.unwrap();
    assert!(!snapshot.error);
    assert_eq!(snapshot.display, "0");
    assert_eq!(snapshot.memory.as_deref(), Some("5"));
}

#[tokio::test(start_paused = true)]
async fn test_revert_happens_exactly_once() {
    let (handle, _task) = start(SessionConfig::default());
    let mut updates = handle.subscribe();

    keys(&handle, "1 / 0 =");
    assert!(handle.snapshot().await.unwrap().error);

    tokio::time::sleep(Duration::from_millis(2001)).await;
    keys(&handle, "3");
    assert_eq!(handle.snapshot().await.unwrap().display, "3");

    // A second revert would wipe the new operand
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(handle.snapshot().await.unwrap().display, "3");
    assert_eq!(updates.borrow_and_update().display, "3");
}

#[tokio::test(start_paused = true)]
async fn test_new_error_after_revert_gets_new_window() {
    let (handle, _task) = start(SessionConfig { error_revert_ms: 100 });

    keys(&handle, "1 / 0 =");
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(!handle.snapshot().await.unwrap().error);

    handle.dispatch(Action::Function(Function::Inverse)).unwrap();
    let snapshot = handle.snapshot().await.unwrap();
    assert!(snapshot.error);

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(!handle.snapshot().await.unwrap().error);
}

#[tokio::test(start_paused = true)]
async fn test_subscribers_see_error_and_revert() {
    let (handle, _task) = start(SessionConfig::default());
    let mut updates = handle.subscribe();

    keys(&handle, "0");
    handle.dispatch(Action::Function(Function::Log)).unwrap();

    updates.changed().await.unwrap();
    assert!(updates.borrow_and_update().error);

    updates.changed().await.unwrap();
    let snapshot = updates.borrow_and_update().clone();
    assert!(!snapshot.error);
    assert_eq!(snapshot.display, "0");
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_cancels_pending_revert() {
    let (handle, task) = start(SessionConfig::default());

    keys(&handle, "5 / 0 =");
    handle.snapshot().await.unwrap();
    handle.shutdown();

    let calculator = task.await.unwrap();
    assert!(calculator.is_error());
    assert_eq!(calculator.error(), Some(&CalcError::DivisionByZero));
    assert!(matches!(
        handle.snapshot().await,
        Err(CalcError::SessionClosed)
    ));
}

#[tokio::test]
async fn test_session_ends_when_handles_dropped() {
    let (handle, task) = start(SessionConfig::default());
    keys(&handle, "6 * 7 Enter");
    assert_eq!(handle.snapshot().await.unwrap().display, "42");
    drop(handle);

    let calculator = task.await.unwrap();
    assert_eq!(calculator.display(), "42");
}
