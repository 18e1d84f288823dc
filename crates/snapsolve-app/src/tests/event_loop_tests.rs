use std::sync::Arc;
use std::time::Duration;

use snapsolve_answer::AnswerError;
use snapsolve_config::Config;
use snapsolve_types::ControllerState;
use tokio::time::timeout;

use super::support::{FakeAnswer, FakeCapture, SharedBuf, pipeline, png_count};
use crate::events::{AppEvent, event_loop};
use crate::io::on_press;
use crate::state::{AppState, GatePermit, TriggerGate};

fn test_state() -> Arc<AppState> {
    let config = Config::from_lookup(|key| (key == "API_KEY").then(|| "test-key".to_string()))
        .unwrap();
    Arc::new(AppState::new(config))
}

async fn wait_for_idle(state: &AppState) -> GatePermit {
    timeout(Duration::from_secs(5), async {
        loop {
            if let Some(permit) = state.gate.try_acquire() {
                return permit;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("gate never returned to idle")
}

#[test]
fn test_gate_rejects_second_activation() {
    let gate = Arc::new(TriggerGate::new());
    assert_eq!(gate.state(), ControllerState::Idle);

    let permit = gate.try_acquire().expect("idle gate must open");
    assert_eq!(gate.state(), ControllerState::Processing);
    assert!(gate.try_acquire().is_none());

    drop(permit);
    assert_eq!(gate.state(), ControllerState::Idle);
    assert!(gate.try_acquire().is_some());
}

#[test]
fn test_press_while_idle_queues_trigger() {
    let state = test_state();
    let (tx, rx) = kanal::bounded_async::<AppEvent>(1);

    assert!(on_press(&state, &tx));
    assert_eq!(state.gate.state(), ControllerState::Processing);
    assert!(matches!(rx.try_recv(), Ok(Some(AppEvent::Trigger(_)))));

    // The received permit was dropped with the event
    assert_eq!(state.gate.state(), ControllerState::Idle);
    assert_eq!(state.status.blocking_read().rejected, 0);
}

#[test]
fn test_press_while_processing_is_rejected_and_counted() {
    let state = test_state();
    let (tx, rx) = kanal::bounded_async::<AppEvent>(1);
    let running = state.gate.try_acquire().unwrap();

    assert!(on_press(&state, &tx));
    assert!(on_press(&state, &tx));

    assert!(rx.is_empty());
    assert_eq!(state.status.blocking_read().rejected, 2);
    assert_eq!(state.gate.state(), ControllerState::Processing);

    drop(running);
    assert_eq!(state.gate.state(), ControllerState::Idle);
}

#[test]
fn test_press_with_full_queue_reopens_gate() {
    let state = test_state();
    let (tx, rx) = kanal::bounded_async::<AppEvent>(1);

    // Fill the only slot with a trigger from an unrelated gate
    let other = Arc::new(TriggerGate::new());
    assert!(tx.try_send(AppEvent::Trigger(other.try_acquire().unwrap())).unwrap());

    assert!(on_press(&state, &tx));
    assert_eq!(rx.len(), 1);
    assert_eq!(state.gate.state(), ControllerState::Idle);
    assert_eq!(state.status.blocking_read().rejected, 0);
}

#[test]
fn test_press_after_event_loop_is_gone_stops_listener() {
    let state = test_state();
    let (tx, rx) = kanal::bounded_async::<AppEvent>(1);
    drop(rx);

    assert!(!on_press(&state, &tx));
    assert_eq!(state.gate.state(), ControllerState::Idle);
}

#[tokio::test]
async fn test_loop_survives_service_error_and_handles_next_trigger() {
    let dir = tempfile::tempdir().unwrap();
    let answer = Arc::new(FakeAnswer::new(
        dir.path(),
        vec![
            Err(AnswerError::Api {
                status: 500,
                message: "internal".into(),
            }),
            Ok("question : 1 + 1?\nanswer : 2".into()),
        ],
    ));
    let state = test_state();
    let out = SharedBuf::default();
    let (tx, rx) = kanal::bounded_async::<AppEvent>(4);

    let handle = tokio::spawn(event_loop(
        state.clone(),
        pipeline(FakeCapture { has_window: true }, answer.clone(), dir.path()),
        out.console(),
        rx,
    ));

    let first = state.gate.try_acquire().unwrap();
    tx.send(AppEvent::Trigger(first)).await.unwrap();

    // The gate reopens once the failed cycle is done
    let second = wait_for_idle(&state).await;
    tx.send(AppEvent::Trigger(second)).await.unwrap();

    drop(wait_for_idle(&state).await);
    drop(tx);
    timeout(Duration::from_secs(5), handle)
        .await
        .expect("event loop did not exit")
        .unwrap()
        .unwrap();

    assert_eq!(answer.call_count(), 2);
    assert_eq!(state.gate.state(), ControllerState::Idle);
    assert_eq!(png_count(dir.path()), 0);

    let status = state.status.read().await;
    assert_eq!(status.cycles, 2);
    assert_eq!(status.failed, 1);
    assert_eq!(status.answered, 1);

    let printed = out.contents();
    assert!(printed.contains("Failed to analyze question"));
    assert!(printed.contains("question : 1 + 1?\nanswer : 2\n"));
    assert!(printed.ends_with("Waiting for screenshot... "));
}

#[tokio::test]
async fn test_loop_exits_when_senders_are_gone() {
    let dir = tempfile::tempdir().unwrap();
    let answer = Arc::new(FakeAnswer::new(dir.path(), vec![]));
    let (tx, rx) = kanal::bounded_async::<AppEvent>(1);
    drop(tx);

    let result = timeout(
        Duration::from_secs(1),
        event_loop(
            test_state(),
            pipeline(FakeCapture { has_window: true }, answer.clone(), dir.path()),
            SharedBuf::default().console(),
            rx,
        ),
    )
    .await;

    assert!(result.expect("loop should not block").is_ok());
    assert_eq!(answer.call_count(), 0);
}
