use super::*;
use crate::core::chat_stream::RequestConfig;
use crate::core::stream_state::{FailureReason, StreamStatus, Usage};

fn request(text: &str) -> StreamRequest {
    StreamRequest {
        history: Vec::new(),
        input: Message::user(text),
        config: RequestConfig {
            model: "gpt-4o-mini".into(),
            json_mode: false,
            system_instruction: None,
            reasoning_effort: None,
            stream: true,
        },
    }
}

fn started(assembler: &mut StreamAssembler) -> u64 {
    assembler
        .start(request("hi"), Connectivity::Online)
        .expect("start")
        .stream_id
}

#[test]
fn deltas_accumulate_into_finalized_message() {
    let mut assembler = StreamAssembler::new();
    let id = started(&mut assembler);
    assert_eq!(assembler.status(), Some(StreamStatusKind::Pending));

    for fragment in ["Hel", "lo ", "there"] {
        assert!(assembler.apply_event(id, StreamEvent::TextDelta(fragment.into())));
    }
    assert_eq!(assembler.status(), Some(StreamStatusKind::Streaming));
    assert!(assembler.apply_event(id, StreamEvent::Done(None)));

    let message = assembler.finalize().expect("finalize");
    assert_eq!(message, Message::assistant("Hello there"));
    assert!(assembler.state().is_none());
    assert!(!assembler.is_busy());
}

#[test]
fn offline_start_is_rejected_without_touching_state() {
    let mut assembler = StreamAssembler::new();
    let err = assembler
        .start(request("hi"), Connectivity::Offline)
        .unwrap_err();
    assert_eq!(err, CoreError::Offline);
    assert!(assembler.state().is_none());
    assert_eq!(assembler.current_stream_id(), 0);
}

#[test]
fn offline_start_keeps_previous_finished_stream() {
    let mut assembler = StreamAssembler::new();
    let id = started(&mut assembler);
    assembler.apply_event(id, StreamEvent::TextDelta("kept".into()));
    assembler.apply_event(id, StreamEvent::Done(None));
    let before = assembler.state().cloned();

    assert_eq!(
        assembler.start(request("again"), Connectivity::Offline).unwrap_err(),
        CoreError::Offline
    );
    assert_eq!(assembler.state().cloned(), before);
    assert_eq!(assembler.current_stream_id(), id);
}

#[test]
fn second_start_while_active_is_busy() {
    let mut assembler = StreamAssembler::new();
    let id = started(&mut assembler);
    assembler.apply_event(id, StreamEvent::TextDelta("partial".into()));
    let before = assembler.state().cloned();

    let err = assembler
        .start(request("second"), Connectivity::Online)
        .unwrap_err();
    assert_eq!(err, CoreError::Busy);
    assert!(err.is_silent());
    assert_eq!(assembler.state().cloned(), before);
    assert_eq!(assembler.current_stream_id(), id);
}

#[test]
fn busy_takes_precedence_over_offline() {
    let mut assembler = StreamAssembler::new();
    started(&mut assembler);
    assert_eq!(
        assembler.start(request("x"), Connectivity::Offline).unwrap_err(),
        CoreError::Busy
    );
}

#[test]
fn new_stream_supersedes_finished_one() {
    let mut assembler = StreamAssembler::new();
    let first = started(&mut assembler);
    assembler.apply_event(first, StreamEvent::TextDelta("old".into()));
    assembler.apply_event(first, StreamEvent::Error("boom".into()));

    let second = started(&mut assembler);
    assert!(second > first);
    assert_eq!(assembler.status(), Some(StreamStatusKind::Pending));
    assert_eq!(assembler.snapshot().text, "");
}

#[test]
fn stale_events_are_dropped() {
    let mut assembler = StreamAssembler::new();
    let first = started(&mut assembler);
    assembler.cancel();
    let second = started(&mut assembler);

    assert!(!assembler.apply_event(first, StreamEvent::TextDelta("late".into())));
    assert!(assembler.apply_event(second, StreamEvent::TextDelta("fresh".into())));
    assert_eq!(
        assembler.state().map(|s| s.accumulated_text.as_str()),
        Some("fresh")
    );
}

#[test]
fn events_without_a_stream_are_dropped() {
    let mut assembler = StreamAssembler::new();
    assert!(!assembler.apply_event(0, StreamEvent::TextDelta("x".into())));
    assert!(assembler.state().is_none());
}

#[test]
fn cancel_keeps_partial_text_and_signals_token() {
    let mut assembler = StreamAssembler::new();
    let handle = assembler
        .start(request("hi"), Connectivity::Online)
        .expect("start");
    assembler.apply_event(handle.stream_id, StreamEvent::TextDelta("half".into()));

    assert!(assembler.cancel());
    assert!(handle.cancel_token.is_cancelled());
    let state = assembler.state().expect("state kept");
    assert_eq!(state.accumulated_text, "half");
    assert_eq!(
        state.status,
        StreamStatus::Failed {
            reason: FailureReason::Cancelled
        }
    );

    // nothing left to cancel
    assert!(!assembler.cancel());
}

#[test]
fn events_after_cancel_do_not_change_text() {
    let mut assembler = StreamAssembler::new();
    let id = started(&mut assembler);
    assembler.apply_event(id, StreamEvent::TextDelta("a".into()));
    assembler.cancel();
    assembler.apply_event(id, StreamEvent::TextDelta("b".into()));
    assembler.apply_event(id, StreamEvent::Done(None));

    assert_eq!(assembler.status(), Some(StreamStatusKind::Failed));
    assert_eq!(assembler.snapshot().text, "a");
}

#[test]
fn finalize_requires_done() {
    let mut assembler = StreamAssembler::new();
    assert_eq!(
        assembler.finalize().unwrap_err(),
        CoreError::InvalidState {
            operation: "finalize",
            status: None
        }
    );

    let id = started(&mut assembler);
    assembler.apply_event(id, StreamEvent::TextDelta("x".into()));
    assert_eq!(
        assembler.finalize().unwrap_err(),
        CoreError::InvalidState {
            operation: "finalize",
            status: Some(StreamStatusKind::Streaming)
        }
    );

    assembler.apply_event(id, StreamEvent::Error("rate limited".into()));
    let err = assembler.finalize().unwrap_err();
    assert_eq!(
        err,
        CoreError::InvalidState {
            operation: "finalize",
            status: Some(StreamStatusKind::Failed)
        }
    );
    assert_eq!(err.to_string(), "Cannot finalize while the stream is failed");
    // failed state is left for the caller to inspect
    assert!(assembler.state().is_some());
}

#[test]
fn done_usage_is_kept_until_finalize() {
    let mut assembler = StreamAssembler::new();
    let id = started(&mut assembler);
    let usage = Usage {
        prompt_tokens: 10,
        completion_tokens: 4,
    };
    assembler.apply_event(id, StreamEvent::Done(Some(usage)));
    assert_eq!(assembler.state().and_then(StreamState::usage), Some(usage));
    assert_eq!(assembler.finalize().expect("finalize").text, "");
}

#[test]
fn snapshots_follow_every_transition() {
    let mut assembler = StreamAssembler::new();
    let mut rx = assembler.subscribe();
    assert_eq!(rx.borrow().status, None);

    let id = started(&mut assembler);
    assert!(rx.has_changed().expect("sender alive"));
    assert_eq!(
        *rx.borrow_and_update(),
        Snapshot {
            stream_id: id,
            text: String::new(),
            status: Some(StreamStatusKind::Pending),
        }
    );

    assembler.apply_event(id, StreamEvent::TextDelta("Hi".into()));
    assert_eq!(rx.borrow_and_update().text, "Hi");

    assembler.apply_event(id, StreamEvent::Done(None));
    assert_eq!(rx.borrow().status, Some(StreamStatusKind::Done));

    assembler.finalize().expect("finalize");
    assert_eq!(
        *rx.borrow(),
        Snapshot {
            stream_id: id,
            text: String::new(),
            status: None,
        }
    );
}

#[test]
fn stale_events_do_not_publish() {
    let mut assembler = StreamAssembler::new();
    let first = started(&mut assembler);
    assembler.cancel();
    started(&mut assembler);

    let mut rx = assembler.subscribe();
    let _ = rx.borrow_and_update();
    assembler.apply_event(first, StreamEvent::TextDelta("late".into()));
    assert!(!rx.has_changed().expect("sender alive"));
}
