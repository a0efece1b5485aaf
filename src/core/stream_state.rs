//! Explicit stream lifecycle and the pure reducer that drives it.
//!
//! A stream moves `Pending -> Streaming -> Done | Failed`. `Done` and `Failed`
//! are terminal: once reached, further events leave the state untouched.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Token accounting reported by the completion API when a response finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

impl Usage {
    pub fn total_tokens(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// One unit of the incremental response protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Created(String),
    TextDelta(String),
    Done(Option<Usage>),
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    Error(String),
    Cancelled,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Error(detail) => write!(f, "{detail}"),
            FailureReason::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamStatus {
    Pending,
    Streaming,
    Done { usage: Option<Usage> },
    Failed { reason: FailureReason },
}

/// Payload-free view of [`StreamStatus`], handy for errors and comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStatusKind {
    Pending,
    Streaming,
    Done,
    Failed,
}

impl fmt::Display for StreamStatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StreamStatusKind::Pending => "pending",
            StreamStatusKind::Streaming => "streaming",
            StreamStatusKind::Done => "done",
            StreamStatusKind::Failed => "failed",
        };
        f.write_str(label)
    }
}

impl StreamStatus {
    pub fn kind(&self) -> StreamStatusKind {
        match self {
            StreamStatus::Pending => StreamStatusKind::Pending,
            StreamStatus::Streaming => StreamStatusKind::Streaming,
            StreamStatus::Done { .. } => StreamStatusKind::Done,
            StreamStatus::Failed { .. } => StreamStatusKind::Failed,
        }
    }

    /// Pending and Streaming both block a new send.
    pub fn is_active(&self) -> bool {
        matches!(self, StreamStatus::Pending | StreamStatus::Streaming)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamState {
    pub accumulated_text: String,
    pub response_id: Option<String>,
    pub status: StreamStatus,
}

impl StreamState {
    pub fn pending() -> Self {
        Self {
            accumulated_text: String::new(),
            response_id: None,
            status: StreamStatus::Pending,
        }
    }

    pub fn usage(&self) -> Option<Usage> {
        match self.status {
            StreamStatus::Done { usage } => usage,
            _ => None,
        }
    }
}

/// Apply one event to a stream state.
///
/// Pure: the only inputs are the previous state and the event. Text deltas
/// are appended verbatim in the order they are applied.
pub fn reduce(mut state: StreamState, event: StreamEvent) -> StreamState {
    if state.status.is_terminal() {
        return state;
    }

    match event {
        StreamEvent::Created(response_id) => {
            state.response_id = Some(response_id);
            state.status = StreamStatus::Streaming;
        }
        StreamEvent::TextDelta(fragment) => {
            state.accumulated_text.push_str(&fragment);
            state.status = StreamStatus::Streaming;
        }
        StreamEvent::Done(usage) => {
            state.status = StreamStatus::Done { usage };
        }
        StreamEvent::Error(detail) => {
            state.status = StreamStatus::Failed {
                reason: FailureReason::Error(detail),
            };
        }
    }
    state
}

/// Mark a still-active stream as cancelled. Terminal states are unchanged.
pub fn cancel(mut state: StreamState) -> StreamState {
    if state.status.is_active() {
        state.status = StreamStatus::Failed {
            reason: FailureReason::Cancelled,
        };
    }
    state
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply_all(events: Vec<StreamEvent>) -> StreamState {
        events.into_iter().fold(StreamState::pending(), reduce)
    }

    #[test]
    fn first_event_moves_pending_to_streaming() {
        let state = reduce(StreamState::pending(), StreamEvent::Created("resp_1".into()));
        assert_eq!(state.status, StreamStatus::Streaming);
        assert_eq!(state.response_id.as_deref(), Some("resp_1"));

        let state = reduce(StreamState::pending(), StreamEvent::TextDelta("x".into()));
        assert_eq!(state.status, StreamStatus::Streaming);
    }

    #[test]
    fn deltas_concatenate_in_delivery_order() {
        let fragments = ["a", "", "bc", " ", "a", "a"];
        let state = apply_all(
            fragments
                .iter()
                .map(|f| StreamEvent::TextDelta(f.to_string()))
                .collect(),
        );
        assert_eq!(state.accumulated_text, fragments.concat());
    }

    #[test]
    fn done_freezes_text() {
        let usage = Usage {
            prompt_tokens: 3,
            completion_tokens: 5,
        };
        let state = apply_all(vec![
            StreamEvent::TextDelta("kept".into()),
            StreamEvent::Done(Some(usage)),
            StreamEvent::TextDelta(" ignored".into()),
            StreamEvent::Error("late".into()),
        ]);
        assert_eq!(state.accumulated_text, "kept");
        assert_eq!(state.usage(), Some(usage));
        assert_eq!(state.status.kind(), StreamStatusKind::Done);
    }

    #[test]
    fn error_keeps_partial_text() {
        let state = apply_all(vec![
            StreamEvent::TextDelta("partial".into()),
            StreamEvent::Error("overloaded".into()),
        ]);
        assert_eq!(state.accumulated_text, "partial");
        assert_eq!(
            state.status,
            StreamStatus::Failed {
                reason: FailureReason::Error("overloaded".into())
            }
        );
    }

    #[test]
    fn cancel_only_affects_active_streams() {
        let streaming = reduce(StreamState::pending(), StreamEvent::TextDelta("hi".into()));
        let cancelled = cancel(streaming);
        assert_eq!(
            cancelled.status,
            StreamStatus::Failed {
                reason: FailureReason::Cancelled
            }
        );
        assert_eq!(cancelled.accumulated_text, "hi");

        let done = reduce(StreamState::pending(), StreamEvent::Done(None));
        assert_eq!(cancel(done.clone()), done);
    }
}
