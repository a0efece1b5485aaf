use std::error::Error;
use std::fmt;

use crate::core::stream_state::StreamStatusKind;

/// Failures surfaced by the streaming core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// No network was detected before sending; the request was never issued.
    Offline,

    /// The remote API answered with a non-success status, or the request
    /// could not be delivered at all.
    Transport(String),

    /// A send was attempted while another stream is still pending or streaming.
    Busy,

    /// An operation was invoked from a state that does not allow it.
    InvalidState {
        operation: &'static str,
        status: Option<StreamStatusKind>,
    },
}

impl CoreError {
    pub fn transport(detail: impl Into<String>) -> Self {
        CoreError::Transport(detail.into())
    }

    /// Busy rejections are expected UI noise and are not reported to the user.
    pub fn is_silent(&self) -> bool {
        matches!(self, CoreError::Busy)
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::Offline => write!(f, "You appear to be offline; nothing was sent"),
            CoreError::Transport(detail) => write!(f, "{detail}"),
            CoreError::Busy => write!(f, "A response is still streaming"),
            CoreError::InvalidState {
                operation,
                status: Some(status),
            } => write!(f, "Cannot {operation} while the stream is {status}"),
            CoreError::InvalidState {
                operation,
                status: None,
            } => write!(f, "Cannot {operation} without an active stream"),
        }
    }
}

impl Error for CoreError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_state_mentions_operation_and_status() {
        let err = CoreError::InvalidState {
            operation: "finalize",
            status: Some(StreamStatusKind::Streaming),
        };
        assert_eq!(
            err.to_string(),
            "Cannot finalize while the stream is streaming"
        );
    }

    #[test]
    fn only_busy_is_silent() {
        assert!(CoreError::Busy.is_silent());
        assert!(!CoreError::Offline.is_silent());
        assert!(!CoreError::transport("boom").is_silent());
    }
}
