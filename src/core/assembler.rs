//! Assembles one streamed completion at a time into a finished message.

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::core::chat_stream::StreamRequest;
use crate::core::error::CoreError;
use crate::core::message::Message;
use crate::core::stream_state::{self, StreamEvent, StreamState, StreamStatusKind};

/// Whether the client believes it can reach the network right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    Online,
    Offline,
}

/// What the rendering layer sees of the in-flight stream.
///
/// Every published snapshot is a whole value, so a reader never observes a
/// half-applied delta.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub stream_id: u64,
    pub text: String,
    pub status: Option<StreamStatusKind>,
}

/// Returned by [`StreamAssembler::start`]; the caller hands the request to a
/// transport and tags every event it forwards with `stream_id`.
#[derive(Debug)]
pub struct StreamHandle {
    pub stream_id: u64,
    pub cancel_token: CancellationToken,
    pub request: StreamRequest,
}

pub struct StreamAssembler {
    state: Option<StreamState>,
    current_stream_id: u64,
    cancel_token: Option<CancellationToken>,
    snapshot_tx: watch::Sender<Snapshot>,
}

impl Default for StreamAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamAssembler {
    pub fn new() -> Self {
        let (snapshot_tx, _) = watch::channel(Snapshot::default());
        Self {
            state: None,
            current_stream_id: 0,
            cancel_token: None,
            snapshot_tx,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshot_tx.borrow().clone()
    }

    pub fn state(&self) -> Option<&StreamState> {
        self.state.as_ref()
    }

    pub fn status(&self) -> Option<StreamStatusKind> {
        self.state.as_ref().map(|state| state.status.kind())
    }

    pub fn is_busy(&self) -> bool {
        self.state
            .as_ref()
            .is_some_and(|state| state.status.is_active())
    }

    pub fn current_stream_id(&self) -> u64 {
        self.current_stream_id
    }

    pub fn is_current_stream(&self, stream_id: u64) -> bool {
        self.state.is_some() && self.current_stream_id == stream_id
    }

    /// Begin a new stream.
    ///
    /// Rejected with [`CoreError::Busy`] while another stream is pending or
    /// streaming, and with [`CoreError::Offline`] when offline. Neither
    /// rejection touches the existing state.
    pub fn start(
        &mut self,
        request: StreamRequest,
        connectivity: Connectivity,
    ) -> Result<StreamHandle, CoreError> {
        if self.is_busy() {
            return Err(CoreError::Busy);
        }
        if connectivity == Connectivity::Offline {
            return Err(CoreError::Offline);
        }

        self.current_stream_id += 1;
        let cancel_token = CancellationToken::new();
        self.state = Some(StreamState::pending());
        self.cancel_token = Some(cancel_token.clone());
        self.publish();

        debug!(
            stream_id = self.current_stream_id,
            model = %request.config.model,
            "stream started"
        );

        Ok(StreamHandle {
            stream_id: self.current_stream_id,
            cancel_token,
            request,
        })
    }

    /// Apply one transport event. Returns `false` when the event belongs to a
    /// stream that is no longer current and was dropped.
    pub fn apply_event(&mut self, stream_id: u64, event: StreamEvent) -> bool {
        if !self.is_current_stream(stream_id) {
            debug!(stream_id, "dropping event for stale stream");
            return false;
        }
        let Some(state) = self.state.take() else {
            return false;
        };

        if let StreamEvent::Error(detail) = &event {
            debug!(stream_id, %detail, "stream failed");
        }
        self.state = Some(stream_state::reduce(state, event));
        self.publish();
        true
    }

    /// Turn a completed stream into the assistant message and clear it.
    pub fn finalize(&mut self) -> Result<Message, CoreError> {
        match self.status() {
            Some(StreamStatusKind::Done) => {}
            status => {
                return Err(CoreError::InvalidState {
                    operation: "finalize",
                    status,
                })
            }
        }

        let state = self.state.take().unwrap_or_else(StreamState::pending);
        self.cancel_token = None;
        self.publish();
        debug!(
            stream_id = self.current_stream_id,
            chars = state.accumulated_text.len(),
            "stream finalized"
        );
        Ok(Message::assistant(state.accumulated_text))
    }

    /// Best-effort cancellation. Flips local state immediately and signals the
    /// transport; whatever text arrived so far stays visible.
    pub fn cancel(&mut self) -> bool {
        if !self.is_busy() {
            return false;
        }
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
        if let Some(state) = self.state.take() {
            self.state = Some(stream_state::cancel(state));
        }
        self.publish();
        debug!(stream_id = self.current_stream_id, "stream cancelled");
        true
    }

    fn publish(&self) {
        let snapshot = match &self.state {
            Some(state) => Snapshot {
                stream_id: self.current_stream_id,
                text: state.accumulated_text.clone(),
                status: Some(state.status.kind()),
            },
            None => Snapshot {
                stream_id: self.current_stream_id,
                ..Snapshot::default()
            },
        };
        self.snapshot_tx.send_replace(snapshot);
    }
}

#[cfg(test)]
mod tests;
