use std::collections::VecDeque;
use std::fmt;
use std::pin::Pin;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::{stream, Stream, StreamExt};
use memchr::memchr;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::api::{
    InputContent, InputMessage, InputPart, ReasoningConfig, ResponseObject, ResponsesRequest,
    ResponsesStreamEvent, TextConfig, TextFormat,
};
use crate::core::assembler::StreamHandle;
use crate::core::error::CoreError;
use crate::core::message::{HistoryEntry, Message};
use crate::core::stream_state::{StreamEvent, Usage};
use crate::utils::auth::add_auth_headers;
use crate::utils::url::construct_api_url;

const JSON_MODE_SUFFIX: &str = ". Produce output in JSON format";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    Low,
    Medium,
    High,
}

impl ReasoningEffort {
    pub fn as_str(self) -> &'static str {
        match self {
            ReasoningEffort::Low => "low",
            ReasoningEffort::Medium => "medium",
            ReasoningEffort::High => "high",
        }
    }
}

impl fmt::Display for ReasoningEffort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReasoningEffort {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(ReasoningEffort::Low),
            "medium" => Ok(ReasoningEffort::Medium),
            "high" => Ok(ReasoningEffort::High),
            other => Err(format!(
                "invalid reasoning effort: {other} (expected low, medium or high)"
            )),
        }
    }
}

/// Per-request knobs forwarded to the completion API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestConfig {
    pub model: String,
    pub json_mode: bool,
    pub system_instruction: Option<String>,
    /// Only set when the selected model accepts a reasoning-effort hint.
    pub reasoning_effort: Option<ReasoningEffort>,
    pub stream: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamRequest {
    pub history: Vec<HistoryEntry>,
    pub input: Message,
    pub config: RequestConfig,
}

pub type EventStream = Pin<Box<dyn Stream<Item = StreamEvent> + Send>>;

/// The remote boundary that turns a conversation into response events.
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    async fn send(
        &self,
        history: &[HistoryEntry],
        input: &Message,
        config: &RequestConfig,
    ) -> Result<EventStream, CoreError>;
}

pub fn build_request(
    history: &[HistoryEntry],
    input: &Message,
    config: &RequestConfig,
) -> ResponsesRequest {
    let mut messages: Vec<InputMessage> = history
        .iter()
        .map(|entry| InputMessage {
            role: entry.role.to_string(),
            content: InputContent::Text(entry.content.clone()),
        })
        .collect();

    let mut text = input.text.clone();
    if config.json_mode {
        text.push_str(JSON_MODE_SUFFIX);
    }
    let content = if input.images.is_empty() {
        InputContent::Text(text)
    } else {
        let mut parts = vec![InputPart::Text { text }];
        parts.extend(input.images.iter().map(|image| InputPart::Image {
            image_url: image.data_url.clone(),
        }));
        InputContent::Parts(parts)
    };
    messages.push(InputMessage {
        role: input.api_role().to_string(),
        content,
    });

    ResponsesRequest {
        model: config.model.clone(),
        input: messages,
        stream: config.stream,
        instructions: config
            .system_instruction
            .as_ref()
            .filter(|text| !text.trim().is_empty())
            .cloned(),
        reasoning: config.reasoning_effort.map(|effort| ReasoningConfig {
            effort: effort.as_str().to_string(),
        }),
        text: config.json_mode.then(|| TextConfig {
            format: TextFormat {
                kind: "json_object".to_string(),
            },
        }),
    }
}

fn usage_from(response: &ResponseObject) -> Option<Usage> {
    response.usage.map(|usage| Usage {
        prompt_tokens: usage.input_tokens,
        completion_tokens: usage.output_tokens,
    })
}

fn map_stream_event(event: ResponsesStreamEvent) -> Option<StreamEvent> {
    match event {
        ResponsesStreamEvent::Created { response } => {
            Some(StreamEvent::Created(response.id.unwrap_or_default()))
        }
        ResponsesStreamEvent::OutputTextDelta { delta } => Some(StreamEvent::TextDelta(delta)),
        ResponsesStreamEvent::Completed { response }
        | ResponsesStreamEvent::Incomplete { response } => {
            Some(StreamEvent::Done(usage_from(&response)))
        }
        ResponsesStreamEvent::Failed { response } => {
            let detail = response
                .error
                .and_then(|error| error.message)
                .unwrap_or_else(|| "The response failed".to_string());
            Some(StreamEvent::Error(format!("API Error: {detail}")))
        }
        ResponsesStreamEvent::Error { message, code } => {
            let detail = message.or(code).unwrap_or_else(|| "Unknown error".to_string());
            Some(StreamEvent::Error(format!("API Error: {detail}")))
        }
        ResponsesStreamEvent::Other => None,
    }
}

fn extract_data_payload(line: &str) -> Option<&str> {
    line.strip_prefix("data:").map(str::trim_start)
}

/// Incremental decoder for a server-sent-events body.
///
/// Bytes may arrive split anywhere, including inside a UTF-8 sequence; only
/// complete lines are decoded.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    finished: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once a terminal event (Done or Error) has been produced.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        self.buffer.extend_from_slice(chunk);
        let mut events = Vec::new();

        while let Some(newline_pos) = memchr(b'\n', &self.buffer) {
            if self.finished {
                self.buffer.clear();
                break;
            }
            let line: Vec<u8> = self.buffer.drain(..=newline_pos).collect();
            match std::str::from_utf8(&line[..newline_pos]) {
                Ok(line) => {
                    if let Some(event) = self.process_line(line.trim()) {
                        events.push(event);
                    }
                }
                Err(err) => warn!("Invalid UTF-8 in stream: {err}"),
            }
        }

        events
    }

    /// Flush a trailing unterminated line and report a stream that closed
    /// before completing.
    pub fn finish(&mut self) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        if !self.finished && !self.buffer.is_empty() {
            let rest = std::mem::take(&mut self.buffer);
            let line = String::from_utf8_lossy(&rest);
            if let Some(event) = self.process_line(line.trim()) {
                events.push(event);
            }
        }
        if !self.finished {
            self.finished = true;
            events.push(StreamEvent::Error(
                "Stream ended before the response completed".to_string(),
            ));
        }
        events
    }

    fn process_line(&mut self, line: &str) -> Option<StreamEvent> {
        let payload = extract_data_payload(line)?;
        if payload.is_empty() {
            return None;
        }
        if payload == "[DONE]" {
            self.finished = true;
            return Some(StreamEvent::Done(None));
        }

        let event = match serde_json::from_str::<ResponsesStreamEvent>(payload) {
            Ok(parsed) => map_stream_event(parsed)?,
            Err(_) => StreamEvent::Error(format_api_error(payload)),
        };
        if matches!(event, StreamEvent::Done(_) | StreamEvent::Error(_)) {
            self.finished = true;
        }
        Some(event)
    }
}

/// Adapt a raw byte stream into decoded stream events.
pub fn sse_event_stream<S, B, E>(bytes: S) -> EventStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: fmt::Display + Send + 'static,
{
    struct DecodeState<S> {
        bytes: Pin<Box<S>>,
        decoder: SseDecoder,
        pending: VecDeque<StreamEvent>,
        closed: bool,
    }

    let state = DecodeState {
        bytes: Box::pin(bytes),
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
        closed: false,
    };

    Box::pin(stream::unfold(state, |mut state| async move {
        loop {
            if let Some(event) = state.pending.pop_front() {
                return Some((event, state));
            }
            if state.closed || state.decoder.is_finished() {
                return None;
            }
            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    let events = state.decoder.push(chunk.as_ref());
                    state.pending.extend(events);
                }
                Some(Err(err)) => {
                    state.closed = true;
                    state
                        .pending
                        .push_back(StreamEvent::Error(format_api_error(&err.to_string())));
                }
                None => {
                    state.closed = true;
                    let events = state.decoder.finish();
                    state.pending.extend(events);
                }
            }
        }
    }))
}

/// Replay a whole (non-streamed) response body as the same event sequence a
/// stream would have produced.
pub fn batched_events(body: &str) -> Vec<StreamEvent> {
    match serde_json::from_str::<ResponseObject>(body) {
        Ok(response) => {
            if let Some(error) = response.error.as_ref().and_then(|e| e.message.clone()) {
                return vec![StreamEvent::Error(format!("API Error: {error}"))];
            }
            let mut events = Vec::with_capacity(3);
            if let Some(id) = response.id.clone() {
                events.push(StreamEvent::Created(id));
            }
            events.push(StreamEvent::TextDelta(response.output_text()));
            events.push(StreamEvent::Done(usage_from(&response)));
            events
        }
        Err(_) => vec![StreamEvent::Error(format_api_error(body))],
    }
}

fn extract_error_summary(value: &serde_json::Value) -> Option<String> {
    let summary = value
        .pointer("/error/message")
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .or_else(|| {
            value.get("error").and_then(|v| match v {
                serde_json::Value::String(s) => Some(s.to_string()),
                _ => None,
            })
        })
        .or_else(|| {
            value
                .get("message")
                .and_then(|v| v.as_str().map(str::to_owned))
        });

    summary.map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Render an error body as a short summary followed by a fenced copy of the
/// raw payload, so it displays through the normal message formatter.
pub fn format_api_error(error_text: &str) -> String {
    let trimmed = error_text.trim();

    if trimmed.is_empty() {
        return "API Error:\n```\n<empty>\n```".to_string();
    }

    if let Ok(json_value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if let Ok(pretty_json) = serde_json::to_string_pretty(&json_value) {
            return match extract_error_summary(&json_value) {
                Some(summary) if !summary.is_empty() => {
                    format!("API Error: {summary}\n```json\n{pretty_json}\n```")
                }
                _ => format!("API Error:\n```json\n{pretty_json}\n```"),
            };
        }
    }

    if trimmed.starts_with('<') && trimmed.ends_with('>') {
        format!("API Error:\n```xml\n{trimmed}\n```")
    } else {
        format!("API Error:\n```\n{trimmed}\n```")
    }
}

pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl CompletionTransport for HttpTransport {
    async fn send(
        &self,
        history: &[HistoryEntry],
        input: &Message,
        config: &RequestConfig,
    ) -> Result<EventStream, CoreError> {
        let request = build_request(history, input, config);
        let url = construct_api_url(&self.base_url, "responses");
        let http_request = self
            .client
            .post(url)
            .header("Content-Type", "application/json");
        let http_request = add_auth_headers(http_request, &self.api_key);

        let response = http_request
            .json(&request)
            .send()
            .await
            .map_err(|err| CoreError::transport(format_api_error(&err.to_string())))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            warn!(%status, "completion request rejected");
            return Err(CoreError::transport(format_api_error(&error_text)));
        }

        if config.stream {
            Ok(sse_event_stream(response.bytes_stream()))
        } else {
            let body = response
                .text()
                .await
                .map_err(|err| CoreError::transport(format_api_error(&err.to_string())))?;
            Ok(Box::pin(stream::iter(batched_events(&body))))
        }
    }
}

/// Runs transports on background tasks and funnels their events, tagged with
/// the stream id, into one channel in arrival order.
#[derive(Clone)]
pub struct ChatStreamService {
    tx: mpsc::UnboundedSender<(StreamEvent, u64)>,
}

impl ChatStreamService {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<(StreamEvent, u64)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn spawn_stream(&self, transport: Arc<dyn CompletionTransport>, handle: StreamHandle) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let StreamHandle {
                stream_id,
                cancel_token,
                request,
            } = handle;

            tokio::select! {
                _ = forward_events(transport.as_ref(), &request, stream_id, &tx, &cancel_token) => {}
                _ = cancel_token.cancelled() => {
                    debug!(stream_id, "transport task stopped after cancellation");
                }
            }
        });
    }

    #[cfg(test)]
    pub fn send_for_test(&self, event: StreamEvent, stream_id: u64) {
        let _ = self.tx.send((event, stream_id));
    }
}

async fn forward_events(
    transport: &dyn CompletionTransport,
    request: &StreamRequest,
    stream_id: u64,
    tx: &mpsc::UnboundedSender<(StreamEvent, u64)>,
    cancel_token: &CancellationToken,
) {
    let mut events = match transport
        .send(&request.history, &request.input, &request.config)
        .await
    {
        Ok(events) => events,
        Err(err) => {
            warn!(stream_id, "completion transport failed: {err}");
            let _ = tx.send((StreamEvent::Error(err.to_string()), stream_id));
            return;
        }
    };

    while let Some(event) = events.next().await {
        if cancel_token.is_cancelled() {
            return;
        }
        let terminal = matches!(event, StreamEvent::Done(_) | StreamEvent::Error(_));
        if tx.send((event, stream_id)).is_err() || terminal {
            return;
        }
    }
}
