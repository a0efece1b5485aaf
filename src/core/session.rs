//! One interactive chat: the transcript, the single in-flight stream, and
//! the knobs that shape each request.

use tokio::sync::watch;
use tracing::debug;

use crate::core::assembler::{Connectivity, Snapshot, StreamAssembler, StreamHandle};
use crate::core::chat_stream::{ReasoningEffort, RequestConfig, StreamRequest};
use crate::core::config::Config;
use crate::core::cost::format_cost;
use crate::core::error::CoreError;
use crate::core::message::{Conversation, HistoryEntry, ImageRef, Message};
use crate::core::models::{find_model, ModelSpec};
use crate::core::stream_state::{FailureReason, StreamEvent, StreamStatus, Usage};

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub model: String,
    pub json_mode: bool,
    pub system_instruction: Option<String>,
    pub reasoning_effort: Option<ReasoningEffort>,
    pub stream: bool,
    pub remember_context: bool,
    pub conversion_rate: f64,
    pub currency: String,
}

impl SessionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.default_model().to_string(),
            json_mode: config.json_mode(),
            system_instruction: config.system_instruction.clone(),
            reasoning_effort: config.reasoning_effort,
            stream: config.stream(),
            remember_context: config.remember_context(),
            conversion_rate: config.conversion_rate(),
            currency: config.currency().to_string(),
        }
    }
}

/// What applying one transport event did to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamUpdate {
    /// The event belonged to a superseded or cancelled stream.
    Stale,
    /// Text or status changed; the stream is still running.
    Progress,
    /// The assistant message was appended to the conversation.
    Completed {
        message: Message,
        usage: Option<Usage>,
    },
    /// The stream failed; its partial text was not appended.
    Failed(FailureReason),
}

pub struct ChatSession {
    conversation: Conversation,
    assembler: StreamAssembler,
    settings: SessionSettings,
    models: Vec<ModelSpec>,
    pending_images: Vec<ImageRef>,
    /// Model the in-flight request was sent to.
    request_model: Option<String>,
    /// Usage of the last completed reply, with the model that produced it.
    last_usage: Option<(String, Usage)>,
}

impl ChatSession {
    pub fn new(settings: SessionSettings, models: Vec<ModelSpec>) -> Self {
        Self {
            conversation: Conversation::new(),
            assembler: StreamAssembler::new(),
            settings,
            models,
            pending_images: Vec::new(),
            request_model: None,
            last_usage: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(SessionSettings::from_config(config), config.model_catalog())
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn models(&self) -> &[ModelSpec] {
        &self.models
    }

    pub fn is_busy(&self) -> bool {
        self.assembler.is_busy()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.assembler.subscribe()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.assembler.snapshot()
    }

    pub fn last_usage(&self) -> Option<Usage> {
        self.last_usage.as_ref().map(|(_, usage)| *usage)
    }

    pub fn pending_images(&self) -> &[ImageRef] {
        &self.pending_images
    }

    pub fn attach_image(&mut self, image: ImageRef) {
        self.pending_images.push(image);
    }

    /// Whether the current model accepts a reasoning-effort hint.
    pub fn supports_reasoning_effort(&self) -> bool {
        find_model(&self.models, &self.settings.model)
            .is_some_and(|model| model.supports_reasoning_effort)
    }

    pub fn request_config(&self) -> RequestConfig {
        RequestConfig {
            model: self.settings.model.clone(),
            json_mode: self.settings.json_mode,
            system_instruction: self.settings.system_instruction.clone(),
            reasoning_effort: self
                .settings
                .reasoning_effort
                .filter(|_| self.supports_reasoning_effort()),
            stream: self.settings.stream,
        }
    }

    /// Queue a user message and start streaming the reply.
    ///
    /// The message is appended as soon as the single-flight check passes and
    /// stays in the conversation even when the send is then rejected for
    /// being offline. Pending image attachments go out with it.
    pub fn send(
        &mut self,
        text: &str,
        connectivity: Connectivity,
    ) -> Result<StreamHandle, CoreError> {
        if self.assembler.is_busy() {
            return Err(CoreError::Busy);
        }

        let history: Vec<HistoryEntry> = if self.settings.remember_context {
            self.conversation.history()
        } else {
            Vec::new()
        };
        let images = std::mem::take(&mut self.pending_images);
        let input = Message::user_with_images(text, images);
        self.conversation.push(input.clone());

        let config = self.request_config();
        let model = config.model.clone();
        let request = StreamRequest {
            history,
            input,
            config,
        };
        let handle = self.assembler.start(request, connectivity)?;
        self.request_model = Some(model);
        Ok(handle)
    }

    /// Events after the stream reached a terminal state report `Stale`, so a
    /// failure is reported once.
    pub fn apply_event(&mut self, stream_id: u64, event: StreamEvent) -> StreamUpdate {
        let already_terminal = self
            .assembler
            .state()
            .is_some_and(|state| state.status.is_terminal());
        if already_terminal || !self.assembler.apply_event(stream_id, event) {
            return StreamUpdate::Stale;
        }

        let status = match self.assembler.state() {
            Some(state) => state.status.clone(),
            None => return StreamUpdate::Stale,
        };
        match status {
            StreamStatus::Pending | StreamStatus::Streaming => StreamUpdate::Progress,
            StreamStatus::Done { usage } => match self.assembler.finalize() {
                Ok(message) => {
                    self.conversation.push(message.clone());
                    let model = self
                        .request_model
                        .take()
                        .unwrap_or_else(|| self.settings.model.clone());
                    self.last_usage = usage.map(|usage| (model, usage));
                    StreamUpdate::Completed { message, usage }
                }
                Err(err) => {
                    debug!("finalize after done failed: {err}");
                    StreamUpdate::Stale
                }
            },
            StreamStatus::Failed { reason } => StreamUpdate::Failed(reason),
        }
    }

    pub fn cancel(&mut self) -> bool {
        self.assembler.cancel()
    }

    /// Drop the transcript. A running stream is cancelled first.
    pub fn clear(&mut self) {
        self.assembler.cancel();
        self.conversation.clear();
        self.pending_images.clear();
        self.request_model = None;
        self.last_usage = None;
    }

    pub fn set_model(&mut self, model: impl Into<String>) {
        self.settings.model = model.into();
    }

    pub fn toggle_json_mode(&mut self) -> bool {
        self.settings.json_mode = !self.settings.json_mode;
        self.settings.json_mode
    }

    pub fn toggle_remember_context(&mut self) -> bool {
        self.settings.remember_context = !self.settings.remember_context;
        self.settings.remember_context
    }

    pub fn toggle_stream(&mut self) -> bool {
        self.settings.stream = !self.settings.stream;
        self.settings.stream
    }

    pub fn set_reasoning_effort(&mut self, effort: Option<ReasoningEffort>) {
        self.settings.reasoning_effort = effort;
    }

    /// Blank instructions clear the setting.
    pub fn set_system_instruction(&mut self, instruction: &str) {
        let trimmed = instruction.trim();
        self.settings.system_instruction = (!trimmed.is_empty()).then(|| trimmed.to_string());
    }

    /// Cost of the last completed response in the configured currency,
    /// priced for the model that produced it.
    pub fn cost_report(&self) -> Option<String> {
        self.last_usage.as_ref().map(|(model, usage)| {
            format_cost(
                usage,
                model,
                &self.models,
                self.settings.conversion_rate,
                &self.settings.currency,
            )
        })
    }
}
