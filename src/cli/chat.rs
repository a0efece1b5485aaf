//! Interactive chat loop.
//!
//! Lines typed at the prompt are either slash commands or messages. While a
//! reply streams the prompt is not read; Ctrl+C cancels the reply instead of
//! quitting.

use std::error::Error;
use std::io::{self, IsTerminal, Stdout};
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::cli::setup::{bootstrap, Bootstrap, RunOverrides};
use crate::commands::{process_input, CommandContext, CommandResult};
use crate::core::chat_stream::{ChatStreamService, CompletionTransport};
use crate::core::config::Config;
use crate::core::formatter::{FormatOptions, MessageFormatter};
use crate::core::session::{ChatSession, StreamUpdate};
use crate::core::stream_state::StreamEvent;
use crate::ui::render::RenderOptions;
use crate::ui::reply::ReplyPrinter;
use crate::ui::sink::{Notification, TerminalSink, UserSink};
use crate::ui::theme::Theme;
use crate::utils::net::probe_connectivity;

const PROMPT: &str = "> ";

struct ChatLoop {
    session: ChatSession,
    transport: Arc<dyn CompletionTransport>,
    service: ChatStreamService,
    printer: ReplyPrinter<Stdout>,
    sink: TerminalSink,
    base_url: String,
    echo_input: bool,
}

impl ChatLoop {
    fn new(
        config: &Config,
        session: ChatSession,
        transport: Arc<dyn CompletionTransport>,
        service: ChatStreamService,
    ) -> Self {
        let theme = Theme::from_config_name(config.theme.as_deref());
        let formatter = MessageFormatter::new(FormatOptions {
            math: config.math(),
        });
        let options = RenderOptions {
            syntax: config.syntax(),
        };
        let stdout = io::stdout();
        let printer = if stdout.is_terminal() {
            ReplyPrinter::new(stdout, formatter, theme.clone(), options)
        } else {
            ReplyPrinter::raw(stdout, formatter, theme.clone(), options)
        };

        Self {
            session,
            transport,
            service,
            printer,
            sink: TerminalSink::new(theme),
            base_url: config.base_url().to_string(),
            echo_input: io::stdin().is_terminal(),
        }
    }

    fn prompt(&mut self) -> io::Result<()> {
        self.printer.write_prompt(PROMPT)
    }

    /// Returns `false` when the user asked to quit.
    async fn handle_line(&mut self, line: &str) -> io::Result<bool> {
        let result = {
            let mut ctx = CommandContext {
                session: &mut self.session,
                sink: &mut self.sink,
                formatter: self.printer.formatter(),
            };
            process_input(&mut ctx, line)
        };

        match result {
            CommandResult::Quit => return Ok(false),
            CommandResult::Continue => self.prompt()?,
            CommandResult::ProcessAsMessage(text) => {
                if text.trim().is_empty() {
                    self.prompt()?;
                } else {
                    self.send(&text).await?;
                }
            }
        }
        Ok(true)
    }

    async fn send(&mut self, text: &str) -> io::Result<()> {
        let image_count = self.session.pending_images().len();
        let connectivity = probe_connectivity(&self.base_url).await;

        match self.session.send(text, connectivity) {
            Ok(handle) => {
                if self.echo_input {
                    self.printer
                        .echo_user(&format!("{PROMPT}{text}"), text, image_count)?;
                }
                debug!(stream_id = handle.stream_id, "reply requested");
                self.service.spawn_stream(self.transport.clone(), handle);
                self.printer.begin()
            }
            Err(err) => {
                if !err.is_silent() {
                    self.sink.notify(Notification::error(err.to_string()));
                }
                self.prompt()
            }
        }
    }

    fn apply(&mut self, batch: Vec<(StreamEvent, u64)>) -> io::Result<()> {
        let mut progressed = false;
        for (event, stream_id) in batch {
            match self.session.apply_event(stream_id, event) {
                StreamUpdate::Stale => {}
                StreamUpdate::Progress => progressed = true,
                StreamUpdate::Completed { message, .. } => {
                    progressed = false;
                    self.printer.complete(&message.text)?;
                    self.prompt()?;
                }
                StreamUpdate::Failed(reason) => {
                    progressed = false;
                    self.printer.abort()?;
                    self.sink.notify(Notification::error(reason.to_string()));
                    self.prompt()?;
                }
            }
        }

        if progressed && self.session.is_busy() {
            let snapshot = self.session.snapshot();
            self.printer.progress(&snapshot.text)?;
        }
        Ok(())
    }

    /// Returns `false` when Ctrl+C should quit instead.
    fn interrupt(&mut self) -> io::Result<bool> {
        if !self.session.cancel() {
            return Ok(false);
        }
        self.printer.abort()?;
        self.sink.notify(Notification::warning("Reply cancelled"));
        self.prompt()?;
        Ok(true)
    }
}

pub async fn run_chat(overrides: RunOverrides) -> Result<(), Box<dyn Error>> {
    let Bootstrap {
        config,
        session,
        transport,
        key_source,
    } = bootstrap(&overrides)?;
    let (service, mut events) = ChatStreamService::new();
    let mut chat = ChatLoop::new(&config, session, transport, service);

    chat.sink.notify(Notification::info(format!(
        "palaver · {} · key from {key_source} · /help for commands",
        chat.session.settings().model
    )));
    chat.prompt()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line(), if !chat.session.is_busy() => {
                let Some(line) = line? else {
                    println!();
                    break;
                };
                if !chat.handle_line(&line).await? {
                    break;
                }
            }
            Some(first) = events.recv() => {
                let mut batch = vec![first];
                while let Ok(next) = events.try_recv() {
                    batch.push(next);
                }
                chat.apply(batch)?;
            }
            _ = tokio::signal::ctrl_c() => {
                if !chat.interrupt()? {
                    println!();
                    break;
                }
            }
        }
    }

    chat.session.cancel();
    Ok(())
}
