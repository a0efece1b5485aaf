//! One-shot `say` command: send a prompt, print the reply, exit.

use std::error::Error;
use std::io::{self, IsTerminal};

use crate::cli::setup::{bootstrap, Bootstrap, RunOverrides};
use crate::core::chat_stream::ChatStreamService;
use crate::core::formatter::{FormatOptions, MessageFormatter};
use crate::core::session::StreamUpdate;
use crate::ui::render::RenderOptions;
use crate::ui::reply::ReplyPrinter;
use crate::ui::theme::Theme;
use crate::utils::image::load_image;
use crate::utils::net::probe_connectivity;

pub async fn run_say(
    prompt: Vec<String>,
    images: Vec<std::path::PathBuf>,
    overrides: RunOverrides,
) -> Result<(), Box<dyn Error>> {
    let prompt = prompt.join(" ");
    if prompt.trim().is_empty() {
        eprintln!("Usage: palaver say <prompt>");
        std::process::exit(1);
    }

    let Bootstrap {
        config,
        mut session,
        transport,
        ..
    } = bootstrap(&overrides)?;

    for path in &images {
        match load_image(path) {
            Ok(image) => session.attach_image(image),
            Err(err) => {
                eprintln!("❌ {err}");
                std::process::exit(1);
            }
        }
    }

    let formatter = MessageFormatter::new(FormatOptions {
        math: config.math(),
    });
    let theme = Theme::from_config_name(config.theme.as_deref());
    let options = RenderOptions {
        syntax: config.syntax(),
    };
    let stdout = io::stdout();
    let mut printer = if stdout.is_terminal() {
        ReplyPrinter::new(stdout, formatter, theme, options)
    } else {
        ReplyPrinter::raw(stdout, formatter, theme, options)
    };

    let connectivity = probe_connectivity(config.base_url()).await;
    let handle = match session.send(&prompt, connectivity) {
        Ok(handle) => handle,
        Err(err) => {
            eprintln!("❌ {err}");
            std::process::exit(1);
        }
    };

    let (stream_service, mut rx) = ChatStreamService::new();
    stream_service.spawn_stream(transport, handle);
    printer.begin()?;

    loop {
        tokio::select! {
            received = rx.recv() => {
                let Some((event, stream_id)) = received else { break };
                match session.apply_event(stream_id, event) {
                    StreamUpdate::Stale => {}
                    StreamUpdate::Progress => printer.progress(&session.snapshot().text)?,
                    StreamUpdate::Completed { message, .. } => {
                        printer.complete(&message.text)?;
                        if let Some(report) = session.cost_report() {
                            tracing::info!("reply cost: {report}");
                        }
                        break;
                    }
                    StreamUpdate::Failed(reason) => {
                        printer.abort()?;
                        eprintln!("❌ Error: {reason}");
                        std::process::exit(1);
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                session.cancel();
                printer.abort()?;
                eprintln!("⚠️  Cancelled");
                std::process::exit(130);
            }
        }
    }

    Ok(())
}
