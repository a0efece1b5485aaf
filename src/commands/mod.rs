//! Slash commands typed at the chat prompt.

mod registry;

#[cfg(test)]
mod tests;

pub use registry::{all_commands, matching_commands, CommandInvocation};

use std::path::Path;

use crate::core::chat_stream::ReasoningEffort;
use crate::core::formatter::{code_blocks, MessageFormatter};
use crate::core::models::find_model;
use crate::core::session::ChatSession;
use crate::ui::sink::{Notification, UserSink};
use crate::utils::image::load_image;

/// Everything a command may touch.
pub struct CommandContext<'a> {
    pub session: &'a mut ChatSession,
    pub sink: &'a mut dyn UserSink,
    pub formatter: &'a MessageFormatter,
}

#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    Continue,
    ProcessAsMessage(String),
    Quit,
}

pub fn process_input(ctx: &mut CommandContext<'_>, input: &str) -> CommandResult {
    let trimmed = input.trim();

    if !trimmed.starts_with('/') {
        return CommandResult::ProcessAsMessage(input.to_string());
    }

    let mut parts = trimmed[1..].splitn(2, char::is_whitespace);
    let command_name = match parts.next() {
        Some(name) if !name.is_empty() => name,
        _ => return CommandResult::ProcessAsMessage(input.to_string()),
    };
    let args = parts.next().unwrap_or("").trim();

    if let Some(command) = registry::find_command(command_name) {
        let invocation = CommandInvocation {
            input: trimmed,
            args,
        };
        return (command.handler)(ctx, invocation);
    }

    let suggestions: Vec<&str> = matching_commands(command_name)
        .iter()
        .map(|command| command.usage)
        .collect();
    let message = if suggestions.is_empty() {
        format!("Unknown command /{command_name}. Type /help for a list.")
    } else {
        format!(
            "Unknown command /{command_name}. Did you mean: {}?",
            suggestions.join(", ")
        )
    };
    ctx.sink.notify(Notification::warning(message));
    CommandResult::Continue
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

pub(super) fn handle_help(ctx: &mut CommandContext<'_>, _invocation: CommandInvocation<'_>) -> CommandResult {
    let width = all_commands()
        .iter()
        .map(|command| command.usage.len())
        .max()
        .unwrap_or(0);
    let mut help = String::from("Commands:");
    for command in all_commands() {
        help.push_str(&format!("\n  {:width$}  {}", command.usage, command.help));
    }
    help.push_str("\n  Ctrl+C during a reply cancels it; Ctrl+C or Ctrl+D at the prompt quits.");
    ctx.sink.notify(Notification::info(help));
    CommandResult::Continue
}

pub(super) fn handle_clear(ctx: &mut CommandContext<'_>, _invocation: CommandInvocation<'_>) -> CommandResult {
    ctx.session.clear();
    ctx.sink.notify(Notification::info("Conversation cleared"));
    CommandResult::Continue
}

pub(super) fn handle_model(ctx: &mut CommandContext<'_>, invocation: CommandInvocation<'_>) -> CommandResult {
    if invocation.args.is_empty() {
        let model = ctx.session.settings().model.clone();
        ctx.sink.notify(Notification::info(format!("Current model: {model}")));
        return CommandResult::Continue;
    }

    let name = invocation.args.to_string();
    let known = find_model(ctx.session.models(), &name).is_some();
    ctx.session.set_model(name.clone());
    if known {
        ctx.sink
            .notify(Notification::info(format!("Switched to {name}")));
    } else {
        ctx.sink.notify(Notification::warning(format!(
            "Switched to {name}, which is not in the model catalog; costs cannot be reported"
        )));
    }
    CommandResult::Continue
}

pub(super) fn handle_models(ctx: &mut CommandContext<'_>, _invocation: CommandInvocation<'_>) -> CommandResult {
    let current = ctx.session.settings().model.clone();
    let mut listing = String::from("Models:");
    for model in ctx.session.models() {
        let marker = if model.name == current { "*" } else { " " };
        listing.push_str(&format!(
            "\n {marker} {}  {}",
            model.name,
            model.price_summary()
        ));
        if model.supports_reasoning_effort {
            listing.push_str("  (reasoning effort)");
        }
    }
    ctx.sink.notify(Notification::info(listing));
    CommandResult::Continue
}

pub(super) fn handle_json(ctx: &mut CommandContext<'_>, _invocation: CommandInvocation<'_>) -> CommandResult {
    let enabled = ctx.session.toggle_json_mode();
    ctx.sink
        .notify(Notification::info(format!("JSON mode {}", on_off(enabled))));
    CommandResult::Continue
}

pub(super) fn handle_context(ctx: &mut CommandContext<'_>, _invocation: CommandInvocation<'_>) -> CommandResult {
    let enabled = ctx.session.toggle_remember_context();
    ctx.sink.notify(Notification::info(format!(
        "Remember context {}",
        on_off(enabled)
    )));
    CommandResult::Continue
}

pub(super) fn handle_stream(ctx: &mut CommandContext<'_>, _invocation: CommandInvocation<'_>) -> CommandResult {
    let enabled = ctx.session.toggle_stream();
    ctx.sink
        .notify(Notification::info(format!("Streaming {}", on_off(enabled))));
    CommandResult::Continue
}

pub(super) fn handle_effort(ctx: &mut CommandContext<'_>, invocation: CommandInvocation<'_>) -> CommandResult {
    let effort = match invocation.args.to_ascii_lowercase().as_str() {
        "" => {
            ctx.sink
                .notify(Notification::warning("Usage: /effort <low|medium|high|off>"));
            return CommandResult::Continue;
        }
        "off" | "none" => None,
        other => match other.parse::<ReasoningEffort>() {
            Ok(effort) => Some(effort),
            Err(err) => {
                ctx.sink.notify(Notification::warning(err));
                return CommandResult::Continue;
            }
        },
    };

    ctx.session.set_reasoning_effort(effort);
    let mut message = match effort {
        Some(effort) => format!("Reasoning effort {effort}"),
        None => "Reasoning effort off".to_string(),
    };
    if effort.is_some() && !ctx.session.supports_reasoning_effort() {
        message.push_str(&format!(
            " (not sent to {})",
            ctx.session.settings().model
        ));
    }
    ctx.sink.notify(Notification::info(message));
    CommandResult::Continue
}

pub(super) fn handle_system(ctx: &mut CommandContext<'_>, invocation: CommandInvocation<'_>) -> CommandResult {
    ctx.session.set_system_instruction(invocation.args);
    let message = if ctx.session.settings().system_instruction.is_some() {
        "System instruction set"
    } else {
        "System instruction cleared"
    };
    ctx.sink.notify(Notification::info(message));
    CommandResult::Continue
}

pub(super) fn handle_image(ctx: &mut CommandContext<'_>, invocation: CommandInvocation<'_>) -> CommandResult {
    if invocation.args.is_empty() {
        ctx.sink.notify(Notification::warning("Usage: /image <path>"));
        return CommandResult::Continue;
    }

    match load_image(Path::new(invocation.args)) {
        Ok(image) => {
            ctx.session.attach_image(image);
            let pending = ctx.session.pending_images().len();
            ctx.sink.notify(Notification::info(format!(
                "Attached {} ({pending} pending for the next message)",
                invocation.args
            )));
        }
        Err(err) => ctx.sink.notify(Notification::error(err.to_string())),
    }
    CommandResult::Continue
}

pub(super) fn handle_copy(ctx: &mut CommandContext<'_>, invocation: CommandInvocation<'_>) -> CommandResult {
    let Some(reply) = ctx.session.conversation().last_assistant() else {
        ctx.sink.notify(Notification::warning("Nothing to copy yet"));
        return CommandResult::Continue;
    };

    let text = match invocation.args {
        "" => reply.text.clone(),
        "code" => {
            let segments = ctx.formatter.format(&reply.text);
            let blocks = code_blocks(&segments);
            if blocks.is_empty() {
                ctx.sink
                    .notify(Notification::warning("The last reply has no code blocks"));
                return CommandResult::Continue;
            }
            blocks.join("\n")
        }
        _ => {
            ctx.sink.notify(Notification::warning("Usage: /copy [code]"));
            return CommandResult::Continue;
        }
    };
    ctx.sink.copy(&text);
    CommandResult::Continue
}

pub(super) fn handle_cost(ctx: &mut CommandContext<'_>, _invocation: CommandInvocation<'_>) -> CommandResult {
    match ctx.session.cost_report() {
        Some(report) => {
            let tokens = ctx
                .session
                .last_usage()
                .map(|usage| usage.total_tokens())
                .unwrap_or_default();
            ctx.sink
                .notify(Notification::info(format!("Last reply: {report} ({tokens} tokens)")));
        }
        None => ctx
            .sink
            .notify(Notification::info("No usage reported for this conversation yet")),
    }
    CommandResult::Continue
}

pub(super) fn handle_quit(_ctx: &mut CommandContext<'_>, _invocation: CommandInvocation<'_>) -> CommandResult {
    CommandResult::Quit
}
