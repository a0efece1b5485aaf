use super::{CommandContext, CommandResult};

pub type CommandHandler = fn(&mut CommandContext<'_>, CommandInvocation<'_>) -> CommandResult;

pub struct Command {
    pub name: &'static str,
    pub usage: &'static str,
    pub help: &'static str,
    pub handler: CommandHandler,
}

#[derive(Clone, Copy)]
pub struct CommandInvocation<'a> {
    pub input: &'a str,
    pub args: &'a str,
}

pub fn all_commands() -> &'static [Command] {
    COMMANDS
}

pub fn find_command(name: &str) -> Option<&'static Command> {
    all_commands()
        .iter()
        .find(|command| command.name.eq_ignore_ascii_case(name))
}

/// Commands whose name starts with `prefix`, for "did you mean" hints.
pub fn matching_commands(prefix: &str) -> Vec<&'static Command> {
    let prefix = prefix.to_ascii_lowercase();
    all_commands()
        .iter()
        .filter(|command| command.name.starts_with(&prefix))
        .collect()
}

const COMMANDS: &[Command] = &[
    Command {
        name: "help",
        usage: "/help",
        help: "Show available commands.",
        handler: super::handle_help,
    },
    Command {
        name: "clear",
        usage: "/clear",
        help: "Start a new conversation.",
        handler: super::handle_clear,
    },
    Command {
        name: "model",
        usage: "/model [name]",
        help: "Show the current model or switch to another one.",
        handler: super::handle_model,
    },
    Command {
        name: "models",
        usage: "/models",
        help: "List known models with their prices.",
        handler: super::handle_models,
    },
    Command {
        name: "json",
        usage: "/json",
        help: "Toggle JSON output mode.",
        handler: super::handle_json,
    },
    Command {
        name: "context",
        usage: "/context",
        help: "Toggle sending earlier turns with each message.",
        handler: super::handle_context,
    },
    Command {
        name: "stream",
        usage: "/stream",
        help: "Toggle streamed or batched responses.",
        handler: super::handle_stream,
    },
    Command {
        name: "effort",
        usage: "/effort <low|medium|high|off>",
        help: "Set the reasoning effort for models that support it.",
        handler: super::handle_effort,
    },
    Command {
        name: "system",
        usage: "/system <text>",
        help: "Set the system instruction; no text clears it.",
        handler: super::handle_system,
    },
    Command {
        name: "image",
        usage: "/image <path>",
        help: "Attach an image to the next message.",
        handler: super::handle_image,
    },
    Command {
        name: "copy",
        usage: "/copy [code]",
        help: "Copy the last reply, or only its code blocks.",
        handler: super::handle_copy,
    },
    Command {
        name: "cost",
        usage: "/cost",
        help: "Show the cost of the last reply.",
        handler: super::handle_cost,
    },
    Command {
        name: "quit",
        usage: "/quit",
        help: "Leave palaver.",
        handler: super::handle_quit,
    },
];
