use super::*;
use std::io::Write;

use crate::core::assembler::Connectivity;
use crate::core::models::load_builtin_models;
use crate::core::session::{SessionSettings, StreamUpdate};
use crate::core::stream_state::{StreamEvent, Usage};
use crate::ui::sink::test_support::RecordingSink;
use crate::ui::sink::NoticeLevel;

fn test_session() -> ChatSession {
    ChatSession::new(
        SessionSettings {
            model: "gpt-4o-mini".into(),
            json_mode: false,
            system_instruction: None,
            reasoning_effort: None,
            stream: true,
            remember_context: true,
            conversion_rate: 1.0,
            currency: "USD".into(),
        },
        load_builtin_models(),
    )
}

fn run(session: &mut ChatSession, sink: &mut RecordingSink, input: &str) -> CommandResult {
    let formatter = MessageFormatter::default();
    let mut ctx = CommandContext {
        session,
        sink,
        formatter: &formatter,
    };
    process_input(&mut ctx, input)
}

fn reply(session: &mut ChatSession, text: &str) {
    let handle = session.send("question", Connectivity::Online).unwrap();
    session.apply_event(handle.stream_id, StreamEvent::TextDelta(text.into()));
    let update = session.apply_event(
        handle.stream_id,
        StreamEvent::Done(Some(Usage {
            prompt_tokens: 1_000_000,
            completion_tokens: 1_000_000,
        })),
    );
    assert!(matches!(update, StreamUpdate::Completed { .. }));
}

fn last_notice(sink: &RecordingSink) -> &str {
    &sink.notices.last().unwrap().message
}

#[test]
fn plain_text_is_a_message() {
    let mut session = test_session();
    let mut sink = RecordingSink::default();
    assert_eq!(
        run(&mut session, &mut sink, "hello there"),
        CommandResult::ProcessAsMessage("hello there".into())
    );
    assert_eq!(
        run(&mut session, &mut sink, "/"),
        CommandResult::ProcessAsMessage("/".into())
    );
    assert!(sink.notices.is_empty());
}

#[test]
fn unknown_command_suggests_matches() {
    let mut session = test_session();
    let mut sink = RecordingSink::default();
    assert_eq!(run(&mut session, &mut sink, "/mod"), CommandResult::Continue);
    let notice = sink.notices.last().unwrap();
    assert_eq!(notice.level, NoticeLevel::Warning);
    assert!(notice.message.contains("/model [name]"));
    assert!(notice.message.contains("/models"));

    run(&mut session, &mut sink, "/zzz");
    assert!(last_notice(&sink).contains("/help"));
}

#[test]
fn quit_and_case_insensitive_names() {
    let mut session = test_session();
    let mut sink = RecordingSink::default();
    assert_eq!(run(&mut session, &mut sink, "/quit"), CommandResult::Quit);
    assert_eq!(run(&mut session, &mut sink, "  /QUIT  "), CommandResult::Quit);
}

#[test]
fn help_lists_every_command() {
    let mut session = test_session();
    let mut sink = RecordingSink::default();
    run(&mut session, &mut sink, "/help");
    let help = last_notice(&sink);
    for command in all_commands() {
        assert!(help.contains(command.usage), "missing {}", command.usage);
    }
}

#[test]
fn clear_resets_conversation() {
    let mut session = test_session();
    let mut sink = RecordingSink::default();
    reply(&mut session, "answer");
    run(&mut session, &mut sink, "/clear");
    assert!(session.conversation().is_empty());
    assert!(session.cost_report().is_none());
    assert_eq!(last_notice(&sink), "Conversation cleared");
}

#[test]
fn model_switch_warns_for_unknown_models() {
    let mut session = test_session();
    let mut sink = RecordingSink::default();

    run(&mut session, &mut sink, "/model");
    assert_eq!(last_notice(&sink), "Current model: gpt-4o-mini");

    run(&mut session, &mut sink, "/model gpt-4o");
    assert_eq!(session.settings().model, "gpt-4o");
    assert_eq!(sink.notices.last().unwrap().level, NoticeLevel::Info);

    run(&mut session, &mut sink, "/model my-local-model");
    assert_eq!(session.settings().model, "my-local-model");
    assert_eq!(sink.notices.last().unwrap().level, NoticeLevel::Warning);
}

#[test]
fn models_marks_the_current_one() {
    let mut session = test_session();
    let mut sink = RecordingSink::default();
    run(&mut session, &mut sink, "/models");
    let listing = last_notice(&sink);
    assert!(listing.contains(" * gpt-4o-mini  $0.15 in / $0.60 out per 1M tokens"));
    assert!(listing.contains("o3-mini  $1.10 in / $4.40 out per 1M tokens  (reasoning effort)"));
}

#[test]
fn toggles_report_new_state() {
    let mut session = test_session();
    let mut sink = RecordingSink::default();

    run(&mut session, &mut sink, "/json");
    assert!(session.settings().json_mode);
    assert_eq!(last_notice(&sink), "JSON mode on");

    run(&mut session, &mut sink, "/context");
    assert!(!session.settings().remember_context);
    assert_eq!(last_notice(&sink), "Remember context off");

    run(&mut session, &mut sink, "/stream");
    assert!(!session.settings().stream);
    assert_eq!(last_notice(&sink), "Streaming off");
}

#[test]
fn effort_parses_and_notes_unsupported_models() {
    let mut session = test_session();
    let mut sink = RecordingSink::default();

    run(&mut session, &mut sink, "/effort high");
    assert_eq!(
        session.settings().reasoning_effort,
        Some(ReasoningEffort::High)
    );
    assert_eq!(last_notice(&sink), "Reasoning effort high (not sent to gpt-4o-mini)");

    run(&mut session, &mut sink, "/model o3-mini");
    run(&mut session, &mut sink, "/effort Low");
    assert_eq!(last_notice(&sink), "Reasoning effort low");

    run(&mut session, &mut sink, "/effort off");
    assert_eq!(session.settings().reasoning_effort, None);

    run(&mut session, &mut sink, "/effort turbo");
    assert_eq!(sink.notices.last().unwrap().level, NoticeLevel::Warning);
    assert_eq!(session.settings().reasoning_effort, None);
}

#[test]
fn system_instruction_sets_and_clears() {
    let mut session = test_session();
    let mut sink = RecordingSink::default();

    run(&mut session, &mut sink, "/system Be terse.");
    assert_eq!(
        session.settings().system_instruction.as_deref(),
        Some("Be terse.")
    );
    run(&mut session, &mut sink, "/system");
    assert_eq!(session.settings().system_instruction, None);
    assert_eq!(last_notice(&sink), "System instruction cleared");
}

#[test]
fn image_attaches_to_next_message() {
    let mut session = test_session();
    let mut sink = RecordingSink::default();

    let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
    file.write_all(b"\x89PNG fake").unwrap();
    let input = format!("/image {}", file.path().display());

    run(&mut session, &mut sink, &input);
    assert_eq!(session.pending_images().len(), 1);
    assert!(last_notice(&sink).contains("1 pending"));

    run(&mut session, &mut sink, "/image /definitely/not/here.png");
    assert_eq!(sink.notices.last().unwrap().level, NoticeLevel::Error);
    assert_eq!(session.pending_images().len(), 1);
}

#[test]
fn copy_uses_last_reply_or_its_code() {
    let mut session = test_session();
    let mut sink = RecordingSink::default();

    run(&mut session, &mut sink, "/copy");
    assert!(sink.copied.is_empty());
    assert_eq!(last_notice(&sink), "Nothing to copy yet");

    reply(&mut session, "Run:\n```sh\nls -la\n```\nthen\n```\npwd\n```");
    run(&mut session, &mut sink, "/copy");
    run(&mut session, &mut sink, "/copy code");
    assert_eq!(sink.copied.len(), 2);
    assert!(sink.copied[0].starts_with("Run:"));
    assert_eq!(sink.copied[1], "ls -la\n\npwd\n");
}

#[test]
fn copy_code_without_blocks_warns() {
    let mut session = test_session();
    let mut sink = RecordingSink::default();
    reply(&mut session, "just prose");
    run(&mut session, &mut sink, "/copy code");
    assert!(sink.copied.is_empty());
    assert_eq!(last_notice(&sink), "The last reply has no code blocks");
}

#[test]
fn cost_reports_last_usage() {
    let mut session = test_session();
    let mut sink = RecordingSink::default();

    run(&mut session, &mut sink, "/cost");
    assert_eq!(last_notice(&sink), "No usage reported for this conversation yet");

    reply(&mut session, "answer");
    run(&mut session, &mut sink, "/cost");
    assert_eq!(last_notice(&sink), "Last reply: 0.750 USD (2000000 tokens)");
}
