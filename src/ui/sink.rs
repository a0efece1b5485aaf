use std::io::{self, Write};

use ratatui::text::{Line, Span};

use crate::ui::terminal::write_lines;
use crate::ui::theme::Theme;
use crate::utils::clipboard::copy_to_clipboard;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Where copy requests and user-facing notices go. Fire-and-forget: failures
/// are reported through `notify` rather than returned.
pub trait UserSink {
    fn copy(&mut self, text: &str);
    fn notify(&mut self, notification: Notification);
}

/// Prints notices to stderr and copies through the platform clipboard tool.
pub struct TerminalSink {
    theme: Theme,
}

impl TerminalSink {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    pub fn notice_line(&self, notification: &Notification) -> Line<'static> {
        let (prefix, style) = match notification.level {
            NoticeLevel::Info => ("ℹ️  ", self.theme.info_style),
            NoticeLevel::Warning => ("⚠️  ", self.theme.warning_style),
            NoticeLevel::Error => ("❌ ", self.theme.error_style),
        };
        Line::from(Span::styled(
            format!("{prefix}{}", notification.message),
            style,
        ))
    }
}

impl UserSink for TerminalSink {
    fn copy(&mut self, text: &str) {
        match copy_to_clipboard(text) {
            Ok(()) => self.notify(Notification::info("Copied to clipboard")),
            Err(err) => self.notify(Notification::error(err)),
        }
    }

    fn notify(&mut self, notification: Notification) {
        let line = self.notice_line(&notification);
        let mut stderr = io::stderr().lock();
        if write_lines(&mut stderr, &[line]).and_then(|_| stderr.flush()).is_err() {
            tracing::warn!("could not write notice: {}", notification.message);
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Records everything instead of touching the terminal.
    #[derive(Default)]
    pub struct RecordingSink {
        pub copied: Vec<String>,
        pub notices: Vec<Notification>,
    }

    impl UserSink for RecordingSink {
        fn copy(&mut self, text: &str) {
            self.copied.push(text.to_string());
        }

        fn notify(&mut self, notification: Notification) {
            self.notices.push(notification);
        }
    }
}
