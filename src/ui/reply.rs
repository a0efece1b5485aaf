//! Prints one assistant reply as it streams in.

use std::io::{self, Write};

use ratatui::text::{Line, Span};

use crate::core::formatter::MessageFormatter;
use crate::ui::render::{render_segments, render_user_message, RenderOptions};
use crate::ui::terminal::{replace_echo, terminal_size, LiveView};
use crate::ui::theme::Theme;

const WAITING_INDICATOR: &str = "⋯";

pub struct ReplyPrinter<W: Write> {
    out: W,
    view: LiveView,
    raw: bool,
    formatter: MessageFormatter,
    theme: Theme,
    options: RenderOptions,
}

impl<W: Write> ReplyPrinter<W> {
    /// Formatted output, repainted in place while the reply grows.
    pub fn new(out: W, formatter: MessageFormatter, theme: Theme, options: RenderOptions) -> Self {
        Self {
            out,
            view: LiveView::new(),
            raw: false,
            formatter,
            theme,
            options,
        }
    }

    /// Unformatted output for pipes and files: deltas are written as they
    /// arrive and nothing is ever repainted.
    pub fn raw(out: W, formatter: MessageFormatter, theme: Theme, options: RenderOptions) -> Self {
        Self {
            view: LiveView::appending(),
            raw: true,
            ..Self::new(out, formatter, theme, options)
        }
    }

    pub fn formatter(&self) -> &MessageFormatter {
        &self.formatter
    }

    pub fn render(&self, text: &str) -> Vec<Line<'static>> {
        render_segments(&self.formatter.format(text), &self.theme, self.options)
    }

    /// Restyle the input line the terminal echoed for the user.
    pub fn echo_user(&mut self, echoed: &str, text: &str, image_count: usize) -> io::Result<()> {
        if self.raw {
            return Ok(());
        }
        let lines = render_user_message(text, image_count, &self.theme);
        replace_echo(&mut self.out, echoed, &lines, terminal_size().0)
    }

    /// Start a new reply. Formatted output shows a waiting indicator until
    /// the first text arrives.
    pub fn begin(&mut self) -> io::Result<()> {
        if self.raw {
            self.view = LiveView::appending();
            return Ok(());
        }
        self.view = LiveView::new();
        let indicator = Line::from(Span::styled(
            WAITING_INDICATOR,
            self.theme.streaming_indicator_style,
        ));
        self.view.update(&mut self.out, "", &[indicator])
    }

    pub fn progress(&mut self, text: &str) -> io::Result<()> {
        let lines = if self.raw { Vec::new() } else { self.render(text) };
        self.view.update(&mut self.out, text, &lines)
    }

    /// The reply finished; repaint it one last time in its final form.
    pub fn complete(&mut self, text: &str) -> io::Result<()> {
        if self.view.is_appending() {
            self.view.update(&mut self.out, text, &[])?;
            return self.view.finish(&mut self.out, None);
        }
        let lines = self.render(text);
        self.view.finish(&mut self.out, Some(&lines))
    }

    /// The reply stopped early; whatever was shown stays on screen.
    pub fn abort(&mut self) -> io::Result<()> {
        self.view.finish(&mut self.out, None)
    }

    pub fn write_prompt(&mut self, prompt: &str) -> io::Result<()> {
        write!(self.out, "{prompt}")?;
        self.out.flush()
    }

    #[cfg(test)]
    pub(crate) fn output(&self) -> &W {
        &self.out
    }
}
