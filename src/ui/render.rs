//! Segments to styled terminal lines.

use ratatui::style::Style;
use ratatui::text::{Line, Span};

use crate::core::formatter::{Emphasis, Segment};
use crate::ui::theme::Theme;
use crate::utils::syntax::highlight_code_block;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub syntax: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { syntax: true }
    }
}

/// Accumulates spans into lines, breaking on embedded newlines.
struct LineBuilder {
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
}

impl LineBuilder {
    fn new() -> Self {
        Self {
            lines: Vec::new(),
            current: Vec::new(),
        }
    }

    fn push_text(&mut self, text: &str, style: Style) {
        for (index, piece) in text.split('\n').enumerate() {
            if index > 0 {
                self.break_line();
            }
            if !piece.is_empty() {
                self.current.push(Span::styled(piece.to_string(), style));
            }
        }
    }

    fn break_line(&mut self) {
        let spans = std::mem::take(&mut self.current);
        self.lines.push(Line::from(spans));
    }

    /// Start a block on its own line, leaving no empty line behind.
    fn begin_block(&mut self) {
        if !self.current.is_empty() {
            self.break_line();
        }
    }

    fn push_line(&mut self, line: Line<'static>) {
        self.lines.push(line);
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        if !self.current.is_empty() {
            self.break_line();
        }
        self.lines
    }
}

/// Render an assistant reply.
pub fn render_segments(
    segments: &[Segment],
    theme: &Theme,
    options: RenderOptions,
) -> Vec<Line<'static>> {
    let base = theme.assistant_text_style;
    let mut builder = LineBuilder::new();

    for segment in segments {
        match segment {
            Segment::Prose { text, emphasis } => {
                let style = match emphasis {
                    Emphasis::Plain => base,
                    Emphasis::Strong => theme.strong(base),
                };
                builder.push_text(text, style);
            }
            Segment::Math { markup, .. } => builder.push_text(markup, theme.math_style),
            Segment::CodeBlock { language, body } => {
                builder.begin_block();
                if let Some(language) = language {
                    builder.push_line(Line::from(Span::styled(
                        format!("┌ {language}"),
                        theme.code_label_style,
                    )));
                }
                for line in code_lines(language.as_deref(), body, theme, options) {
                    builder.push_line(line);
                }
            }
        }
    }
    builder.finish()
}

fn code_lines(
    language: Option<&str>,
    body: &str,
    theme: &Theme,
    options: RenderOptions,
) -> Vec<Line<'static>> {
    if options.syntax {
        if let Some(lines) = highlight_code_block(language, body, theme) {
            return lines;
        }
    }
    let mut style = theme.code_text_style;
    if let Some(bg) = theme.code_background {
        style = style.bg(bg);
    }
    body.lines()
        .map(|line| Line::from(Span::styled(line.to_string(), style)))
        .collect()
}

/// Render a user message with its prompt prefix.
pub fn render_user_message(text: &str, image_count: usize, theme: &Theme) -> Vec<Line<'static>> {
    let mut builder = LineBuilder::new();
    builder
        .current
        .push(Span::styled("You: ", theme.user_prefix_style));
    builder.push_text(text, theme.user_text_style);
    if image_count > 0 {
        let label = if image_count == 1 {
            " [1 image]".to_string()
        } else {
            format!(" [{image_count} images]")
        };
        builder.current.push(Span::styled(label, theme.info_style));
    }
    builder.finish()
}

pub fn line_text(line: &Line<'_>) -> String {
    line.spans.iter().map(|span| span.content.as_ref()).collect()
}
