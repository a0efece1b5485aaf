//! Turns raw message text into display segments.
//!
//! The rules are deliberately simple and positional:
//!
//! 1. Split on ```` ``` ````; even spans are prose and odd spans are code. With
//!    an odd number of fences the trailing span is still prose, so half-streamed
//!    code renders as text until its closing fence arrives.
//! 2. A code span's first line is its language tag (when non-empty); the rest
//!    is the body, verbatim.
//! 3. Prose is split on `\[ ... \]` into math first, then the text around it
//!    is split on `**` into alternating plain and strong runs.
//!
//! Formatting is pure, so it is safe to re-run against a growing stream
//! snapshot on every delta.

use std::error::Error;
use std::fmt;

const FENCE: &str = "```";
const STRONG: &str = "**";
const MATH_OPEN: &str = "\\[";
const MATH_CLOSE: &str = "\\]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis {
    Plain,
    Strong,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Prose {
        text: String,
        emphasis: Emphasis,
    },
    Math {
        source: String,
        markup: String,
    },
    CodeBlock {
        language: Option<String>,
        body: String,
    },
}

impl Segment {
    pub fn plain(text: impl Into<String>) -> Self {
        Segment::Prose {
            text: text.into(),
            emphasis: Emphasis::Plain,
        }
    }

    pub fn strong(text: impl Into<String>) -> Self {
        Segment::Prose {
            text: text.into(),
            emphasis: Emphasis::Strong,
        }
    }

    pub fn code(language: Option<&str>, body: impl Into<String>) -> Self {
        Segment::CodeBlock {
            language: language.map(str::to_string),
            body: body.into(),
        }
    }

    pub fn is_code(&self) -> bool {
        matches!(self, Segment::CodeBlock { .. })
    }
}

/// Math that could not be typeset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderError {
    pub reason: String,
}

impl RenderError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not render math: {}", self.reason)
    }
}

impl Error for RenderError {}

/// Typesets the body of a `\[ ... \]` block.
pub trait MathRenderer: Send + Sync {
    fn render(&self, source: &str) -> Result<String, RenderError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    pub math: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self { math: true }
    }
}

pub struct MessageFormatter {
    options: FormatOptions,
    math: Box<dyn MathRenderer>,
}

impl Default for MessageFormatter {
    fn default() -> Self {
        Self::new(FormatOptions::default())
    }
}

impl MessageFormatter {
    pub fn new(options: FormatOptions) -> Self {
        Self::with_renderer(options, Box::new(crate::core::math::UnicodeMath))
    }

    pub fn with_renderer(options: FormatOptions, math: Box<dyn MathRenderer>) -> Self {
        Self { options, math }
    }

    pub fn options(&self) -> FormatOptions {
        self.options
    }

    pub fn format(&self, text: &str) -> Vec<Segment> {
        let spans: Vec<&str> = text.split(FENCE).collect();
        let unterminated = spans.len() % 2 == 0;
        let last = spans.len() - 1;

        let mut segments = Vec::new();
        for (index, span) in spans.into_iter().enumerate() {
            let is_code = index % 2 == 1 && !(unterminated && index == last);
            if is_code {
                segments.push(split_code_span(span));
            } else {
                self.push_prose(span, &mut segments);
            }
        }
        segments
    }

    fn push_prose(&self, prose: &str, out: &mut Vec<Segment>) {
        if !self.options.math {
            push_emphasis(prose, out);
            return;
        }

        let mut rest = prose;
        while let Some((before, source, after)) = next_math_block(rest) {
            push_emphasis(before, out);
            match self.math.render(source) {
                Ok(markup) => out.push(Segment::Math {
                    source: source.to_string(),
                    markup,
                }),
                Err(err) => {
                    tracing::debug!("{err}");
                    out.push(Segment::plain(format!("{MATH_OPEN}{source}{MATH_CLOSE}")));
                }
            }
            rest = after;
        }
        push_emphasis(rest, out);
    }
}

/// Finds the first complete `\[ ... \]` block, returning the text before it,
/// its body, and the text after it.
fn next_math_block(text: &str) -> Option<(&str, &str, &str)> {
    let open = text.find(MATH_OPEN)?;
    let body_start = open + MATH_OPEN.len();
    let close = text[body_start..].find(MATH_CLOSE)? + body_start;
    Some((
        &text[..open],
        &text[body_start..close],
        &text[close + MATH_CLOSE.len()..],
    ))
}

/// Every odd run is emitted as Strong, even when empty, so each pair of
/// markers yields exactly one strong segment. Empty plain runs are dropped.
fn push_emphasis(text: &str, out: &mut Vec<Segment>) {
    for (index, part) in text.split(STRONG).enumerate() {
        if index % 2 == 1 {
            out.push(Segment::strong(part));
        } else if !part.is_empty() {
            out.push(Segment::plain(part));
        }
    }
}

fn split_code_span(span: &str) -> Segment {
    match span.split_once('\n') {
        Some((first_line, body)) => {
            let tag = first_line.trim();
            Segment::CodeBlock {
                language: (!tag.is_empty()).then(|| tag.to_string()),
                body: body.to_string(),
            }
        }
        None => Segment::code(None, span),
    }
}

/// All code block bodies in display order, used by the copy command.
pub fn code_blocks(segments: &[Segment]) -> Vec<&str> {
    segments
        .iter()
        .filter_map(|segment| match segment {
            Segment::CodeBlock { body, .. } => Some(body.as_str()),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests;
