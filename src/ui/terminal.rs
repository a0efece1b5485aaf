//! Line-oriented terminal output.
//!
//! Finished messages are printed once. The reply that is still streaming is
//! redrawn in place: the view remembers how many rows it occupies, moves the
//! cursor back up and repaints. When the reply outgrows the screen it can no
//! longer be repainted, and the view switches to appending raw text.

use std::io::{self, Write};

use ratatui::crossterm::{
    cursor::MoveToPreviousLine,
    queue,
    style::{
        Attribute as CAttribute, Color as CColor, Print, SetAttribute, SetBackgroundColor,
        SetForegroundColor,
    },
    terminal::{self, Clear, ClearType},
};
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use unicode_width::UnicodeWidthStr;

fn queue_style<W: Write>(w: &mut W, style: Style) -> io::Result<()> {
    if let Some(fg) = style.fg {
        queue!(w, SetForegroundColor(fg.into()))?;
    }
    if let Some(bg) = style.bg {
        queue!(w, SetBackgroundColor(bg.into()))?;
    }
    let modifiers = style.add_modifier;
    if modifiers.contains(Modifier::BOLD) {
        queue!(w, SetAttribute(CAttribute::Bold))?;
    }
    if modifiers.contains(Modifier::ITALIC) {
        queue!(w, SetAttribute(CAttribute::Italic))?;
    }
    if modifiers.contains(Modifier::UNDERLINED) {
        queue!(w, SetAttribute(CAttribute::Underlined))?;
    }
    if modifiers.contains(Modifier::DIM) {
        queue!(w, SetAttribute(CAttribute::Dim))?;
    }
    if modifiers.contains(Modifier::REVERSED) {
        queue!(w, SetAttribute(CAttribute::Reverse))?;
    }
    Ok(())
}

fn queue_reset<W: Write>(w: &mut W) -> io::Result<()> {
    queue!(
        w,
        SetForegroundColor(CColor::Reset),
        SetBackgroundColor(CColor::Reset),
        SetAttribute(CAttribute::Reset),
    )
}

/// Queue styled lines, each terminated by a newline. The caller flushes.
pub fn write_lines<W: Write>(w: &mut W, lines: &[Line<'_>]) -> io::Result<()> {
    for line in lines {
        for span in &line.spans {
            queue_style(w, line.style.patch(span.style))?;
            queue!(w, Print(span.content.as_ref()))?;
            queue_reset(w)?;
        }
        queue!(w, Print("\n"))?;
    }
    Ok(())
}

/// Terminal rows `lines` occupy at `width` columns, counting soft wraps.
pub fn rows_needed(lines: &[Line<'_>], width: u16) -> usize {
    let width = usize::from(width.max(1));
    lines
        .iter()
        .map(|line| {
            let cells: usize = line.spans.iter().map(|s| s.content.width()).sum();
            cells.div_ceil(width).max(1)
        })
        .sum()
}

pub fn terminal_size() -> (u16, u16) {
    terminal::size().unwrap_or((80, 24))
}

fn erase_rows<W: Write>(w: &mut W, rows: usize) -> io::Result<()> {
    if rows > 0 {
        let rows = u16::try_from(rows).unwrap_or(u16::MAX);
        queue!(w, MoveToPreviousLine(rows), Clear(ClearType::FromCursorDown))?;
    }
    Ok(())
}

/// Replace the input line the terminal echoed (`echoed`, prompt included)
/// with `lines`.
pub fn replace_echo<W: Write>(
    w: &mut W,
    echoed: &str,
    lines: &[Line<'_>],
    width: u16,
) -> io::Result<()> {
    erase_rows(w, rows_needed(&[Line::raw(echoed)], width))?;
    write_lines(w, lines)?;
    w.flush()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LiveMode {
    Redraw { rows: usize },
    Append,
}

/// In-place view of the streaming reply.
#[derive(Debug)]
pub struct LiveView {
    mode: LiveMode,
    printed_len: usize,
}

impl Default for LiveView {
    fn default() -> Self {
        Self::new()
    }
}

impl LiveView {
    pub fn new() -> Self {
        Self {
            mode: LiveMode::Redraw { rows: 0 },
            printed_len: 0,
        }
    }

    /// A view that never repaints, for output that is not a terminal.
    pub fn appending() -> Self {
        Self {
            mode: LiveMode::Append,
            printed_len: 0,
        }
    }

    pub fn is_appending(&self) -> bool {
        self.mode == LiveMode::Append
    }

    /// Repaint the reply. `text` is the raw accumulated reply; `lines` is its
    /// formatted rendering.
    pub fn update<W: Write>(
        &mut self,
        w: &mut W,
        text: &str,
        lines: &[Line<'_>],
    ) -> io::Result<()> {
        let (width, height) = terminal_size();
        self.update_with_size(w, text, lines, width, height)
    }

    pub(crate) fn update_with_size<W: Write>(
        &mut self,
        w: &mut W,
        text: &str,
        lines: &[Line<'_>],
        width: u16,
        height: u16,
    ) -> io::Result<()> {
        match self.mode {
            LiveMode::Redraw { rows } => {
                let needed = rows_needed(lines, width);
                if needed >= usize::from(height) {
                    // too tall to repaint: print the raw text once, then only suffixes
                    erase_rows(w, rows)?;
                    self.mode = LiveMode::Append;
                    self.printed_len = 0;
                    return self.append_suffix(w, text);
                }
                erase_rows(w, rows)?;
                write_lines(w, lines)?;
                self.mode = LiveMode::Redraw { rows: needed };
                self.printed_len = text.len();
            }
            LiveMode::Append => self.append_suffix(w, text)?,
        }
        w.flush()
    }

    fn append_suffix<W: Write>(&mut self, w: &mut W, text: &str) -> io::Result<()> {
        if let Some(suffix) = text.get(self.printed_len..) {
            queue!(w, Print(suffix))?;
        }
        self.printed_len = text.len();
        w.flush()
    }

    /// Leave the view after the stream ended. With `final_lines`, a redrawn
    /// reply is replaced by its final rendering; appended output just gets a
    /// closing newline.
    pub fn finish<W: Write>(
        &mut self,
        w: &mut W,
        final_lines: Option<&[Line<'_>]>,
    ) -> io::Result<()> {
        match self.mode {
            LiveMode::Redraw { rows } => {
                if let Some(lines) = final_lines {
                    erase_rows(w, rows)?;
                    write_lines(w, lines)?;
                }
            }
            LiveMode::Append => queue!(w, Print("\n"))?,
        }
        self.mode = LiveMode::Redraw { rows: 0 };
        self.printed_len = 0;
        w.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::text::Span;

    fn plain(text: &str) -> Line<'static> {
        Line::from(Span::raw(text.to_string()))
    }

    fn output(buf: &[u8]) -> String {
        String::from_utf8_lossy(buf).into_owned()
    }

    #[test]
    fn writes_text_and_newlines() {
        let mut buf = Vec::new();
        write_lines(&mut buf, &[plain("one"), plain("two")]).unwrap();
        let out = output(&buf);
        assert!(out.contains("one"));
        assert!(out.contains("two"));
        assert_eq!(out.matches('\n').count(), 2);
    }

    #[test]
    fn counts_wrapped_rows_by_display_width() {
        assert_eq!(rows_needed(&[plain("abcdef")], 3), 2);
        assert_eq!(rows_needed(&[plain("")], 3), 1);
        // wide characters take two cells each
        assert_eq!(rows_needed(&[plain("日本語")], 4), 2);
    }

    #[test]
    fn redraw_repaints_in_place() {
        let mut view = LiveView::new();
        let mut buf = Vec::new();
        view.update_with_size(&mut buf, "Hel", &[plain("Hel")], 80, 24)
            .unwrap();
        buf.clear();
        view.update_with_size(&mut buf, "Hello", &[plain("Hello")], 80, 24)
            .unwrap();
        let out = output(&buf);
        // cursor moved up one line before repainting
        assert!(out.contains("\u{1b}[1F"));
        assert!(out.contains("Hello"));
        assert!(!view.is_appending());
    }

    #[test]
    fn appending_view_prints_suffixes_only() {
        let mut view = LiveView::appending();
        let mut buf = Vec::new();
        view.update_with_size(&mut buf, "Hel", &[], 80, 24).unwrap();
        view.update_with_size(&mut buf, "Hello", &[], 80, 24).unwrap();
        view.finish(&mut buf, None).unwrap();
        assert_eq!(output(&buf), "Hello\n");
    }

    #[test]
    fn echo_replacement_clears_wrapped_input() {
        let mut buf = Vec::new();
        replace_echo(&mut buf, "> abcdef", &[plain("You: abcdef")], 4).unwrap();
        let out = output(&buf);
        assert!(out.starts_with("\u{1b}[2F"));
        assert!(out.contains("You: abcdef"));
    }

    #[test]
    fn overflow_switches_to_raw_append() {
        let mut view = LiveView::new();
        let mut buf = Vec::new();
        view.update_with_size(&mut buf, "ab", &[plain("ab")], 80, 3)
            .unwrap();

        let tall: Vec<Line> = (0..5).map(|_| plain("x")).collect();
        buf.clear();
        view.update_with_size(&mut buf, "abcd", &tall, 80, 3).unwrap();
        assert!(view.is_appending());
        assert!(output(&buf).ends_with("abcd"));

        buf.clear();
        view.update_with_size(&mut buf, "abcdef", &tall, 80, 3).unwrap();
        assert_eq!(output(&buf), "ef");

        buf.clear();
        view.finish(&mut buf, None).unwrap();
        assert_eq!(output(&buf), "\n");
        assert!(!view.is_appending());
    }
}
