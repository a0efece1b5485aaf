//! Single-line prompt that echoes `*` instead of the typed secret.

use std::fmt;
use std::io::{self, Write};

use ratatui::crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    Continue,
    Submit,
    Cancel,
}

#[derive(Debug)]
pub enum MaskedInputError {
    Cancelled,
    Io(io::Error),
}

impl fmt::Display for MaskedInputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaskedInputError::Cancelled => write!(f, "Cancelled by user"),
            MaskedInputError::Io(err) => write!(f, "Terminal error: {err}"),
        }
    }
}

impl std::error::Error for MaskedInputError {}

impl From<io::Error> for MaskedInputError {
    fn from(err: io::Error) -> Self {
        MaskedInputError::Io(err)
    }
}

/// Apply one key press to the secret being typed.
pub fn apply_key(secret: &mut String, key: &KeyEvent) -> KeyOutcome {
    let control = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Enter => KeyOutcome::Submit,
        KeyCode::Esc => KeyOutcome::Cancel,
        KeyCode::Char('c') if control => KeyOutcome::Cancel,
        KeyCode::Char('u') if control => {
            secret.clear();
            KeyOutcome::Continue
        }
        KeyCode::Backspace => {
            secret.pop();
            KeyOutcome::Continue
        }
        KeyCode::Char(c) if !control => {
            secret.push(c);
            KeyOutcome::Continue
        }
        _ => KeyOutcome::Continue,
    }
}

fn redraw(prompt: &str, secret: &str) -> io::Result<()> {
    let mut stdout = io::stdout();
    write!(stdout, "\r\x1b[K{prompt}{}", "*".repeat(secret.chars().count()))?;
    stdout.flush()
}

/// Read a secret from the terminal in raw mode. Pasted text is accepted
/// with line breaks stripped.
pub fn prompt_masked(prompt: &str) -> Result<String, MaskedInputError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    let paste_enabled = execute!(stdout, event::EnableBracketedPaste).is_ok();

    let result = (|| -> Result<String, MaskedInputError> {
        let mut secret = String::new();
        redraw(prompt, &secret)?;
        loop {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    match apply_key(&mut secret, &key) {
                        KeyOutcome::Continue => redraw(prompt, &secret)?,
                        KeyOutcome::Submit => break Ok(secret),
                        KeyOutcome::Cancel => break Err(MaskedInputError::Cancelled),
                    }
                }
                Event::Paste(text) => {
                    secret.extend(text.chars().filter(|c| *c != '\n' && *c != '\r'));
                    redraw(prompt, &secret)?;
                }
                _ => {}
            }
        }
    })();

    if paste_enabled {
        let _ = execute!(stdout, event::DisableBracketedPaste);
    }
    let restore = disable_raw_mode();
    println!();
    match (result, restore) {
        (Ok(_), Err(err)) => Err(err.into()),
        (result, _) => result,
    }
}
