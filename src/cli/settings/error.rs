//! Errors from `palaver set`/`unset`.

use std::fmt;

#[derive(Debug)]
pub enum SettingError {
    UnknownKey(String),
    UnknownTheme { input: String },
    /// Not one of on/off, true/false, yes/no.
    InvalidBoolean(String),
    /// Rejected by the key's own validation.
    InvalidValue { key: &'static str, reason: String },
    /// `set` without a value. Carries a usage hint and an example invocation.
    MissingArgs {
        hint: &'static str,
        example: &'static str,
    },
    /// Loading or saving the config file failed.
    ConfigError(String),
}

impl SettingError {
    /// Second line shown under the message, if any.
    fn follow_up(&self) -> Option<String> {
        match self {
            SettingError::UnknownKey(_) => {
                Some("Run 'palaver config' to list available keys.".to_string())
            }
            SettingError::InvalidBoolean(_) => {
                Some("Use 'on' or 'off' (also accepts true/false, yes/no)".to_string())
            }
            SettingError::MissingArgs { example, .. } => Some(format!("Example: {example}")),
            _ => None,
        }
    }

    pub fn print(&self) {
        let marker = match self {
            SettingError::MissingArgs { .. } => "⚠️ ",
            _ => "❌",
        };
        eprintln!("{marker} {self}");
        if let Some(follow_up) = self.follow_up() {
            eprintln!("   {follow_up}");
        }
    }

    /// Usage mistakes exit with 2, everything else with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            SettingError::MissingArgs { .. } => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for SettingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingError::UnknownKey(key) => write!(f, "Unknown config key: {key}"),
            SettingError::UnknownTheme { input } => {
                write!(f, "Unknown theme: {input}. Available themes: dark, light")
            }
            SettingError::InvalidBoolean(input) => write!(f, "Invalid boolean value: {input}"),
            SettingError::InvalidValue { key, reason } => {
                write!(f, "Invalid value for {key}: {reason}")
            }
            SettingError::MissingArgs { hint, .. } => f.write_str(hint),
            SettingError::ConfigError(msg) => write!(f, "Failed to save configuration: {msg}"),
        }
    }
}

impl std::error::Error for SettingError {}
