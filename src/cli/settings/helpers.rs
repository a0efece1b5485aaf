//! Shared pieces of the setting handlers.

use std::path::Path;

use crate::core::config::data::Config;
use crate::ui::theme::THEME_NAMES;

use super::error::SettingError;

/// Load, edit and save the config file at `config_path`.
pub fn mutate_config<F>(config_path: &Path, mutator: F) -> Result<(), SettingError>
where
    F: FnOnce(&mut Config),
{
    Config::mutate_at(config_path, mutator).map_err(|e| SettingError::ConfigError(e.to_string()))
}

/// On/off values as typed on the command line. Case-insensitive; also takes
/// true/false, yes/no and 1/0.
pub fn parse_bool(input: &str) -> Option<bool> {
    const TRUE: [&str; 4] = ["on", "true", "yes", "1"];
    const FALSE: [&str; 4] = ["off", "false", "no", "0"];
    let input = input.trim();
    if TRUE.iter().any(|t| t.eq_ignore_ascii_case(input)) {
        Some(true)
    } else if FALSE.iter().any(|f| f.eq_ignore_ascii_case(input)) {
        Some(false)
    } else {
        None
    }
}

pub fn format_bool(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}

pub fn success_set(key: &str, value: &str) -> String {
    format!("✅ Set {key} to: {value}")
}

pub fn success_unset(key: &str, default_display: &str) -> String {
    format!("✅ Unset {key} (will use default: {default_display})")
}

/// Resolve a theme name case-insensitively to its canonical spelling.
pub fn validate_theme(input: &str) -> Result<String, SettingError> {
    THEME_NAMES
        .iter()
        .find(|name| name.eq_ignore_ascii_case(input.trim()))
        .map(|name| name.to_string())
        .ok_or_else(|| SettingError::UnknownTheme {
            input: input.to_string(),
        })
}

/// Truncate a string to `max_chars` characters, appending "..." if truncated.
pub fn truncate_with_ellipsis(s: &str, max_chars: usize) -> String {
    let mut chars = s.chars();
    let truncated: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{truncated}...")
    } else {
        truncated
    }
}
