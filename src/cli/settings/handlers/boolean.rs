//! Boolean setting handlers for on/off settings.

use crate::cli::settings::error::SettingError;
use crate::cli::settings::helpers::{
    format_bool, mutate_config, parse_bool, success_set, success_unset,
};
use crate::cli::settings::{SetContext, SettingHandler};
use crate::core::config::data::Config;

/// Data-driven handler for boolean (on/off) settings.
pub struct BooleanHandler {
    key: &'static str,
    hint: &'static str,
    example: &'static str,
    default_display: &'static str,
    get: fn(&Config) -> Option<bool>,
    set_field: fn(&mut Config, Option<bool>),
}

impl SettingHandler for BooleanHandler {
    fn key(&self) -> &'static str {
        self.key
    }

    fn set(&self, args: &[String], ctx: &SetContext<'_>) -> Result<String, SettingError> {
        if args.is_empty() {
            return Err(SettingError::MissingArgs {
                hint: self.hint,
                example: self.example,
            });
        }

        let input = args.join(" ");
        let value = parse_bool(&input).ok_or(SettingError::InvalidBoolean(input))?;
        let set_field = self.set_field;

        mutate_config(ctx.config_path, move |config| set_field(config, Some(value)))?;
        Ok(success_set(self.key, format_bool(value)))
    }

    fn unset(&self, ctx: &SetContext<'_>) -> Result<String, SettingError> {
        let set_field = self.set_field;
        mutate_config(ctx.config_path, move |config| set_field(config, None))?;
        Ok(success_unset(self.key, self.default_display))
    }

    fn format(&self, config: &Config) -> String {
        match (self.get)(config) {
            Some(value) => format!("  {}: {}", self.key, format_bool(value)),
            None => format!("  {}: (unset, default: {})", self.key, self.default_display),
        }
    }
}

/// Create a handler for the `json-mode` setting.
pub fn json_mode_handler() -> BooleanHandler {
    BooleanHandler {
        key: "json-mode",
        hint: "To request JSON output by default, specify on or off:",
        example: "palaver set json-mode on",
        default_display: "off",
        get: |c| c.json_mode,
        set_field: |c, v| c.json_mode = v,
    }
}

/// Create a handler for the `remember-context` setting.
pub fn remember_context_handler() -> BooleanHandler {
    BooleanHandler {
        key: "remember-context",
        hint: "To send earlier turns with each message, specify on or off:",
        example: "palaver set remember-context off",
        default_display: "on",
        get: |c| c.remember_context,
        set_field: |c, v| c.remember_context = v,
    }
}

/// Create a handler for the `stream` setting.
pub fn stream_handler() -> BooleanHandler {
    BooleanHandler {
        key: "stream",
        hint: "To choose streamed or batched responses, specify on or off:",
        example: "palaver set stream off",
        default_display: "on",
        get: |c| c.stream,
        set_field: |c, v| c.stream = v,
    }
}

/// Create a handler for the `math` setting.
pub fn math_handler() -> BooleanHandler {
    BooleanHandler {
        key: "math",
        hint: "To set math typesetting, specify on or off:",
        example: "palaver set math off",
        default_display: "on",
        get: |c| c.math,
        set_field: |c, v| c.math = v,
    }
}

/// Create a handler for the `syntax` setting.
pub fn syntax_handler() -> BooleanHandler {
    BooleanHandler {
        key: "syntax",
        hint: "To set syntax highlighting, specify on or off:",
        example: "palaver set syntax off",
        default_display: "on",
        get: |c| c.syntax,
        set_field: |c, v| c.syntax = v,
    }
}
