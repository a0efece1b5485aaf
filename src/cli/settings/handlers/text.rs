//! Text setting handlers, each with its own validation.

use crate::cli::settings::error::SettingError;
use crate::cli::settings::helpers::{
    mutate_config, success_set, success_unset, truncate_with_ellipsis, validate_theme,
};
use crate::cli::settings::{SetContext, SettingHandler};
use crate::core::config::data::{Config, DEFAULT_BASE_URL, DEFAULT_CURRENCY};
use crate::core::models::DEFAULT_MODEL;
use crate::utils::url::validate_base_url;

const DISPLAY_LIMIT: usize = 50;

/// Data-driven handler for free-text settings.
pub struct TextHandler {
    key: &'static str,
    hint: &'static str,
    example: &'static str,
    default_display: &'static str,
    validate: fn(&str) -> Result<String, SettingError>,
    get: fn(&Config) -> Option<&str>,
    set_field: fn(&mut Config, Option<String>),
}

impl SettingHandler for TextHandler {
    fn key(&self) -> &'static str {
        self.key
    }

    fn set(&self, args: &[String], ctx: &SetContext<'_>) -> Result<String, SettingError> {
        let input = args.join(" ");
        if input.trim().is_empty() {
            return Err(SettingError::MissingArgs {
                hint: self.hint,
                example: self.example,
            });
        }

        let value = (self.validate)(&input)?;
        let message = success_set(self.key, &truncate_with_ellipsis(&value, DISPLAY_LIMIT));
        let set_field = self.set_field;

        mutate_config(ctx.config_path, move |config| set_field(config, Some(value)))?;
        Ok(message)
    }

    fn unset(&self, ctx: &SetContext<'_>) -> Result<String, SettingError> {
        let set_field = self.set_field;
        mutate_config(ctx.config_path, move |config| set_field(config, None))?;
        Ok(success_unset(self.key, self.default_display))
    }

    fn format(&self, config: &Config) -> String {
        match (self.get)(config) {
            Some(value) => {
                let flat = value.replace('\n', " ");
                format!(
                    "  {}: {}",
                    self.key,
                    truncate_with_ellipsis(&flat, DISPLAY_LIMIT)
                )
            }
            None => format!("  {}: (unset, default: {})", self.key, self.default_display),
        }
    }
}

fn trimmed(input: &str) -> Result<String, SettingError> {
    Ok(input.trim().to_string())
}

/// Create a handler for the `base-url` setting.
pub fn base_url_handler() -> TextHandler {
    TextHandler {
        key: "base-url",
        hint: "To point palaver at another Responses API endpoint, give its base URL:",
        example: "palaver set base-url https://api.openai.com/v1",
        default_display: DEFAULT_BASE_URL,
        validate: |input| {
            validate_base_url(input).map_err(|reason| SettingError::InvalidValue {
                key: "base-url",
                reason,
            })
        },
        get: |c| c.base_url.as_deref(),
        set_field: |c, v| c.base_url = v,
    }
}

/// Create a handler for the `default-model` setting.
pub fn default_model_handler() -> TextHandler {
    TextHandler {
        key: "default-model",
        hint: "To set a default model, specify its name:",
        example: "palaver set default-model gpt-4o",
        default_display: DEFAULT_MODEL,
        validate: trimmed,
        get: |c| c.default_model.as_deref(),
        set_field: |c, v| c.default_model = v,
    }
}

/// Create a handler for the `theme` setting.
pub fn theme_handler() -> TextHandler {
    TextHandler {
        key: "theme",
        hint: "To set a theme, specify dark or light:",
        example: "palaver set theme light",
        default_display: "dark",
        validate: validate_theme,
        get: |c| c.theme.as_deref(),
        set_field: |c, v| c.theme = v,
    }
}

/// Create a handler for the `system-instruction` setting.
pub fn system_instruction_handler() -> TextHandler {
    TextHandler {
        key: "system-instruction",
        hint: "To set a system instruction, provide the instruction text:",
        example: "palaver set system-instruction \"Answer briefly.\"",
        default_display: "none",
        validate: trimmed,
        get: |c| c.system_instruction.as_deref(),
        set_field: |c, v| c.system_instruction = v,
    }
}

/// Create a handler for the `currency` setting.
pub fn currency_handler() -> TextHandler {
    TextHandler {
        key: "currency",
        hint: "To set the currency code shown in cost reports, specify it:",
        example: "palaver set currency INR",
        default_display: DEFAULT_CURRENCY,
        validate: |input| Ok(input.trim().to_uppercase()),
        get: |c| c.currency.as_deref(),
        set_field: |c, v| c.currency = v,
    }
}
