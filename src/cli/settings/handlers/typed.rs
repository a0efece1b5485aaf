//! Handlers for settings stored as non-string values.

use crate::cli::settings::error::SettingError;
use crate::cli::settings::helpers::{mutate_config, success_set, success_unset};
use crate::cli::settings::{SetContext, SettingHandler};
use crate::core::chat_stream::ReasoningEffort;
use crate::core::config::data::{Config, DEFAULT_CONVERSION_RATE};

/// Handler for the `reasoning-effort` setting.
pub struct ReasoningEffortHandler;

impl SettingHandler for ReasoningEffortHandler {
    fn key(&self) -> &'static str {
        "reasoning-effort"
    }

    fn set(&self, args: &[String], ctx: &SetContext<'_>) -> Result<String, SettingError> {
        if args.is_empty() {
            return Err(SettingError::MissingArgs {
                hint: "To set a reasoning effort, specify low, medium or high:",
                example: "palaver set reasoning-effort high",
            });
        }

        let effort: ReasoningEffort =
            args.join(" ")
                .parse()
                .map_err(|reason| SettingError::InvalidValue {
                    key: "reasoning-effort",
                    reason,
                })?;

        mutate_config(ctx.config_path, move |config| {
            config.reasoning_effort = Some(effort)
        })?;
        Ok(success_set(self.key(), effort.as_str()))
    }

    fn unset(&self, ctx: &SetContext<'_>) -> Result<String, SettingError> {
        mutate_config(ctx.config_path, |config| config.reasoning_effort = None)?;
        Ok(success_unset(self.key(), "model default"))
    }

    fn format(&self, config: &Config) -> String {
        match config.reasoning_effort {
            Some(effort) => format!("  reasoning-effort: {effort}"),
            None => "  reasoning-effort: (unset, default: model default)".to_string(),
        }
    }
}

/// Handler for the `conversion-rate` setting.
pub struct ConversionRateHandler;

impl SettingHandler for ConversionRateHandler {
    fn key(&self) -> &'static str {
        "conversion-rate"
    }

    fn set(&self, args: &[String], ctx: &SetContext<'_>) -> Result<String, SettingError> {
        let Some(input) = args.first() else {
            return Err(SettingError::MissingArgs {
                hint: "To convert costs from USD, give the exchange rate:",
                example: "palaver set conversion-rate 83.5",
            });
        };

        let rate = parse_rate(input)?;
        mutate_config(ctx.config_path, move |config| {
            config.conversion_rate = Some(rate)
        })?;
        Ok(success_set(self.key(), &rate.to_string()))
    }

    fn unset(&self, ctx: &SetContext<'_>) -> Result<String, SettingError> {
        mutate_config(ctx.config_path, |config| config.conversion_rate = None)?;
        Ok(success_unset(
            self.key(),
            &DEFAULT_CONVERSION_RATE.to_string(),
        ))
    }

    fn format(&self, config: &Config) -> String {
        match config.conversion_rate {
            Some(rate) => format!("  conversion-rate: {rate}"),
            None => format!("  conversion-rate: (unset, default: {DEFAULT_CONVERSION_RATE})"),
        }
    }
}

fn parse_rate(input: &str) -> Result<f64, SettingError> {
    let invalid = |reason: &str| SettingError::InvalidValue {
        key: "conversion-rate",
        reason: reason.to_string(),
    };
    let rate: f64 = input
        .trim()
        .parse()
        .map_err(|_| invalid("expected a number"))?;
    if !rate.is_finite() || rate <= 0.0 {
        return Err(invalid("must be a positive number"));
    }
    Ok(rate)
}
