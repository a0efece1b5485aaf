//! Registry of setting handlers.

use std::collections::HashMap;
use std::path::Path;

use super::handlers::boolean::{
    json_mode_handler, math_handler, remember_context_handler, stream_handler, syntax_handler,
};
use super::handlers::text::{
    base_url_handler, currency_handler, default_model_handler, system_instruction_handler,
    theme_handler,
};
use super::handlers::{ConversionRateHandler, ReasoningEffortHandler};
use super::error::SettingError;
use super::{SetContext, SettingHandler};
use crate::core::config::data::{path_display, Config};

/// Registry of all available setting handlers.
pub struct SettingRegistry {
    handlers: HashMap<&'static str, Box<dyn SettingHandler>>,
    /// Keys in display order for `palaver config` output.
    display_order: Vec<&'static str>,
}

impl SettingRegistry {
    /// Create a new registry with all handlers registered.
    pub fn new() -> Self {
        let mut registry = Self {
            handlers: HashMap::new(),
            display_order: Vec::new(),
        };

        // Register handlers in display order
        registry.register(Box::new(base_url_handler()));
        registry.register(Box::new(default_model_handler()));
        registry.register(Box::new(theme_handler()));
        registry.register(Box::new(system_instruction_handler()));
        registry.register(Box::new(json_mode_handler()));
        registry.register(Box::new(remember_context_handler()));
        registry.register(Box::new(ReasoningEffortHandler));
        registry.register(Box::new(stream_handler()));
        registry.register(Box::new(math_handler()));
        registry.register(Box::new(syntax_handler()));
        registry.register(Box::new(ConversionRateHandler));
        registry.register(Box::new(currency_handler()));

        registry
    }

    fn register(&mut self, handler: Box<dyn SettingHandler>) {
        let key = handler.key();
        self.display_order.push(key);
        self.handlers.insert(key, handler);
    }

    /// Get a handler by key.
    pub fn get(&self, key: &str) -> Option<&dyn SettingHandler> {
        self.handlers.get(key).map(|h| h.as_ref())
    }

    /// Get all keys in display order.
    pub fn keys_display_order(&self) -> &[&'static str] {
        &self.display_order
    }

    pub fn set(&self, key: &str, args: &[String], ctx: &SetContext<'_>) -> Result<String, SettingError> {
        self.get(key)
            .ok_or_else(|| SettingError::UnknownKey(key.to_string()))?
            .set(args, ctx)
    }

    pub fn unset(&self, key: &str, ctx: &SetContext<'_>) -> Result<String, SettingError> {
        self.get(key)
            .ok_or_else(|| SettingError::UnknownKey(key.to_string()))?
            .unset(ctx)
    }

    /// All settings, one per line, preceded by the config file location.
    pub fn describe(&self, config: &Config, config_path: &Path) -> Vec<String> {
        let mut lines = vec![
            format!("📄 Config file: {}", path_display(config_path)),
            "Current configuration:".to_string(),
        ];
        lines.extend(
            self.keys_display_order()
                .iter()
                .filter_map(|key| self.get(key))
                .map(|handler| handler.format(config)),
        );
        if !config.models.is_empty() {
            lines.push("  models:".to_string());
            for model in &config.models {
                lines.push(format!("    - {}", model.name));
            }
        }
        lines
    }
}

impl Default for SettingRegistry {
    fn default() -> Self {
        Self::new()
    }
}
