use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::chat_stream::ReasoningEffort;
use crate::core::models::{merged_catalog, ModelSpec, DEFAULT_MODEL};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_CURRENCY: &str = "USD";
pub const DEFAULT_CONVERSION_RATE: f64 = 1.0;

/// Settings persisted in `config.toml`. Unset fields fall back to the
/// defaults exposed by the accessor methods.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Responses API base URL (e.g., "https://api.openai.com/v1")
    pub base_url: Option<String>,
    pub default_model: Option<String>,
    /// UI theme name ("dark" or "light")
    pub theme: Option<String>,
    /// Sent as the request `instructions` field when non-empty
    pub system_instruction: Option<String>,
    pub json_mode: Option<bool>,
    /// Send earlier turns along with each new message
    pub remember_context: Option<bool>,
    /// Only forwarded to models that accept it
    pub reasoning_effort: Option<ReasoningEffort>,
    /// Stream responses as they are generated instead of waiting for the whole body
    pub stream: Option<bool>,
    /// Typeset `\[ ... \]` display math
    pub math: Option<bool>,
    /// Enable syntax highlighting for fenced code blocks
    pub syntax: Option<bool>,
    /// Multiplier from USD to the display currency
    pub conversion_rate: Option<f64>,
    pub currency: Option<String>,
    /// Additional models, or replacements for built-in ones with the same name
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub models: Vec<ModelSpec>,
}

impl Config {
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn default_model(&self) -> &str {
        self.default_model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn json_mode(&self) -> bool {
        self.json_mode.unwrap_or(false)
    }

    pub fn remember_context(&self) -> bool {
        self.remember_context.unwrap_or(true)
    }

    pub fn stream(&self) -> bool {
        self.stream.unwrap_or(true)
    }

    pub fn math(&self) -> bool {
        self.math.unwrap_or(true)
    }

    pub fn syntax(&self) -> bool {
        self.syntax.unwrap_or(true)
    }

    pub fn conversion_rate(&self) -> f64 {
        self.conversion_rate.unwrap_or(DEFAULT_CONVERSION_RATE)
    }

    pub fn currency(&self) -> &str {
        self.currency.as_deref().unwrap_or(DEFAULT_CURRENCY)
    }

    /// Built-in models merged with the ones declared in this config.
    pub fn model_catalog(&self) -> Vec<ModelSpec> {
        merged_catalog(&self.models)
    }
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
