//! Settings management for CLI set/unset commands.
//!
//! Each configuration key is served by a [`SettingHandler`]:
//!
//! - Boolean settings (e.g., `json-mode`, `syntax`)
//! - Text settings with validation (e.g., `base-url`, `theme`)
//! - Typed settings (`reasoning-effort`, `conversion-rate`)

pub mod error;
pub mod handlers;
pub mod helpers;
pub mod registry;

#[cfg(test)]
mod tests;

use std::path::Path;

pub use error::SettingError;
pub use registry::SettingRegistry;

use crate::core::config::data::Config;

/// Context provided to setting handlers during set/unset operations.
pub struct SetContext<'a> {
    pub config: &'a Config,
    pub config_path: &'a Path,
}

/// Trait for handling a configuration setting.
pub trait SettingHandler: Send + Sync {
    /// Returns the configuration key this handler manages.
    fn key(&self) -> &'static str;

    /// Set the configuration value from the words after the key.
    ///
    /// Returns a success message to display.
    fn set(&self, args: &[String], ctx: &SetContext<'_>) -> Result<String, SettingError>;

    /// Clear the value so the built-in default applies again.
    fn unset(&self, ctx: &SetContext<'_>) -> Result<String, SettingError>;

    /// Format the current value for display in `palaver config` output.
    fn format(&self, config: &Config) -> String;
}
