//! Model catalog
//!
//! Built-in models ship in `builtin_models.toml`, embedded at build time.
//! The user config may add models or override built-in ones by name.

use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub name: String,
    /// USD per million prompt tokens.
    pub input_cost_per_million: f64,
    /// USD per million completion tokens.
    pub output_cost_per_million: f64,
    #[serde(default)]
    pub supports_reasoning_effort: bool,
}

impl ModelSpec {
    /// e.g. `$0.15 in / $0.60 out per 1M tokens`
    pub fn price_summary(&self) -> String {
        format!(
            "${:.2} in / ${:.2} out per 1M tokens",
            self.input_cost_per_million, self.output_cost_per_million
        )
    }
}

#[derive(Debug, Deserialize)]
struct BuiltinModelsConfig {
    models: Vec<ModelSpec>,
}

pub fn load_builtin_models() -> Vec<ModelSpec> {
    const CONFIG_CONTENT: &str = include_str!("../builtin_models.toml");

    let config: BuiltinModelsConfig =
        toml::from_str(CONFIG_CONTENT).expect("Failed to parse builtin_models.toml");
    config.models
}

/// Built-in models merged with user entries. A user entry replaces the
/// built-in model of the same name in place; new names are appended.
pub fn merged_catalog(overrides: &[ModelSpec]) -> Vec<ModelSpec> {
    let mut catalog = load_builtin_models();
    for spec in overrides {
        match catalog.iter_mut().find(|m| m.name == spec.name) {
            Some(existing) => *existing = spec.clone(),
            None => catalog.push(spec.clone()),
        }
    }
    catalog
}

/// Exact, case-sensitive lookup.
pub fn find_model<'a>(models: &'a [ModelSpec], name: &str) -> Option<&'a ModelSpec> {
    models.iter().find(|m| m.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_summary_uses_two_decimals() {
        let models = load_builtin_models();
        let mini = find_model(&models, "gpt-4o-mini").unwrap();
        assert_eq!(mini.price_summary(), "$0.15 in / $0.60 out per 1M tokens");
    }

    #[test]
    fn builtin_catalog_loads() {
        let models = load_builtin_models();
        let names: Vec<&str> = models.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["gpt-4o-mini", "gpt-4o", "o3-mini"]);
        assert!(find_model(&models, DEFAULT_MODEL).is_some());

        let o3 = find_model(&models, "o3-mini").unwrap();
        assert!(o3.supports_reasoning_effort);
        assert_eq!(o3.input_cost_per_million, 1.1);
    }

    #[test]
    fn user_entries_override_and_extend() {
        let overrides = vec![
            ModelSpec {
                name: "gpt-4o".into(),
                input_cost_per_million: 2.0,
                output_cost_per_million: 8.0,
                supports_reasoning_effort: false,
            },
            ModelSpec {
                name: "local-llama".into(),
                input_cost_per_million: 0.0,
                output_cost_per_million: 0.0,
                supports_reasoning_effort: false,
            },
        ];
        let catalog = merged_catalog(&overrides);
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog[1].input_cost_per_million, 2.0);
        assert_eq!(catalog[3].name, "local-llama");
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let models = load_builtin_models();
        assert!(find_model(&models, "GPT-4o").is_none());
    }
}
