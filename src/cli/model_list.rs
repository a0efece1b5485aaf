//! `palaver models`: the model catalog with prices.

use std::error::Error;

use crate::core::config::Config;
use crate::core::models::ModelSpec;

pub fn model_lines(models: &[ModelSpec], default_model: &str) -> Vec<String> {
    let width = models.iter().map(|m| m.name.len()).max().unwrap_or(0);
    models
        .iter()
        .map(|model| {
            let marker = if model.name == default_model { "*" } else { " " };
            let mut line = format!(
                "{marker} {:width$}  {}",
                model.name,
                model.price_summary()
            );
            if model.supports_reasoning_effort {
                line.push_str("  [reasoning effort]");
            }
            line
        })
        .collect()
}

pub fn list_models() -> Result<(), Box<dyn Error>> {
    let config = Config::load()?;
    let catalog = config.model_catalog();

    println!("🤖 Available models");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for line in model_lines(&catalog, config.default_model()) {
        println!("{line}");
    }
    println!();
    println!("* default model (change with 'palaver set default-model <name>')");
    if config.conversion_rate() != 1.0 || config.currency() != "USD" {
        println!(
            "Costs are reported in {} at {} per USD.",
            config.currency(),
            config.conversion_rate()
        );
    }
    Ok(())
}
