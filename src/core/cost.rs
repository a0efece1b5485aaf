use crate::core::models::{find_model, ModelSpec};
use crate::core::stream_state::Usage;

pub const MODEL_NOT_FOUND: &str = "Model not found";

/// Price of a finished response in the display currency.
///
/// `rate` converts USD into `currency`. The amount has three decimals and is
/// followed by the currency code; an unknown model yields
/// [`MODEL_NOT_FOUND`].
pub fn format_cost(
    usage: &Usage,
    model_name: &str,
    models: &[ModelSpec],
    rate: f64,
    currency: &str,
) -> String {
    let Some(model) = find_model(models, model_name) else {
        return MODEL_NOT_FOUND.to_string();
    };

    let input = usage.prompt_tokens as f64 / 1_000_000.0 * model.input_cost_per_million;
    let output = usage.completion_tokens as f64 / 1_000_000.0 * model.output_cost_per_million;
    format!("{:.3} {}", (input + output) * rate, currency)
}
