use super::*;
use tempfile::tempdir;

use crate::core::chat_stream::ReasoningEffort;

fn args(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

fn set(registry: &SettingRegistry, path: &Path, key: &str, words: &[&str]) -> Result<String, SettingError> {
    let config = Config::load_from_path(path).unwrap();
    let ctx = SetContext {
        config: &config,
        config_path: path,
    };
    registry.set(key, &args(words), &ctx)
}

fn unset(registry: &SettingRegistry, path: &Path, key: &str) -> Result<String, SettingError> {
    let config = Config::load_from_path(path).unwrap();
    let ctx = SetContext {
        config: &config,
        config_path: path,
    };
    registry.unset(key, &ctx)
}

#[test]
fn boolean_settings_accept_on_off_words() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let registry = SettingRegistry::new();

    let message = set(&registry, &path, "json-mode", &["yes"]).unwrap();
    assert_eq!(message, "✅ Set json-mode to: on");
    set(&registry, &path, "stream", &["off"]).unwrap();

    let config = Config::load_from_path(&path).unwrap();
    assert_eq!(config.json_mode, Some(true));
    assert_eq!(config.stream, Some(false));

    let err = set(&registry, &path, "math", &["maybe"]).unwrap_err();
    assert!(matches!(err, SettingError::InvalidBoolean(ref input) if input == "maybe"));
}

#[test]
fn unset_restores_default() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let registry = SettingRegistry::new();

    set(&registry, &path, "syntax", &["off"]).unwrap();
    let message = unset(&registry, &path, "syntax").unwrap();
    assert!(message.contains("default: on"));
    assert_eq!(Config::load_from_path(&path).unwrap().syntax, None);
}

#[test]
fn base_url_is_validated_and_normalized() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let registry = SettingRegistry::new();

    set(&registry, &path, "base-url", &["https://example.com/v1/"]).unwrap();
    assert_eq!(
        Config::load_from_path(&path).unwrap().base_url.as_deref(),
        Some("https://example.com/v1")
    );

    let err = set(&registry, &path, "base-url", &["ftp://example.com"]).unwrap_err();
    assert!(matches!(err, SettingError::InvalidValue { key: "base-url", .. }));
}

#[test]
fn theme_must_be_known() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let registry = SettingRegistry::new();

    set(&registry, &path, "theme", &["LIGHT"]).unwrap();
    assert_eq!(
        Config::load_from_path(&path).unwrap().theme.as_deref(),
        Some("light")
    );
    assert!(matches!(
        set(&registry, &path, "theme", &["solarized"]),
        Err(SettingError::UnknownTheme { .. })
    ));
}

#[test]
fn multi_word_values_are_joined() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let registry = SettingRegistry::new();

    set(&registry, &path, "system-instruction", &["Answer", "in", "French."]).unwrap();
    assert_eq!(
        Config::load_from_path(&path)
            .unwrap()
            .system_instruction
            .as_deref(),
        Some("Answer in French.")
    );
}

#[test]
fn typed_settings_parse_their_values() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let registry = SettingRegistry::new();

    set(&registry, &path, "reasoning-effort", &["High"]).unwrap();
    set(&registry, &path, "conversion-rate", &["83.5"]).unwrap();
    set(&registry, &path, "currency", &["inr"]).unwrap();

    let config = Config::load_from_path(&path).unwrap();
    assert_eq!(config.reasoning_effort, Some(ReasoningEffort::High));
    assert_eq!(config.conversion_rate, Some(83.5));
    assert_eq!(config.currency.as_deref(), Some("INR"));

    assert!(matches!(
        set(&registry, &path, "conversion-rate", &["-1"]),
        Err(SettingError::InvalidValue { .. })
    ));
    assert!(matches!(
        set(&registry, &path, "reasoning-effort", &["extreme"]),
        Err(SettingError::InvalidValue { .. })
    ));
}

#[test]
fn missing_value_and_unknown_key() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let registry = SettingRegistry::new();

    let err = set(&registry, &path, "default-model", &[]).unwrap_err();
    assert!(matches!(err, SettingError::MissingArgs { .. }));
    assert_eq!(err.exit_code(), 2);

    let err = set(&registry, &path, "provider", &["openai"]).unwrap_err();
    assert!(matches!(err, SettingError::UnknownKey(ref key) if key == "provider"));
    assert!(!path.exists());
}

#[test]
fn describe_lists_every_key_in_order() {
    let registry = SettingRegistry::new();
    let config = Config {
        default_model: Some("o3-mini".to_string()),
        ..Config::default()
    };
    let lines = registry.describe(&config, Path::new("/tmp/palaver/config.toml"));

    assert!(lines[0].starts_with("📄 Config file:"));
    assert_eq!(lines.len(), 2 + registry.keys_display_order().len());
    assert!(lines.contains(&"  default-model: o3-mini".to_string()));
    assert!(lines.contains(&"  json-mode: (unset, default: off)".to_string()));
    assert_eq!(lines[2], "  base-url: (unset, default: https://api.openai.com/v1)");
}
