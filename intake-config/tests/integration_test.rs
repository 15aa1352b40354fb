//! Integration tests for intake-config

use intake_config::*;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

fn write_config(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_toml_file() {
    let file = write_config(
        ".toml",
        r#"
            prefill_delay_ms = 250
            message_debounce_ms = 50
        "#,
    );

    let config = FormConfig::builder()
        .without_env()
        .file(file.path())
        .build()
        .unwrap();

    assert!(config.prefill_enabled);
    assert_eq!(config.prefill_delay(), Duration::from_millis(250));
    assert_eq!(config.message_debounce(), Duration::from_millis(50));
}

#[test]
fn test_json_file_with_override() {
    let file = write_config(".json", r#"{"prefill_enabled": false, "prefill_delay_ms": 10}"#);

    let config = FormConfig::builder()
        .without_env()
        .file(file.path())
        .set("prefill_delay_ms", 20)
        .build()
        .unwrap();

    assert!(!config.prefill_enabled);
    assert_eq!(config.prefill_delay_ms, 20);
}

#[test]
fn test_env_style_file() {
    let file = write_config(".env", "PREFILL_ENABLED=false\nMESSAGE_DEBOUNCE_MS=300\n");

    let config = FormConfig::builder()
        .without_env()
        .file(file.path())
        .build()
        .unwrap();

    assert!(!config.prefill_enabled);
    assert_eq!(config.message_debounce_ms, 300);
}

#[test]
fn test_unsupported_extension() {
    let file = write_config(".yaml", "prefill_delay_ms: 1");
    let result = FormConfig::builder().without_env().file(file.path()).build();
    assert!(matches!(result, Err(ConfigError::LoadError(_))));
}

#[test]
fn test_missing_file() {
    let result = FormConfig::builder()
        .without_env()
        .file("/nonexistent/intake/form.toml")
        .build();
    assert!(matches!(result, Err(ConfigError::LoadError(_))));
}

#[test]
fn test_invalid_file_values_fail_validation() {
    let file = write_config(".json", r#"{"message_debounce_ms": 0}"#);
    let result = FormConfig::builder().without_env().file(file.path()).build();
    assert!(matches!(result, Err(ConfigError::ValidationError(_))));
}
