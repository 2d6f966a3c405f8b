//! Tests for the validation pipeline.

use super::*;

#[test]
fn default_config_validates() {
    assert!(validate(&NateConfig::default()).is_ok());
}

#[test]
fn catches_zero_tool_rounds() {
    let mut config = NateConfig::default();
    config.session.max_tool_rounds = 0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("session.max_tool_rounds = 0"));
}

#[test]
fn catches_temperature_out_of_range() {
    let mut config = NateConfig::default();
    config.model.temperature = 3.5;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("model.temperature"));
}

#[test]
fn catches_nan_temperature() {
    let mut config = NateConfig::default();
    config.model.temperature = f64::NAN;
    assert!(validate(&config).is_err());
}

#[test]
fn catches_per_page_too_large() {
    let mut config = NateConfig::default();
    config.data_source.per_page = 500;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("data_source.per_page"));
}

#[test]
fn catches_blank_model_name() {
    let mut config = NateConfig::default();
    config.model.name = "  ".into();
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("model.name must not be empty"));
}

#[test]
fn collects_multiple_errors() {
    let mut config = NateConfig::default();
    config.session.max_tool_rounds = 99;
    config.data_source.timeout_secs = 0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("session.max_tool_rounds"));
    assert!(err.contains("data_source.timeout_secs"));
    assert!(err.contains("; "));
}
