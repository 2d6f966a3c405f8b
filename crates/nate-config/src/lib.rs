//! Nate configuration.
//!
//! TOML-based configuration for the model gateway, the conversation
//! session, the biodiversity data source and logging. Every section uses
//! serde defaults so a partial (or missing) config file works.
//!
//! ```rust,no_run
//! use nate_config::load_config;
//!
//! let config = load_config(None).expect("failed to load config");
//! println!("model: {}", config.model.name);
//! ```

pub mod schema;
pub mod toml_loader;
pub mod validation;

use std::path::Path;

pub use schema::{
    DataSourceConfig, LogLevel, LoggingConfig, ModelConfig, NateConfig, SessionConfig,
    ToolErrorMode, CONFIG_SCHEMA_VERSION,
};

use nate_common::ConfigError;

/// Load config from `path`, or from the platform default location when
/// `path` is `None`, and validate the result.
pub fn load_config(path: Option<&Path>) -> Result<NateConfig, ConfigError> {
    let config = match path {
        Some(path) => toml_loader::load_from_path(path)?,
        None => toml_loader::load_default()?,
    };
    validation::validate(&config)?;
    Ok(config)
}

/// Serialize a config to a pretty-printed JSON string.
pub fn config_to_json(config: &NateConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_to_json_contains_all_sections() {
        let json = config_to_json(&NateConfig::default());
        assert!(json.contains("\"model\""));
        assert!(json.contains("\"session\""));
        assert!(json.contains("\"data_source\""));
        assert!(json.contains("\"logging\""));
        assert!(json.contains("\"gemini-2.0-flash\""));
    }

    #[test]
    fn load_config_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[session]\nmax_tool_rounds = 0\n").unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
        assert!(err.to_string().contains("session.max_tool_rounds"));
    }

    #[test]
    fn default_config_round_trips_through_json() {
        let json = config_to_json(&NateConfig::default());
        let parsed: NateConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.session.max_tool_rounds, 10);
        assert_eq!(parsed.data_source.base_url, "https://api.inaturalist.org/v1");
    }
}
