//! Model gateway configuration.

use std::path::PathBuf;

use nate_common::ConfigError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub name: String,
    /// Valid range: 1-65536.
    pub max_tokens: u32,
    /// Valid range: 0.0-2.0.
    pub temperature: f64,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// File holding the API key, read when the environment variable is unset.
    pub api_key_file: Option<PathBuf>,
    /// Request timeout in seconds (valid range: 1-600).
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: "gemini-2.0-flash".to_string(),
            max_tokens: 4096,
            temperature: 0.7,
            api_key_env: "GEMINI_API_KEY".to_string(),
            api_key_file: None,
            timeout_secs: 120,
        }
    }
}

impl ModelConfig {
    /// Resolve the API key: environment variable first, then the key file.
    pub fn resolve_api_key(&self) -> Result<String, ConfigError> {
        if let Ok(key) = std::env::var(&self.api_key_env) {
            let key = key.trim().to_string();
            if !key.is_empty() {
                return Ok(key);
            }
        }

        if let Some(path) = &self.api_key_file {
            let key = std::fs::read_to_string(path)
                .map_err(|_| ConfigError::FileNotFound(path.clone()))?;
            let key = key.trim().to_string();
            if !key.is_empty() {
                return Ok(key);
            }
        }

        Err(ConfigError::ValidationError(format!(
            "no API key found: set {} or model.api_key_file",
            self.api_key_env
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_from_file_is_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("API_KEY.txt");
        std::fs::write(&path, "  secret-key\n").unwrap();

        let config = ModelConfig {
            api_key_env: "NATE_TEST_UNSET_KEY_VAR".into(),
            api_key_file: Some(path),
            ..ModelConfig::default()
        };
        assert_eq!(config.resolve_api_key().unwrap(), "secret-key");
    }

    #[test]
    fn missing_key_file_is_file_not_found() {
        let config = ModelConfig {
            api_key_env: "NATE_TEST_UNSET_KEY_VAR".into(),
            api_key_file: Some(PathBuf::from("/tmp/nate_missing_api_key.txt")),
            ..ModelConfig::default()
        };
        assert!(matches!(
            config.resolve_api_key(),
            Err(ConfigError::FileNotFound(_))
        ));
    }

    #[test]
    fn no_source_is_validation_error() {
        let config = ModelConfig {
            api_key_env: "NATE_TEST_UNSET_KEY_VAR".into(),
            ..ModelConfig::default()
        };
        let err = config.resolve_api_key().unwrap_err();
        assert!(err.to_string().contains("NATE_TEST_UNSET_KEY_VAR"));
    }
}
