//! Configuration for the advisory engine
//!
//! Settings are stored as TOML. The CLI looks for `neurofocus.toml` in the
//! working directory first, then in the platform config directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    model::{DEFAULT_MODEL, default_model_for},
};

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdvisorConfig {
    /// Upper bound on a single model call; a timeout falls back to heuristics
    #[serde(
        default,
        rename = "timeout_secs",
        with = "crate::utils::duration_secs",
        skip_serializing_if = "Option::is_none"
    )]
    pub timeout: Option<Duration>,

    /// Model provider configuration
    #[serde(default)]
    pub model: ModelConfig,
}

/// Model provider configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Provider name (e.g., "gemini", "openai"); picks the default model
    pub provider: String,

    /// Optional specific model to use
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Optional temperature setting
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl ModelConfig {
    /// The configured model, else the provider's default model
    pub fn model_id(&self) -> &str {
        self.model
            .as_deref()
            .or_else(|| default_model_for(&self.provider))
            .unwrap_or(DEFAULT_MODEL)
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: None,
            temperature: None,
        }
    }
}

/// Load configuration from a TOML file
pub async fn load_config(path: &Path) -> Result<AdvisorConfig> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        crate::AdvisoryError::ConfigurationError {
            config_path: path.display().to_string(),
            field: "file".to_string(),
            expected: "readable TOML file".to_string(),
            cause: crate::error::ConfigError::Io(e.to_string()),
        }
    })?;

    toml::from_str(&content).map_err(|e| crate::AdvisoryError::ConfigurationError {
        config_path: path.display().to_string(),
        field: "content".to_string(),
        expected: "valid TOML configuration".to_string(),
        cause: crate::error::ConfigError::TomlParse(e.to_string()),
    })
}

/// Save configuration to a TOML file, creating parent directories
pub async fn save_config(config: &AdvisorConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                crate::AdvisoryError::ConfigurationError {
                    config_path: parent.display().to_string(),
                    field: "directory".to_string(),
                    expected: "writable directory".to_string(),
                    cause: crate::error::ConfigError::Io(e.to_string()),
                }
            })?;
        }
    }

    let content =
        toml::to_string_pretty(config).map_err(|e| crate::AdvisoryError::ConfigurationError {
            config_path: path.display().to_string(),
            field: "serialization".to_string(),
            expected: "serializable config structure".to_string(),
            cause: crate::error::ConfigError::TomlSerialize(e.to_string()),
        })?;

    tokio::fs::write(path, content)
        .await
        .map_err(|e| crate::AdvisoryError::ConfigurationError {
            config_path: path.display().to_string(),
            field: "file".to_string(),
            expected: "writable file location".to_string(),
            cause: crate::error::ConfigError::Io(e.to_string()),
        })?;

    Ok(())
}

/// Candidate config locations, most specific first
pub fn standard_locations() -> Vec<PathBuf> {
    let mut locations = vec![PathBuf::from("neurofocus.toml")];
    if let Some(config_dir) = dirs::config_dir() {
        locations.push(config_dir.join("neurofocus").join("config.toml"));
    }
    locations
}

/// Load from the first standard location that exists, or fall back to defaults
pub async fn load_config_from_standard_locations() -> Result<AdvisorConfig> {
    for path in standard_locations() {
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::debug!("Loading config from {}", path.display());
            return load_config(&path).await;
        }
    }

    tracing::debug!("No config file found, using defaults");
    Ok(AdvisorConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_model_id() {
        let config = AdvisorConfig::default();
        assert_eq!(config.model.model_id(), "gemini-1.5-flash");
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn test_provider_selects_default_model() {
        let config: AdvisorConfig = toml::from_str(
            r#"
            [model]
            provider = "openai"
            "#,
        )
        .unwrap();
        assert_eq!(config.model.model_id(), "gpt-4o-mini");

        let unknown = ModelConfig {
            provider: "someone-else".to_string(),
            ..Default::default()
        };
        assert_eq!(unknown.model_id(), DEFAULT_MODEL);

        let explicit = ModelConfig {
            provider: "openai".to_string(),
            model: Some("gpt-4o".to_string()),
            temperature: None,
        };
        assert_eq!(explicit.model_id(), "gpt-4o");
    }

    #[test]
    fn test_parse_timeout_secs() {
        let config: AdvisorConfig = toml::from_str(
            r#"
            timeout_secs = 12

            [model]
            provider = "gemini"
            model = "gemini-1.5-pro"
            temperature = 0.4
            "#,
        )
        .unwrap();

        assert_eq!(config.timeout, Some(Duration::from_secs(12)));
        assert_eq!(config.model.model_id(), "gemini-1.5-pro");
        assert_eq!(config.model.temperature, Some(0.4));
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("neurofocus.toml");

        let config = AdvisorConfig {
            model: ModelConfig {
                provider: "openai".to_string(),
                model: Some("gpt-4o-mini".to_string()),
                temperature: None,
            },
            timeout: Some(Duration::from_secs(30)),
        };

        save_config(&config, &path).await.unwrap();
        let loaded = load_config(&path).await.unwrap();
        assert_eq!(loaded, config);
    }

    #[tokio::test]
    async fn test_load_missing_file_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(&dir.path().join("absent.toml"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::AdvisoryError::ConfigurationError { ref field, .. } if field == "file"
        ));
    }
}
