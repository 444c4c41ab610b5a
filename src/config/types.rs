//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/repcoach/) and project (.repcoach.toml) level
//! configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{memory as memory_constants, network as network_constants};
use crate::llm::ProviderConfig;
use crate::pipeline::PipelineSettings;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// LLM provider settings
    pub llm: LlmConfig,

    /// Pipeline behavior settings
    pub pipeline: PipelineConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            llm: LlmConfig::default(),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `CoachError::Config` on validation failure.
    pub fn validate(&self) -> crate::types::Result<()> {
        if self.llm.provider.trim().is_empty() {
            return Err(crate::types::CoachError::Config(
                "LLM provider must not be empty".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(crate::types::CoachError::Config(format!(
                "LLM temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.llm.timeout_secs == 0 {
            return Err(crate::types::CoachError::Config(
                "LLM timeout_secs must be greater than 0".to_string(),
            ));
        }

        if let Some(api_base) = self.llm.api_base.as_deref() {
            url::Url::parse(api_base).map_err(|e| {
                crate::types::CoachError::Config(format!("Invalid api_base '{}': {}", api_base, e))
            })?;
        }

        if self.pipeline.recall_limit == 0 {
            return Err(crate::types::CoachError::Config(
                "Pipeline recall_limit must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name
    pub provider: String,

    /// Model name
    pub model: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Temperature for stage completions (0.0 = deterministic)
    pub temperature: f32,

    /// API key; prefer the provider's environment variable over config files
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// API base URL (for OpenAI-compatible endpoints)
    pub api_base: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout_secs: network_constants::DEFAULT_TIMEOUT_SECS,
            temperature: 0.3,
            api_key: None,
            api_base: None,
        }
    }
}

impl LlmConfig {
    /// Provider construction parameters for this configuration
    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            provider: self.provider.clone(),
            model: Some(self.model.clone()),
            timeout_secs: self.timeout_secs,
            temperature: self.temperature,
            api_key: self.api_key.clone(),
            api_base: self.api_base.clone(),
        }
    }
}

// =============================================================================
// Pipeline Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Prior messages each stage recalls from its memory sub-thread
    pub recall_limit: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            recall_limit: memory_constants::RECALL_LIMIT,
        }
    }
}

impl PipelineConfig {
    /// Runtime pipeline settings for this configuration
    pub fn settings(&self) -> PipelineSettings {
        PipelineSettings {
            recall_limit: self.recall_limit,
            retry_override: None,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_temperature() {
        let mut config = Config::default();
        config.llm.temperature = 3.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.llm.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_api_base() {
        let mut config = Config::default();
        config.llm.api_base = Some("not a url".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_recall_limit() {
        let mut config = Config::default();
        config.pipeline.recall_limit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_provider_config_conversion() {
        let mut llm = LlmConfig::default();
        llm.model = "gpt-4o".to_string();
        llm.api_base = Some("https://llm.internal/v1".to_string());

        let provider = llm.provider_config();
        assert_eq!(provider.provider, "openai");
        assert_eq!(provider.model.as_deref(), Some("gpt-4o"));
        assert_eq!(provider.api_base.as_deref(), Some("https://llm.internal/v1"));
    }

    #[test]
    fn test_api_key_never_serialized() {
        let mut config = Config::default();
        config.llm.api_key = Some("sk-secret".to_string());
        let toml = toml::to_string(&config).unwrap();
        assert!(!toml.contains("sk-secret"));
    }
}
