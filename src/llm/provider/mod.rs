//! Completion Provider Abstraction
//!
//! Defines the CompletionProvider trait the pipeline stages call through.
//! Providers take chat-style messages and return normalized completion text;
//! response-shape differences are resolved at this boundary (see `envelope`).
//!
//! ## Modules
//!
//! - `envelope`: closed union of accepted response shapes
//! - `openai`: OpenAI-compatible chat-completions adapter

mod envelope;
mod openai;

pub use envelope::{CompletionEnvelope, extract_text};
pub use openai::OpenAiProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::types::{CoachError, Result};

// =============================================================================
// Chat Messages
// =============================================================================

/// Message roles for chat-style completion requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for ChatRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One message in a completion request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Shared provider type for access across pipeline stages.
pub type SharedProvider = Arc<dyn CompletionProvider + Send + Sync>;

// =============================================================================
// Provider Configuration
// =============================================================================

/// Configuration for completion providers
///
/// Note: API keys are handled securely - they are never serialized to output
/// and are redacted in debug output. The provider converts the key to
/// SecretString internally for runtime protection.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider type: "openai" (covers any OpenAI-compatible endpoint)
    pub provider: String,
    /// Model name (provider-specific)
    pub model: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Default temperature when a call does not override it
    pub temperature: f32,
    /// API key - never serialized to output for security
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// API base URL (for custom endpoints)
    #[serde(default)]
    pub api_base: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: None,
            timeout_secs: crate::constants::network::DEFAULT_TIMEOUT_SECS,
            temperature: 0.3,
            api_key: None,
            api_base: None,
        }
    }
}

// =============================================================================
// Completion Provider Trait
// =============================================================================

/// Completion provider trait for text generation
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Request a completion and return the normalized completion text.
    ///
    /// `temperature` overrides the provider's configured default when set.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        max_tokens: u32,
        temperature: Option<f32>,
    ) -> Result<String>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model name currently in use
    fn model(&self) -> &str;

    /// Check if the provider is reachable
    async fn health_check(&self) -> Result<bool>;
}

/// Create a shared provider from configuration.
///
/// A misconfigured provider (unknown type, missing key, bad endpoint) fails
/// here with a configuration error, before any pipeline work starts.
pub fn create_provider(config: &ProviderConfig) -> Result<SharedProvider> {
    match config.provider.as_str() {
        "openai" => Ok(Arc::new(OpenAiProvider::new(config.clone())?)),
        _ => Err(CoachError::Config(format!(
            "Unknown provider: {}. Supported: openai",
            config.provider
        ))),
    }
}

/// Shorten a response body for logs and error messages
pub(crate) fn excerpt(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_chars).collect();
        format!("{}... ({} chars total)", head, text.chars().count())
    }
}
