//! OpenAI-Compatible API Provider
//!
//! Chat-completions adapter for OpenAI and compatible endpoints (set
//! `api_base` for self-hosted gateways). Response bodies resolve through
//! the envelope union, so callers always receive plain completion text.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, warn};

use super::{ChatMessage, CompletionProvider, ProviderConfig, excerpt, extract_text};
use crate::constants::{network, provider as provider_constants};
use crate::types::{CoachError, Result};

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// OpenAI-compatible provider with secure API key handling
pub struct OpenAiProvider {
    /// API key stored securely - never exposed in logs or debug output
    api_key: SecretString,
    api_base: String,
    model: String,
    temperature: f32,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl OpenAiProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let api_key_str = config
            .api_key
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or_else(|| {
                CoachError::Config(
                    "OpenAI API key not found. Set OPENAI_API_KEY env var or provide in config"
                        .to_string(),
                )
            })?;

        let api_base = config
            .api_base
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        url::Url::parse(&api_base)
            .map_err(|e| CoachError::Config(format!("Invalid api_base '{}': {}", api_base, e)))?;

        let model = config.model.unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(network::CONNECTION_TIMEOUT_SECS))
            .build()
            .map_err(|e| CoachError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key: SecretString::from(api_key_str),
            api_base: api_base.trim_end_matches('/').to_string(),
            model,
            temperature: config.temperature,
            client,
        })
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        max_tokens: u32,
        temperature: Option<f32>,
    ) -> Result<String> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role.as_str(),
                    content: m.content.clone(),
                })
                .collect(),
            temperature: temperature.unwrap_or(self.temperature),
            max_tokens: Some(max_tokens),
        };
        let url = format!("{}/chat/completions", self.api_base);

        debug!(
            model = %self.model,
            messages = messages.len(),
            max_tokens,
            "Sending completion request"
        );

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| CoachError::provider("openai", format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            CoachError::provider("openai", format!("Failed to read response body: {}", e))
        })?;

        if !status.is_success() {
            return Err(CoachError::provider_status(
                "openai",
                status.as_u16(),
                excerpt(&body, provider_constants::RESPONSE_LOG_CHARS),
            ));
        }

        match extract_text(&body) {
            Some(text) => {
                debug!(chars = text.len(), "Completion text extracted");
                Ok(text)
            }
            None => {
                error!(
                    body = %excerpt(&body, provider_constants::RESPONSE_LOG_CHARS),
                    "No completion text found in response"
                );
                Err(CoachError::extraction(
                    "completion",
                    "no completion text found in response body",
                ))
            }
        }
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/models", self.api_base);

        let response = self
            .client
            .get(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => Ok(true),
            Ok(resp) => {
                warn!(status = %resp.status(), "Provider health check failed");
                Ok(false)
            }
            Err(e) => {
                warn!(error = %e, "Provider health check failed");
                Ok(false)
            }
        }
    }
}

// Request types

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<WireMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}
