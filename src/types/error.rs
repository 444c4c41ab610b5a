//! Unified Error Type System
//!
//! Centralized error types for the entire application.
//! Provides error classification so the retry layer can decide what is
//! worth another attempt and what must fail fast.
//!
//! ## Error Categories
//!
//! - **Transient**: Temporary server-side issues (retry)
//! - **RateLimit**: API rate limiting (wait and retry)
//! - **Network**: Connectivity issues, resets, timeouts (retry with backoff)
//! - **Auth**: Authentication failures (fail fast)
//! - **Configuration**: Missing/invalid setup (fail fast, never retried)
//! - **Extraction**: Completion text could not be recovered (fatal per stage)
//!
//! ## Design Principles
//!
//! - Single unified error type (CoachError) for the entire application
//! - Structured variants with context for better debugging
//! - Category-based routing for retry decisions
//! - No panic/unwrap - all errors are recoverable

use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Error Categories
// =============================================================================

/// Unified error categories for retry decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rate limited - wait then retry
    RateLimit,
    /// Network/connectivity issues - retry with backoff
    Network,
    /// Temporary server issues - retry
    Transient,
    /// Authentication failed - fail fast, don't retry
    Auth,
    /// Invalid or missing configuration - fail fast, never retried
    Configuration,
    /// Completion text extraction failed - fatal for the stage
    Extraction,
    /// Parsing structured data failed - don't retry, fix input
    Parse,
    /// Unknown error - don't retry
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RateLimit => write!(f, "RATE_LIMIT"),
            Self::Network => write!(f, "NETWORK"),
            Self::Transient => write!(f, "TRANSIENT"),
            Self::Auth => write!(f, "AUTH"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Extraction => write!(f, "EXTRACTION"),
            Self::Parse => write!(f, "PARSE"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl ErrorCategory {
    /// Check if this category is worth retrying on the same provider
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimit | Self::Network | Self::Transient)
    }
}

// =============================================================================
// Error Classifier
// =============================================================================

/// Classifies raw error text and HTTP statuses into categories
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify an error message from any provider
    pub fn classify(message: &str) -> ErrorCategory {
        let lower = message.to_lowercase();

        // Rate limiting patterns
        if lower.contains("rate limit")
            || lower.contains("429")
            || lower.contains("too many requests")
            || lower.contains("quota exceeded")
        {
            return ErrorCategory::RateLimit;
        }

        // Authentication patterns
        if lower.contains("401")
            || lower.contains("403")
            || lower.contains("api key")
            || lower.contains("invalid key")
            || lower.contains("unauthorized")
            || lower.contains("permission denied")
        {
            return ErrorCategory::Auth;
        }

        // Network patterns (resets and timeouts included)
        if lower.contains("network")
            || lower.contains("econnreset")
            || lower.contains("connection")
            || lower.contains("dns")
            || lower.contains("timeout")
            || lower.contains("timed out")
            || lower.contains("unreachable")
            || lower.contains("broken pipe")
        {
            return ErrorCategory::Network;
        }

        // Transient server-side patterns
        if lower.contains("500")
            || lower.contains("502")
            || lower.contains("503")
            || lower.contains("504")
            || lower.contains("service unavailable")
            || lower.contains("server error")
            || lower.contains("internal error")
            || lower.contains("overloaded")
            || lower.contains("temporar")
        {
            return ErrorCategory::Transient;
        }

        ErrorCategory::Unknown
    }

    /// Classify HTTP status code directly (more accurate than string matching)
    pub fn classify_status(status: u16) -> ErrorCategory {
        match status {
            429 => ErrorCategory::RateLimit,
            401 | 403 => ErrorCategory::Auth,
            408 => ErrorCategory::Network,
            // 500 series are transient - can retry
            500 | 502 | 503 | 504 => ErrorCategory::Transient,
            400 | 404 | 422 => ErrorCategory::Parse,
            _ => ErrorCategory::Unknown,
        }
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum CoachError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // -------------------------------------------------------------------------
    // Provider Errors
    // -------------------------------------------------------------------------
    /// Provider request failed with an HTTP status or transport problem
    #[error("Provider error from {provider}{}: {message}", status.map(|s| format!(" (status {s})")).unwrap_or_default())]
    Provider {
        provider: String,
        status: Option<u16>,
        message: String,
    },

    /// No usable text could be recovered from a completion response
    #[error("Extraction failed in {stage} stage: {message}")]
    Extraction { stage: String, message: String },

    /// Operation timeout with context
    #[error("Timeout after {duration:?}: {operation}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    #[error("Config error: {0}")]
    Config(String),

    #[error("Memory error: {0}")]
    Memory(String),

    #[error("Transcript error: {0}")]
    Transcript(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, CoachError>;

// =============================================================================
// Helper Functions
// =============================================================================

impl CoachError {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a provider error without an HTTP status
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            status: None,
            message: message.into(),
        }
    }

    /// Create a provider error carrying the HTTP status
    pub fn provider_status(
        provider: impl Into<String>,
        status: u16,
        message: impl Into<String>,
    ) -> Self {
        Self::Provider {
            provider: provider.into(),
            status: Some(status),
            message: message.into(),
        }
    }

    /// Create a stage extraction error
    pub fn extraction(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Extraction {
            stage: stage.into(),
            message: message.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Classify this error for retry routing
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Io(_) => ErrorCategory::Network,
            Self::Http(e) => {
                if e.is_timeout() || e.is_connect() {
                    ErrorCategory::Network
                } else if let Some(status) = e.status() {
                    ErrorClassifier::classify_status(status.as_u16())
                } else {
                    ErrorClassifier::classify(&e.to_string())
                }
            }
            Self::Provider {
                status, message, ..
            } => match status {
                Some(code) => {
                    let category = ErrorClassifier::classify_status(*code);
                    if category == ErrorCategory::Unknown {
                        ErrorClassifier::classify(message)
                    } else {
                        category
                    }
                }
                None => ErrorClassifier::classify(message),
            },
            Self::Timeout { .. } => ErrorCategory::Network,
            Self::Memory(_) => ErrorCategory::Transient,
            Self::Config(_) => ErrorCategory::Configuration,
            Self::Extraction { .. } => ErrorCategory::Extraction,
            Self::Json(_) | Self::Yaml(_) | Self::Parse(_) | Self::Transcript(_) => {
                ErrorCategory::Parse
            }
        }
    }

    /// Check if this error is worth retrying
    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }
}

// =============================================================================
// Tests
// =============================================================================
