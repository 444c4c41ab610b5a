//! LLM Integration Layer
//!
//! Completion providers, resilient call wrapping, and token budgeting for
//! the feedback pipeline stages.

pub mod provider;
pub mod retry;
pub mod tokens;

pub use provider::{
    ChatMessage, ChatRole, CompletionEnvelope, CompletionProvider, OpenAiProvider, ProviderConfig,
    SharedProvider, create_provider, extract_text,
};
pub use retry::{RetryPolicy, is_transient, retry_with_backoff};
pub use tokens::{TokenCap, estimate_tokens};
