//! repcoach - AI Coaching Feedback for Sales and Support Conversations
//!
//! Turns a raw conversation transcript into structured coaching feedback by
//! running three sequential LLM stages and parsing their output into a
//! typed report.
//!
//! ## Core Features
//!
//! - **Three-Stage Pipeline**: segmenter, summarizer, and detail annotator,
//!   each with its own token cap and retry budget
//! - **Conversation Memory**: per-stage sub-threads recall recent context
//!   and record each exchange, best-effort
//! - **Resilient Calls**: exponential backoff with deterministic delays for
//!   transient provider failures
//! - **Infallible Report Parsing**: layered fallbacks degrade missing
//!   sections instead of failing
//!
//! ## Quick Start
//!
//! ```ignore
//! use repcoach::{AnalysisRequest, FeedbackPipeline, create_provider, report};
//!
//! let provider = create_provider(&config.llm.provider_config())?;
//! let pipeline = FeedbackPipeline::new(provider);
//! let bundle = pipeline.run(&AnalysisRequest::new(transcript)).await?;
//! let parsed = report::parse(&bundle.summary_analysis, &bundle.detailed_feedback);
//! ```
//!
//! ## Modules
//!
//! - [`llm`]: provider abstraction, retry wrapper, token estimation
//! - [`pipeline`]: stage orchestration and prompt construction
//! - [`report`]: report parsing, segment extraction, score extraction
//! - [`memory`]: conversation memory traits and in-memory store
//! - [`config`]: layered configuration loading

pub mod cli;
pub mod config;
pub mod constants;
pub mod llm;
pub mod memory;
pub mod pipeline;
pub mod report;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader, LlmConfig, PipelineConfig};

// Error Types
pub use types::error::{CoachError, ErrorCategory, ErrorClassifier, Result};

// Domain Types
pub use types::{ScenarioContext, ThreadId, Transcript, Turn};

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use pipeline::{
    AnalysisRequest, FeedbackBundle, FeedbackPipeline, PipelineSettings, StageKind,
};

// =============================================================================
// LLM Re-exports
// =============================================================================

pub use llm::{
    // Providers
    ChatMessage,
    ChatRole,
    CompletionProvider,
    OpenAiProvider,
    ProviderConfig,
    // Retry
    RetryPolicy,
    SharedProvider,
    // Tokens
    TokenCap,
    create_provider,
    estimate_tokens,
    retry_with_backoff,
};

// =============================================================================
// Report Re-exports
// =============================================================================

pub use report::{ParsedReport, ScoreEntry, Segment, extract_scores, parse};

// =============================================================================
// Memory Re-exports
// =============================================================================

pub use memory::{ConversationMemory, InMemoryStore, MemoryMessage, SharedMemory};
