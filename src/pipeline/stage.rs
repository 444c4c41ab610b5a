//! Stage Policies
//!
//! Each pipeline stage carries its own retry budget, output-token cap,
//! system prompt, and memory sub-thread suffix. The orchestrator asks
//! [`StageKind`] for all of these, so stage behavior is tuned in one place.

use std::fmt;
use std::time::Duration;

use crate::constants::{retry as retry_constants, stage as stage_constants};
use crate::llm::{RetryPolicy, TokenCap};

use super::prompts;

/// The three pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    /// Breaks the transcript into analyzed phases
    Segmenter,
    /// Writes the structured performance report
    Summarizer,
    /// Re-renders the transcript as annotated segments
    DetailAnnotator,
}

impl StageKind {
    /// All stages in execution order
    pub const ALL: [StageKind; 3] = [Self::Segmenter, Self::Summarizer, Self::DetailAnnotator];

    /// Stage name used in logs and extraction errors
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Segmenter => "segmenter",
            Self::Summarizer => "summarizer",
            Self::DetailAnnotator => "detail_annotator",
        }
    }

    /// Suffix appended to the base thread id for this stage's sub-thread
    pub fn memory_suffix(&self) -> &'static str {
        match self {
            Self::Segmenter => "analyzer",
            Self::Summarizer => "summary",
            Self::DetailAnnotator => "detail",
        }
    }

    /// Output-token cap policy for this stage
    pub fn token_cap(&self) -> TokenCap {
        match self {
            Self::Segmenter => TokenCap::new(
                stage_constants::SEGMENTER_MULTIPLIER,
                stage_constants::SEGMENTER_FLOOR,
                stage_constants::SEGMENTER_CEILING,
            ),
            Self::Summarizer => TokenCap::new(
                stage_constants::SUMMARY_MULTIPLIER,
                stage_constants::SUMMARY_FLOOR,
                stage_constants::SUMMARY_CEILING,
            ),
            Self::DetailAnnotator => TokenCap::new(
                stage_constants::DETAIL_MULTIPLIER,
                stage_constants::DETAIL_FLOOR,
                stage_constants::DETAIL_CEILING,
            ),
        }
    }

    /// Retry budget; the detail stage sends the largest prompts and gets a
    /// larger backoff ceiling
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            Self::DetailAnnotator => RetryPolicy::default()
                .with_max_delay(Duration::from_millis(retry_constants::DETAIL_MAX_DELAY_MS)),
            _ => RetryPolicy::default(),
        }
    }

    /// System prompt establishing the stage persona
    pub fn system_prompt(&self) -> &'static str {
        match self {
            Self::Segmenter => prompts::SEGMENTER_SYSTEM,
            Self::Summarizer => prompts::SUMMARIZER_SYSTEM,
            Self::DetailAnnotator => prompts::DETAIL_SYSTEM,
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
