//! Feedback Pipeline
//!
//! Orchestrates the three-stage coaching analysis over one conversation
//! transcript.
//!
//! ## Pipeline Flow
//!
//! 1. **Segmenter**: breaks the transcript into analyzed phases
//! 2. **Summarizer**: writes the structured performance report from the
//!    transcript plus the phase breakdown
//! 3. **Detail-Annotator**: re-renders the transcript as annotated segments,
//!    guided by both earlier outputs
//!
//! Stages are strictly sequential: each stage's prompt embeds the previous
//! stage's raw output, so no stage can start before its dependency resolves.
//! A stage failure aborts the run; there is no partial continuation.
//!
//! ## Memory Threading
//!
//! When a thread id and resource id are both supplied, each stage recalls
//! from and appends to its own sub-thread (`<thread>_analyzer`,
//! `<thread>_summary`, `<thread>_detail`), giving the model continuity
//! across repeated runs against the same conversation. Memory failures
//! degrade to a cold run; they never abort the pipeline.

pub mod prompts;
pub mod stage;

pub use stage::StageKind;

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::constants::memory as memory_constants;
use crate::llm::{
    ChatMessage, ChatRole, RetryPolicy, SharedProvider, is_transient, retry_with_backoff,
};
use crate::memory::SharedMemory;
use crate::types::{CoachError, Result, ScenarioContext, ThreadId};

// =============================================================================
// Request / Response Types
// =============================================================================

/// One conversation to analyze
#[derive(Debug, Clone, Default)]
pub struct AnalysisRequest {
    /// Raw transcript, one `speaker: utterance` turn per line
    pub transcript: String,
    /// Optional training-scenario context for prompt enrichment
    pub scenario: Option<ScenarioContext>,
    /// Base thread id for memory continuity
    pub thread_id: Option<String>,
    /// Resource (user/session) owning the thread
    pub resource_id: Option<String>,
}

impl AnalysisRequest {
    pub fn new(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            ..Self::default()
        }
    }

    pub fn with_scenario(mut self, scenario: ScenarioContext) -> Self {
        self.scenario = Some(scenario);
        self
    }

    pub fn with_thread(
        mut self,
        resource_id: impl Into<String>,
        thread_id: impl Into<String>,
    ) -> Self {
        self.resource_id = Some(resource_id.into());
        self.thread_id = Some(thread_id.into());
        self
    }
}

/// Raw text outputs of one pipeline run
///
/// All four fields are always present on success. Downstream code runs the
/// report parser and score extractor over these independently.
#[derive(Debug, Clone, Serialize)]
pub struct FeedbackBundle {
    /// Segmenter output: phase breakdown
    pub segmented_analysis: String,
    /// Summarizer output: structured performance report
    pub summary_analysis: String,
    /// Detail-annotator output: annotated transcript segments
    pub detailed_feedback: String,
    /// `summary_analysis` and `detailed_feedback` joined by a blank line
    pub combined_report: String,
}

/// Tunable pipeline behavior
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// How many prior messages each stage recalls from its sub-thread
    pub recall_limit: usize,
    /// Overrides every stage's retry budget when set
    pub retry_override: Option<RetryPolicy>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            recall_limit: memory_constants::RECALL_LIMIT,
            retry_override: None,
        }
    }
}

// Memory engages only when the request carries both ids.
#[derive(Debug, Clone)]
struct ThreadBinding {
    resource_id: String,
    thread_id: ThreadId,
}

impl ThreadBinding {
    fn from_request(request: &AnalysisRequest) -> Option<Self> {
        let thread_id = request.thread_id.as_deref()?.trim();
        let resource_id = request.resource_id.as_deref()?.trim();
        if thread_id.is_empty() || resource_id.is_empty() {
            return None;
        }
        Some(Self {
            resource_id: resource_id.to_string(),
            thread_id: ThreadId::new(thread_id),
        })
    }
}

// =============================================================================
// Pipeline
// =============================================================================

/// Three-stage coaching feedback pipeline
pub struct FeedbackPipeline {
    provider: SharedProvider,
    memory: Option<SharedMemory>,
    settings: PipelineSettings,
}

impl FeedbackPipeline {
    pub fn new(provider: SharedProvider) -> Self {
        Self {
            provider,
            memory: None,
            settings: PipelineSettings::default(),
        }
    }

    pub fn with_memory(mut self, memory: SharedMemory) -> Self {
        self.memory = Some(memory);
        self
    }

    pub fn with_settings(mut self, settings: PipelineSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Run all three stages over the request's transcript.
    ///
    /// Each run gets its own id so stage events from concurrent runs can be
    /// told apart in the logs.
    #[instrument(
        skip_all,
        fields(
            run_id = %uuid::Uuid::new_v4(),
            transcript_chars = request.transcript.len(),
        )
    )]
    pub async fn run(&self, request: &AnalysisRequest) -> Result<FeedbackBundle> {
        let binding = ThreadBinding::from_request(request);
        if let (Some(memory), Some(bound)) = (self.memory.as_ref(), binding.as_ref()) {
            if let Err(error) = memory
                .ensure_thread(&bound.resource_id, bound.thread_id.as_str())
                .await
            {
                warn!(error = %error, "Failed to ensure memory thread, running without continuity");
            }
        }

        let started = Instant::now();
        let scenario = request.scenario.as_ref();

        let segmented_analysis = self
            .run_stage(
                StageKind::Segmenter,
                prompts::build_segmenter_prompt(&request.transcript, scenario),
                binding.as_ref(),
            )
            .await?;

        let summary_analysis = self
            .run_stage(
                StageKind::Summarizer,
                prompts::build_summarizer_prompt(
                    &request.transcript,
                    &segmented_analysis,
                    scenario,
                ),
                binding.as_ref(),
            )
            .await?;

        let detailed_feedback = self
            .run_stage(
                StageKind::DetailAnnotator,
                prompts::build_detail_prompt(
                    &request.transcript,
                    &segmented_analysis,
                    &summary_analysis,
                    scenario,
                ),
                binding.as_ref(),
            )
            .await?;

        let combined_report = format!("{summary_analysis}\n\n{detailed_feedback}");

        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Feedback pipeline completed"
        );

        Ok(FeedbackBundle {
            segmented_analysis,
            summary_analysis,
            detailed_feedback,
            combined_report,
        })
    }

    // One stage: recall history, invoke the provider under the stage's retry
    // budget and token cap, then persist the exchange. Memory steps warn and
    // continue; completion failures abort with the stage's name attached.
    async fn run_stage(
        &self,
        kind: StageKind,
        prompt: String,
        binding: Option<&ThreadBinding>,
    ) -> Result<String> {
        let started = Instant::now();
        let cap = kind.token_cap().for_input(&prompt);
        let policy = self
            .settings
            .retry_override
            .unwrap_or_else(|| kind.retry_policy());

        let mut messages = vec![ChatMessage::system(kind.system_prompt())];

        let sub_thread = binding.map(|bound| bound.thread_id.sub_thread(kind.memory_suffix()));
        if let (Some(memory), Some(sub_thread)) = (self.memory.as_ref(), sub_thread.as_deref()) {
            match memory.last_messages(sub_thread, self.settings.recall_limit).await {
                Ok(history) => {
                    messages.extend(history.into_iter().map(|message| ChatMessage {
                        role: message.role,
                        content: message.content,
                    }));
                }
                Err(error) => {
                    warn!(stage = kind.as_str(), error = %error, "Failed to recall stage history");
                }
            }
        }
        messages.push(ChatMessage::user(&prompt));

        debug!(
            stage = kind.as_str(),
            max_tokens = cap,
            messages = messages.len(),
            "Invoking stage"
        );

        let provider = Arc::clone(&self.provider);
        let outcome = retry_with_backoff(&policy, kind.as_str(), is_transient, || {
            let provider = Arc::clone(&provider);
            let messages = messages.clone();
            async move { provider.complete(&messages, cap, None).await }
        })
        .await;

        let text = match outcome {
            Ok(text) => text,
            Err(CoachError::Extraction { message, .. }) => {
                return Err(CoachError::extraction(kind.as_str(), message));
            }
            Err(error) => return Err(error),
        };

        if text.trim().is_empty() {
            return Err(CoachError::extraction(
                kind.as_str(),
                "stage returned empty text",
            ));
        }

        if let (Some(memory), Some(sub_thread)) = (self.memory.as_ref(), sub_thread.as_deref()) {
            if let Err(error) = memory.append_message(sub_thread, ChatRole::User, &prompt).await {
                warn!(stage = kind.as_str(), error = %error, "Failed to persist stage prompt");
            }
            if let Err(error) = memory
                .append_message(sub_thread, ChatRole::Assistant, &text)
                .await
            {
                warn!(stage = kind.as_str(), error = %error, "Failed to persist stage response");
            }
        }

        debug!(
            stage = kind.as_str(),
            chars = text.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Stage completed"
        );

        Ok(text)
    }
}
