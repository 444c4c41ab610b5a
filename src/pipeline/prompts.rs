//! Stage Prompts
//!
//! Builds the prompt for each pipeline stage.
//!
//! ## Design Principles
//!
//! 1. **Role first**: each stage opens with a coach persona so the model
//!    knows who the trainee is and what "good" looks like
//! 2. **Explicit template**: the requested output format is spelled out
//!    verbatim, headers and markup included, because the report parser
//!    targets exactly that shape
//! 3. **Textual hand-off**: a stage's prompt embeds the previous stage's
//!    raw output; no other channel exists between stages
//! 4. **Scenario enrichment**: product/persona/challenge context is
//!    appended when supplied, never required

use crate::report::CANONICAL_CATEGORIES;
use crate::types::ScenarioContext;

/// System prompt for the segmenter stage
pub const SEGMENTER_SYSTEM: &str = "You are an experienced sales and support coach reviewing a practice conversation. \
The participant labeled \"user\" is the trainee; every other speaker is the simulated customer. \
You analyze conversations phase by phase, always grounded in what was actually said.";

/// System prompt for the summarizer stage
pub const SUMMARIZER_SYSTEM: &str = "You are an experienced sales and support coach writing a performance report. \
You follow the requested report format exactly, never adding preamble before the first header.";

/// System prompt for the detail-annotator stage
pub const DETAIL_SYSTEM: &str = "You are an experienced sales and support coach annotating a practice conversation. \
You reproduce transcript lines verbatim and mark up notable phrases inline, following the requested markup exactly.";

/// Build the segmenter prompt: phase breakdown of the raw transcript.
pub fn build_segmenter_prompt(transcript: &str, scenario: Option<&ScenarioContext>) -> String {
    let mut prompt = String::new();

    prompt.push_str(&scenario_section(scenario));

    prompt.push_str("# Transcript\n\n");
    prompt.push_str(transcript);
    prompt.push_str("\n\n");

    prompt.push_str(
        r#"# Task

Break this conversation into 2-4 logical phases (for example: opening, discovery, objection handling, closing). For each phase:

1. Give the phase a short descriptive name
2. Summarize what happened in one or two sentences
3. Point out the pivotal moments, quoting the exact lines
4. Assess how the user handled the phase: what worked, what did not

Be specific and quote the transcript rather than generalizing.
"#,
    );

    prompt
}

/// Build the summarizer prompt: structured report over the phase breakdown.
pub fn build_summarizer_prompt(
    transcript: &str,
    segmented_analysis: &str,
    scenario: Option<&ScenarioContext>,
) -> String {
    let mut prompt = String::new();

    prompt.push_str(&scenario_section(scenario));

    prompt.push_str("# Transcript\n\n");
    prompt.push_str(transcript);
    prompt.push_str("\n\n");

    prompt.push_str("# Phase Breakdown\n\n");
    prompt.push_str(segmented_analysis);
    prompt.push_str("\n\n");

    prompt.push_str(
        r#"# Task

Write a performance report for the user based on the transcript and the phase breakdown. Use EXACTLY this format, with these headers, and nothing before the first header:

## CONVERSATION OVERVIEW
Two or three sentences describing how the conversation went and what the user was trying to achieve.

## USER PERFORMANCE ANALYSIS
What the user did well and where they struggled, grounded in concrete moments from the phase breakdown.

## RATING
"#,
    );
    prompt.push_str(&rating_template());
    prompt.push_str(
        r#"

## IMPROVEMENT RECOMMENDATIONS
Two or three concrete, actionable suggestions the user can apply in their next conversation.
"#,
    );

    prompt
}

/// Build the detail-annotator prompt: segment markup with inline phrase notes.
pub fn build_detail_prompt(
    transcript: &str,
    segmented_analysis: &str,
    summary_analysis: &str,
    scenario: Option<&ScenarioContext>,
) -> String {
    let mut prompt = String::new();

    prompt.push_str(&scenario_section(scenario));

    prompt.push_str("# Transcript\n\n");
    prompt.push_str(transcript);
    prompt.push_str("\n\n");

    prompt.push_str("# Phase Breakdown\n\n");
    prompt.push_str(segmented_analysis);
    prompt.push_str("\n\n");

    prompt.push_str("# Performance Report\n\n");
    prompt.push_str(summary_analysis);
    prompt.push_str("\n\n");

    prompt.push_str(
        r#"# Task

Rewrite the transcript as 2-4 annotated segments. Segment boundaries should follow the phase breakdown.

Wrap each segment in matched tags whose titles are IDENTICAL in the open and close tag:

<segment:TITLE>
transcript lines for this phase, reproduced verbatim
</segment:TITLE>

Inside each segment, annotate notable phrases inline as [exact phrase](color: short feedback), where color is one of:
- red: a mistake that hurt the conversation
- yellow: acceptable but could be better
- green: done well, worth repeating

Keep every speaker label and every line otherwise unchanged. Do not add commentary outside the segment tags.
"#,
    );

    prompt
}

// One `- Category: <integer 0-100>` line per canonical category, so the
// requested table and the score extractor stay in lockstep.
fn rating_template() -> String {
    CANONICAL_CATEGORIES
        .iter()
        .map(|category| format!("- {category}: <integer 0-100>"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn scenario_section(scenario: Option<&ScenarioContext>) -> String {
    let Some(context) = scenario else {
        return String::new();
    };
    if context.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("# Scenario Context\n\n");
    if let Some(product) = context.product_description.as_deref() {
        section.push_str(&format!("**Product**: {product}\n"));
    }
    if let Some(persona) = context.customer_persona.as_deref() {
        section.push_str(&format!("**Customer persona**: {persona}\n"));
    }
    if let Some(challenge) = context.challenge.as_deref() {
        section.push_str(&format!("**Challenge**: {challenge}\n"));
    }
    section.push('\n');
    section
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRANSCRIPT: &str = "user: Hi\ncustomer: Hello";

    fn scenario() -> ScenarioContext {
        ScenarioContext {
            product_description: Some("CRM software".to_string()),
            customer_persona: Some("Skeptical IT manager".to_string()),
            challenge: Some("Budget was cut last quarter".to_string()),
        }
    }

    #[test]
    fn test_segmenter_prompt_embeds_transcript() {
        let prompt = build_segmenter_prompt(TRANSCRIPT, None);
        assert!(prompt.contains("user: Hi"));
        assert!(prompt.contains("2-4 logical phases"));
        assert!(!prompt.contains("Scenario Context"));
    }

    #[test]
    fn test_summarizer_prompt_requests_every_header() {
        let prompt = build_summarizer_prompt(TRANSCRIPT, "phase breakdown text", None);
        assert!(prompt.contains("## CONVERSATION OVERVIEW"));
        assert!(prompt.contains("## USER PERFORMANCE ANALYSIS"));
        assert!(prompt.contains("## RATING"));
        assert!(prompt.contains("## IMPROVEMENT RECOMMENDATIONS"));
        assert!(prompt.contains("phase breakdown text"));
    }

    #[test]
    fn test_summarizer_prompt_lists_canonical_categories() {
        let prompt = build_summarizer_prompt(TRANSCRIPT, "analysis", None);
        for category in CANONICAL_CATEGORIES {
            assert!(prompt.contains(&format!("- {category}:")));
        }
    }

    #[test]
    fn test_detail_prompt_embeds_both_upstream_outputs() {
        let prompt = build_detail_prompt(TRANSCRIPT, "the phases", "the summary", None);
        assert!(prompt.contains("the phases"));
        assert!(prompt.contains("the summary"));
        assert!(prompt.contains("<segment:TITLE>"));
        assert!(prompt.contains("(color: short feedback)"));
    }

    #[test]
    fn test_scenario_context_included_when_present() {
        let context = scenario();
        let prompt = build_segmenter_prompt(TRANSCRIPT, Some(&context));
        assert!(prompt.contains("# Scenario Context"));
        assert!(prompt.contains("CRM software"));
        assert!(prompt.contains("Skeptical IT manager"));
        assert!(prompt.contains("Budget was cut last quarter"));
    }

    #[test]
    fn test_empty_scenario_omitted() {
        let context = ScenarioContext::default();
        let prompt = build_segmenter_prompt(TRANSCRIPT, Some(&context));
        assert!(!prompt.contains("Scenario Context"));
    }
}
