//! Report Parsing
//!
//! Turns the pipeline's free-form LLM output into a typed [`ParsedReport`].
//!
//! ## Design
//!
//! Parsing never fails: the summarizer is asked for a fixed set of `##`
//! headers and the annotator for segment markup, but neither is reliable, so
//! every extraction degrades instead of erroring. Missing sections fall back
//! to a raw-text prefix, missing scores fall back to the canonical default
//! table, and missing segments yield an empty list. Given the same input
//! text, the output is always identical.
//!
//! ## Components
//!
//! - `categories`: the canonical scoring rubric and alias normalization
//! - `scores`: `## RATING` block mining, shared by display and persistence
//! - `segments`: ordered fallback strategies over segment markup

pub mod categories;
pub mod scores;
pub mod segments;

pub use categories::{CANONICAL_CATEGORIES, canonical_name, normalize_key};
pub use scores::{ScoreEntry, extract_scores};
pub use segments::{
    Segment, SegmentExtraction, SegmentStrategy, emphasize_speaker_labels, extract_segments,
};

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::debug;

use crate::constants::report as report_constants;

static OVERVIEW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^[ \t]*#{2,}[ \t]*conversation[ \t]+overview\b[^\n]*$")
        .expect("Invalid regex")
});

static PERFORMANCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^[ \t]*#{2,}[ \t]*user[ \t]+performance[ \t]+analysis\b[^\n]*$")
        .expect("Invalid regex")
});

static RECOMMENDATIONS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^[ \t]*#{2,}[ \t]*improvement[ \t]+recommendations\b[^\n]*$")
        .expect("Invalid regex")
});

static ANY_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*#{2,}").expect("Invalid regex"));

/// Typed view of one pipeline run's report text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedReport {
    /// Conversation overview, or a raw-text prefix when the header is absent
    pub summary: String,
    /// Performance narrative, or a raw-text prefix when the header is absent
    pub feedback: String,
    /// Improvement recommendations; falls back to the raw prefix when the
    /// text carries no headers at all, None when other sections exist
    pub suggestions: Option<String>,
    /// Annotated transcript segments, speaker labels emphasized
    pub segments: Vec<Segment>,
    /// Full canonical rubric plus any extra categories the model invented
    pub scores: Vec<ScoreEntry>,
}

/// Parse the summarizer and detail-annotator outputs into a report.
///
/// Pure and infallible: malformed input degrades field by field, it never
/// returns an error.
pub fn parse(summary_text: &str, detail_text: &str) -> ParsedReport {
    let summary = section_or_fallback(summary_text, &OVERVIEW_RE, "overview");
    let feedback = section_or_fallback(summary_text, &PERFORMANCE_RE, "performance");
    // With no headers anywhere, suggestions carries the raw prefix like the
    // other string fields; with headers present, a missing recommendations
    // section stays None.
    let suggestions = match section_after(summary_text, &RECOMMENDATIONS_RE) {
        Some(body) if !body.is_empty() => Some(body.to_string()),
        _ if ANY_HEADER_RE.is_match(summary_text) => None,
        _ => Some(fallback_prefix(summary_text)).filter(|prefix| !prefix.is_empty()),
    };

    let segments = extract_segments(detail_text)
        .segments
        .into_iter()
        .map(|segment| Segment {
            content: emphasize_speaker_labels(&segment.content),
            title: segment.title,
        })
        .collect();

    let scores = complete_scores(extract_scores(summary_text).unwrap_or_default());

    ParsedReport {
        summary,
        feedback,
        suggestions,
        segments,
        scores,
    }
}

/// Slice the text between `header` and the next `##` header (or end of text).
pub(crate) fn section_after<'a>(text: &'a str, header: &Regex) -> Option<&'a str> {
    let found = header.find(text)?;
    let rest = &text[found.end()..];
    let end = ANY_HEADER_RE.find(rest).map_or(rest.len(), |m| m.start());
    Some(rest[..end].trim())
}

fn section_or_fallback(text: &str, header: &Regex, label: &str) -> String {
    match section_after(text, header) {
        Some(body) if !body.is_empty() => body.to_string(),
        _ => {
            debug!(section = label, "Header missing or empty, using raw prefix");
            fallback_prefix(text)
        }
    }
}

// Text before the first header, or a truncated prefix of the whole blob when
// the text opens with a header. Keeps the UI non-empty no matter what shape
// the model produced.
fn fallback_prefix(text: &str) -> String {
    let before = ANY_HEADER_RE.find(text).map_or(text, |m| &text[..m.start()]);
    let trimmed = before.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    text.trim()
        .chars()
        .take(report_constants::FALLBACK_PREFIX_CHARS)
        .collect()
}

// Overlay extracted scores onto the canonical rubric, then append categories
// the rubric does not know about. Result order: canonical first, extras in
// extraction order.
fn complete_scores(extracted: Vec<ScoreEntry>) -> Vec<ScoreEntry> {
    let mut completed: Vec<ScoreEntry> = CANONICAL_CATEGORIES
        .iter()
        .map(|&category| {
            let score = extracted
                .iter()
                .find(|entry| entry.category == category)
                .map_or(report_constants::DEFAULT_SCORE, |entry| entry.score);
            ScoreEntry::new(category, score)
        })
        .collect();

    for entry in extracted {
        if !CANONICAL_CATEGORIES.contains(&entry.category.as_str()) {
            completed.push(entry);
        }
    }

    completed
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED_SUMMARY: &str = "\
## CONVERSATION OVERVIEW
The user opened warmly and asked for a product demo.

## USER PERFORMANCE ANALYSIS
Good rapport early on, but the close felt rushed.

## RATING
- Empathy: 70
- Clarity: 65
- Open-Mindedness: 40

## IMPROVEMENT RECOMMENDATIONS
Slow down before proposing next steps.";

    #[test]
    fn test_well_formed_report() {
        let detail = "<segment:Opening>user: hi, I wanted a demo</segment:Opening>";
        let report = parse(WELL_FORMED_SUMMARY, detail);

        assert_eq!(
            report.summary,
            "The user opened warmly and asked for a product demo."
        );
        assert_eq!(
            report.feedback,
            "Good rapport early on, but the close felt rushed."
        );
        assert_eq!(
            report.suggestions.as_deref(),
            Some("Slow down before proposing next steps.")
        );
        assert_eq!(report.segments.len(), 1);
        assert_eq!(report.segments[0].title, "Opening");
    }

    #[test]
    fn test_headerless_text_falls_back_to_prefix() {
        let report = parse("Just some plain prose about the call.", "");
        assert_eq!(report.summary, "Just some plain prose about the call.");
        assert_eq!(report.feedback, "Just some plain prose about the call.");
        assert_eq!(
            report.suggestions.as_deref(),
            Some("Just some plain prose about the call.")
        );
        assert!(report.segments.is_empty());
    }

    #[test]
    fn test_suggestions_none_when_other_sections_exist() {
        let text = "## CONVERSATION OVERVIEW\nWent fine.\n## RATING\n- Empathy: 70";
        let report = parse(text, "");
        assert_eq!(report.suggestions, None);
    }

    #[test]
    fn test_fallback_prefix_is_truncated() {
        let long = "x".repeat(2_000);
        let report = parse(&long, "");
        assert_eq!(
            report.summary.chars().count(),
            report_constants::FALLBACK_PREFIX_CHARS
        );
    }

    #[test]
    fn test_text_opening_with_header_uses_truncated_whole() {
        let text = "## RATING\n- Empathy: 70";
        let report = parse(text, "");
        assert!(report.summary.starts_with("## RATING"));
    }

    #[test]
    fn test_empty_section_body_falls_back() {
        let text = "preamble text\n## CONVERSATION OVERVIEW\n## RATING\n- Empathy: 70";
        let report = parse(text, "");
        assert_eq!(report.summary, "preamble text");
    }

    #[test]
    fn test_scores_complete_the_canonical_table() {
        let report = parse("## RATING\n- Empathy: 70", "");
        assert_eq!(report.scores.len(), CANONICAL_CATEGORIES.len());
        assert_eq!(report.scores[0], ScoreEntry::new("Empathy", 70));
        for entry in &report.scores[1..] {
            assert_eq!(entry.score, report_constants::DEFAULT_SCORE);
        }
    }

    #[test]
    fn test_scores_default_table_when_no_rating_block() {
        let report = parse("no ratings here", "");
        assert_eq!(report.scores.len(), CANONICAL_CATEGORIES.len());
        assert!(
            report
                .scores
                .iter()
                .all(|entry| entry.score == report_constants::DEFAULT_SCORE)
        );
    }

    #[test]
    fn test_alias_folds_onto_canonical_slot() {
        let report = parse(WELL_FORMED_SUMMARY, "");
        let flexibility = report
            .scores
            .iter()
            .find(|entry| entry.category == "Flexibility")
            .unwrap();
        assert_eq!(flexibility.score, 40);
        assert_eq!(report.scores.len(), CANONICAL_CATEGORIES.len());
    }

    #[test]
    fn test_unknown_category_appended_after_canonical() {
        let report = parse("## RATING\n- Rapport: 80", "");
        assert_eq!(report.scores.len(), CANONICAL_CATEGORIES.len() + 1);
        assert_eq!(
            report.scores.last(),
            Some(&ScoreEntry::new("Rapport", 80))
        );
    }

    #[test]
    fn test_segment_speaker_labels_emphasized() {
        let detail = "<segment:Opening>user: hi there, looking for help</segment:Opening>";
        let report = parse("", detail);
        assert_eq!(
            report.segments[0].content,
            "**User:** hi there, looking for help"
        );
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: parsing is total and deterministic
            #[test]
            fn parse_is_deterministic(summary in ".*", detail in ".*") {
                let first = parse(&summary, &detail);
                let second = parse(&summary, &detail);
                prop_assert_eq!(first, second);
            }

            /// Property: non-whitespace input always yields a non-empty summary
            #[test]
            fn summary_never_empty_for_real_input(text in ".*[^\\s].*") {
                let report = parse(&text, "");
                prop_assert!(!report.summary.is_empty());
            }

            /// Property: the canonical rubric is always fully populated
            #[test]
            fn scores_cover_canonical_rubric(summary in ".*", detail in ".*") {
                let report = parse(&summary, &detail);
                prop_assert!(report.scores.len() >= CANONICAL_CATEGORIES.len());
                for category in CANONICAL_CATEGORIES {
                    prop_assert!(report.scores.iter().any(|e| e.category == category));
                }
            }

            /// Property: every score stays within the rating scale
            #[test]
            fn scores_stay_in_range(summary in ".*") {
                let report = parse(&summary, "");
                for entry in &report.scores {
                    prop_assert!(entry.score <= report_constants::MAX_SCORE);
                }
            }
        }
    }
}
