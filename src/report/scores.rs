//! Score Extraction
//!
//! Mines the `## RATING` block of a summary report for `- Category: <integer>`
//! lines. Lines matching the pattern always produce an entry: known aliases
//! fold onto the canonical rubric, unknown categories pass through as written.
//! Anything else in the block is ignored.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::debug;

use super::categories::canonical_name;
use super::section_after;
use crate::constants::report as report_constants;

static RATING_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^[ \t]*#{2,}[ \t]*rating\b[^\n]*$").expect("Invalid regex")
});

static RATING_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:[-*•][ \t]*)?([^:\n]+?)[ \t]*:[ \t]*(-?\d+)[ \t]*(?:/[ \t]*100)?[ \t]*$")
        .expect("Invalid regex")
});

/// One category score mined from a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub category: String,
    pub score: u8,
}

impl ScoreEntry {
    pub fn new(category: impl Into<String>, score: u8) -> Self {
        Self {
            category: category.into(),
            score,
        }
    }
}

/// Extract the ratings table from free-form report text.
///
/// Returns `None` when the `## RATING` header is absent or its block yields
/// no score lines. Scores are clamped into [0, 100]; duplicate categories
/// keep their first occurrence.
pub fn extract_scores(text: &str) -> Option<Vec<ScoreEntry>> {
    let block = section_after(text, &RATING_HEADER_RE)?;

    let mut entries: Vec<ScoreEntry> = Vec::new();
    for caps in RATING_LINE_RE.captures_iter(block) {
        let (Some(raw_category), Some(raw_score)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let Some(display) = clean_category(raw_category.as_str()) else {
            continue;
        };
        let Ok(value) = raw_score.as_str().parse::<i64>() else {
            continue;
        };

        let score = value.clamp(0, i64::from(report_constants::MAX_SCORE)) as u8;
        let category = canonical_name(&display)
            .map(str::to_string)
            .unwrap_or(display);

        if entries.iter().any(|e| e.category == category) {
            continue;
        }
        entries.push(ScoreEntry { category, score });
    }

    if entries.is_empty() {
        debug!("Rating block yielded no score lines");
        None
    } else {
        Some(entries)
    }
}

/// Strip markdown decoration and reject tokens that are not word phrases
fn clean_category(raw: &str) -> Option<String> {
    let cleaned = raw
        .trim()
        .trim_matches(|c| c == '*' || c == '`' || c == '_')
        .trim();

    if !cleaned.chars().next()?.is_alphabetic() {
        return None;
    }
    let wordlike = cleaned
        .chars()
        .all(|c| c.is_alphanumeric() || c.is_whitespace() || matches!(c, '-' | '_' | '/' | '\''));
    if !wordlike {
        return None;
    }
    Some(cleaned.to_string())
}
