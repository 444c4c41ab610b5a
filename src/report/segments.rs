//! Segment Extraction
//!
//! Pulls titled transcript segments out of the detail-annotator's output.
//! The model is asked for matched `<segment:TITLE>...</segment:TITLE>` pairs
//! but drifts, so extraction walks an ordered list of strategies from
//! strictest to loosest and stops at the first that yields a segment. The
//! order matters: malformed tag markup must be claimed by a tag strategy
//! before the plain-text fallback can misread it.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::debug;

use crate::constants::report as report_constants;

static OPEN_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<segment:([^>\n]+)>").expect("Invalid regex"));

static LENIENT_PAIR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<segment:([^>\n]+)>(.*?)</segment:[^>]*>").expect("Invalid regex")
});

static BARE_PAIR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<segment:([^>\n]+)>(.*?)</segment>").expect("Invalid regex")
});

static PLAIN_HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^[ \t]*segment[ \t]*:[ \t]*(.+?)[ \t]*$").expect("Invalid regex")
});

static SPEAKER_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^([A-Za-z][A-Za-z0-9_'-]*):").expect("Invalid regex"));

/// One titled slice of the annotated transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub title: String,
    pub content: String,
}

impl Segment {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

/// Which extraction strategy produced the segments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentStrategy {
    /// `<segment:T>...</segment:T>` with identical open/close titles
    TaggedMatched,
    /// Close tag carries a title but it need not match the open tag
    TaggedLenient,
    /// Generic untitled close tag `</segment>`
    TaggedBare,
    /// `Segment: TITLE` heading lines with content up to the next heading
    PlainHeading,
}

impl SegmentStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TaggedMatched => "tagged_matched",
            Self::TaggedLenient => "tagged_lenient",
            Self::TaggedBare => "tagged_bare",
            Self::PlainHeading => "plain_heading",
        }
    }
}

/// Segments plus the strategy that found them (`None` when all missed)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentExtraction {
    pub segments: Vec<Segment>,
    pub strategy: Option<SegmentStrategy>,
}

/// Try each strategy in order and return the first non-empty result.
pub fn extract_segments(text: &str) -> SegmentExtraction {
    const STRATEGIES: [(SegmentStrategy, fn(&str) -> Vec<Segment>); 4] = [
        (SegmentStrategy::TaggedMatched, tagged_matched),
        (SegmentStrategy::TaggedLenient, tagged_lenient),
        (SegmentStrategy::TaggedBare, tagged_bare),
        (SegmentStrategy::PlainHeading, plain_heading),
    ];

    for (strategy, extract) in STRATEGIES {
        let segments = extract(text);
        if !segments.is_empty() {
            debug!(
                strategy = strategy.as_str(),
                count = segments.len(),
                "Extracted transcript segments"
            );
            return SegmentExtraction {
                segments,
                strategy: Some(strategy),
            };
        }
    }

    debug!("No transcript segments found in detail text");
    SegmentExtraction {
        segments: Vec::new(),
        strategy: None,
    }
}

/// Bold and capitalize `word:` speaker labels at line starts.
///
/// Cosmetic only: `user: hello` becomes `**User:** hello`. Lines already
/// wrapped in bold markers start with `*` and are left untouched.
pub fn emphasize_speaker_labels(text: &str) -> String {
    SPEAKER_LINE_RE
        .replace_all(text, |caps: &regex::Captures<'_>| {
            format!("**{}:**", capitalize(&caps[1]))
        })
        .into_owned()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// Strategy 1: open/close titles must be identical. A close tag is located by
// exact string search on the captured title; an unclosed open tag is skipped
// and scanning resumes, so one malformed pair cannot swallow the rest.
fn tagged_matched(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut cursor = 0;

    while let Some(caps) = OPEN_TAG_RE.captures(&text[cursor..]) {
        let (Some(full), Some(title)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        let body_start = cursor + full.end();
        let close = format!("</segment:{}>", title.as_str());

        match text[body_start..].find(&close) {
            Some(rel) => {
                segments.push(Segment::new(
                    title.as_str().trim(),
                    text[body_start..body_start + rel].trim(),
                ));
                cursor = body_start + rel + close.len();
            }
            None => {
                cursor = body_start;
            }
        }
    }

    segments
}

// Strategy 2: any titled close tag ends the segment.
fn tagged_lenient(text: &str) -> Vec<Segment> {
    LENIENT_PAIR_RE
        .captures_iter(text)
        .map(|caps| Segment::new(caps[1].trim(), caps[2].trim()))
        .collect()
}

// Strategy 3: untitled close tag.
fn tagged_bare(text: &str) -> Vec<Segment> {
    BARE_PAIR_RE
        .captures_iter(text)
        .map(|caps| Segment::new(caps[1].trim(), caps[2].trim()))
        .collect()
}

// Strategy 4: `Segment: TITLE` heading lines. Content runs to the next
// heading or end of text; stubs shorter than the noise threshold are dropped.
fn plain_heading(text: &str) -> Vec<Segment> {
    let headings: Vec<(usize, usize, String)> = PLAIN_HEADING_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let (full, title) = (caps.get(0)?, caps.get(1)?);
            Some((full.start(), full.end(), title.as_str().to_string()))
        })
        .collect();

    let mut segments = Vec::new();
    for (index, (_, body_start, title)) in headings.iter().enumerate() {
        let body_end = headings
            .get(index + 1)
            .map(|next| next.0)
            .unwrap_or(text.len());
        let content = text[*body_start..body_end].trim();
        if content.chars().count() >= report_constants::MIN_SEGMENT_CONTENT_CHARS {
            segments.push(Segment::new(title.as_str(), content));
        }
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matched_tags_extracted() {
        let text = "<segment:Opening>user: hi there</segment:Opening>\n\
                    <segment:Closing>customer: bye now</segment:Closing>";
        let extraction = extract_segments(text);
        assert_eq!(extraction.strategy, Some(SegmentStrategy::TaggedMatched));
        assert_eq!(extraction.segments.len(), 2);
        assert_eq!(extraction.segments[0].title, "Opening");
        assert_eq!(extraction.segments[0].content, "user: hi there");
        assert_eq!(extraction.segments[1].title, "Closing");
    }

    #[test]
    fn test_matched_wins_before_lenient() {
        let text = "<segment:Opening>content here</segment:Opening>";
        let extraction = extract_segments(text);
        assert_eq!(extraction.strategy, Some(SegmentStrategy::TaggedMatched));
    }

    #[test]
    fn test_mismatched_close_falls_to_lenient() {
        let text = "<segment:Opening>content here</segment:Wrap>";
        let extraction = extract_segments(text);
        assert_eq!(extraction.strategy, Some(SegmentStrategy::TaggedLenient));
        assert_eq!(
            extraction.segments,
            vec![Segment::new("Opening", "content here")]
        );
    }

    #[test]
    fn test_bare_close_falls_to_third_strategy() {
        let text = "<segment:Opening>content here</segment>";
        let extraction = extract_segments(text);
        assert_eq!(extraction.strategy, Some(SegmentStrategy::TaggedBare));
        assert_eq!(
            extraction.segments,
            vec![Segment::new("Opening", "content here")]
        );
    }

    #[test]
    fn test_plain_heading_fallback() {
        let text = "Segment: Opening\n\
                    user: hi, I wanted to ask about pricing\n\
                    Segment: Closing\n\
                    customer: talk soon, thanks for the chat";
        let extraction = extract_segments(text);
        assert_eq!(extraction.strategy, Some(SegmentStrategy::PlainHeading));
        assert_eq!(extraction.segments.len(), 2);
        assert_eq!(extraction.segments[0].title, "Opening");
        assert!(extraction.segments[1].content.starts_with("customer:"));
    }

    #[test]
    fn test_plain_heading_discards_short_content() {
        let text = "Segment: Stub\nok\nSegment: Real\nuser: this one is long enough";
        let extraction = extract_segments(text);
        assert_eq!(extraction.segments.len(), 1);
        assert_eq!(extraction.segments[0].title, "Real");
    }

    #[test]
    fn test_no_segments_anywhere() {
        let extraction = extract_segments("just prose with no markup at all");
        assert!(extraction.segments.is_empty());
        assert_eq!(extraction.strategy, None);
    }

    #[test]
    fn test_unclosed_open_tag_skipped() {
        let text = "<segment:Broken>abc <segment:Good>user: solid content</segment:Good>";
        let extraction = extract_segments(text);
        assert_eq!(extraction.strategy, Some(SegmentStrategy::TaggedMatched));
        assert_eq!(
            extraction.segments,
            vec![Segment::new("Good", "user: solid content")]
        );
    }

    #[test]
    fn test_multiline_content_preserved() {
        let text = "<segment:Middle>user: line one\ncustomer: line two</segment:Middle>";
        let extraction = extract_segments(text);
        assert_eq!(
            extraction.segments[0].content,
            "user: line one\ncustomer: line two"
        );
    }

    #[test]
    fn test_emphasize_speaker_labels() {
        let input = "user: hello\ncustomer: hi [there](color: green)";
        let output = emphasize_speaker_labels(input);
        assert_eq!(
            output,
            "**User:** hello\n**Customer:** hi [there](color: green)"
        );
    }

    #[test]
    fn test_emphasize_ignores_mid_line_colons() {
        let input = "the note: not a speaker";
        assert_eq!(emphasize_speaker_labels(input), input);
    }

    #[test]
    fn test_emphasize_is_idempotent() {
        let once = emphasize_speaker_labels("user: hello");
        let twice = emphasize_speaker_labels(&once);
        assert_eq!(once, twice);
    }
}
