//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Retry constants
pub mod retry {
    /// Default maximum retries per call (total attempts = retries + 1)
    pub const DEFAULT_MAX_RETRIES: u32 = 2;

    /// Initial delay for exponential backoff (milliseconds)
    pub const INITIAL_DELAY_MS: u64 = 250;

    /// Maximum delay between retries (milliseconds)
    pub const MAX_DELAY_MS: u64 = 4_000;

    /// Maximum delay for the detail stage, which sends the largest prompts
    pub const DETAIL_MAX_DELAY_MS: u64 = 8_000;
}

/// Per-stage output token caps
///
/// Each cap is `clamp(estimated_input_tokens * multiplier, floor, ceiling)`.
/// These are tuning knobs, not part of any contract.
pub mod stage {
    /// Segmenter: output mirrors the transcript plus markup
    pub const SEGMENTER_MULTIPLIER: f32 = 1.5;
    pub const SEGMENTER_FLOOR: u32 = 600;
    pub const SEGMENTER_CEILING: u32 = 4_096;

    /// Summarizer: condenses, so roughly input-sized is plenty
    pub const SUMMARY_MULTIPLIER: f32 = 1.0;
    pub const SUMMARY_FLOOR: u32 = 512;
    pub const SUMMARY_CEILING: u32 = 2_048;

    /// Detail annotator: re-renders segments plus annotations
    pub const DETAIL_MULTIPLIER: f32 = 2.0;
    pub const DETAIL_FLOOR: u32 = 768;
    pub const DETAIL_CEILING: u32 = 4_096;
}

/// Conversation memory constants
pub mod memory {
    /// How many prior messages each stage recalls from its sub-thread
    pub const RECALL_LIMIT: usize = 6;
}

/// Report parsing constants
pub mod report {
    /// Placeholder score for canonical categories missing from the ratings block
    pub const DEFAULT_SCORE: u8 = 50;

    /// Maximum score value; parsed integers are clamped into [0, MAX_SCORE]
    pub const MAX_SCORE: u8 = 100;

    /// Fallback prefix length when the source text has no section headers
    pub const FALLBACK_PREFIX_CHARS: usize = 600;

    /// Minimum content length for plain-text segment headings to count
    pub const MIN_SEGMENT_CONTENT_CHARS: usize = 10;
}

/// Provider constants
pub mod provider {
    /// How much of a bad response body to keep in logs and errors
    pub const RESPONSE_LOG_CHARS: usize = 500;
}

/// HTTP/Network constants
pub mod network {
    /// Default request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

    /// Connection timeout (seconds)
    pub const CONNECTION_TIMEOUT_SECS: u64 = 30;
}
