pub mod error;
pub mod transcript;

pub use error::{CoachError, ErrorCategory, ErrorClassifier, Result};
pub use transcript::{ScenarioContext, Transcript, Turn};

// =============================================================================
// Domain Newtypes
// =============================================================================

use std::fmt;

/// Type-safe wrapper for conversation thread IDs
///
/// Prevents accidental mixing of thread IDs with other string types, and
/// owns the derivation of per-stage sub-thread IDs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThreadId(String);

impl ThreadId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// Derive the sub-thread ID for one pipeline stage
    pub fn sub_thread(&self, suffix: &str) -> String {
        format!("{}_{}", self.0, suffix)
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ThreadId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ThreadId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for ThreadId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
