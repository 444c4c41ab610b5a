//! Transcript and Scenario Inputs
//!
//! A finished conversation arrives as speaker-labelled text
//! (`speaker: utterance` per line). Parsing is forgiving: continuation
//! lines attach to the previous turn and blank lines are skipped. Empty
//! input parses to zero turns; rejecting it is the caller's decision.

use serde::{Deserialize, Serialize};

use crate::types::error::Result;

// =============================================================================
// Transcript
// =============================================================================

/// One speaker turn in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: String,
    pub text: String,
}

impl Turn {
    pub fn new(speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            text: text.into(),
        }
    }
}

/// A completed conversation as an ordered list of turns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    pub turns: Vec<Turn>,
}

impl Transcript {
    pub fn new(turns: Vec<Turn>) -> Self {
        Self { turns }
    }

    /// Parse speaker-labelled text into turns.
    ///
    /// A line like `alex: how can I help?` starts a new turn. Lines without
    /// a speaker label continue the previous turn; leading unattributed
    /// lines become a turn with an empty speaker so no text is lost.
    pub fn parse(text: &str) -> Self {
        let mut turns: Vec<Turn> = Vec::new();

        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }

            if let Some((speaker, rest)) = split_speaker(line) {
                turns.push(Turn::new(speaker, rest.trim_start()));
            } else if let Some(last) = turns.last_mut() {
                if !last.text.is_empty() {
                    last.text.push('\n');
                }
                last.text.push_str(line.trim());
            } else {
                turns.push(Turn::new("", line.trim()));
            }
        }

        Self { turns }
    }

    /// Render back to the canonical `speaker: text` line form used in prompts
    pub fn render(&self) -> String {
        self.turns
            .iter()
            .map(|turn| {
                if turn.speaker.is_empty() {
                    turn.text.clone()
                } else {
                    format!("{}: {}", turn.speaker, turn.text)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }
}

/// Split a `speaker: rest` line; the speaker must be a single word
fn split_speaker(line: &str) -> Option<(&str, &str)> {
    let colon = line.find(':')?;
    let speaker = line[..colon].trim();
    if speaker.is_empty() || speaker.contains(char::is_whitespace) {
        return None;
    }
    if !speaker
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
    {
        return None;
    }
    Some((speaker, &line[colon + 1..]))
}

// =============================================================================
// Scenario Context
// =============================================================================

/// Optional training-scenario context injected into stage prompts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioContext {
    /// What is being sold or supported
    #[serde(default)]
    pub product_description: Option<String>,
    /// Who the simulated customer is
    #[serde(default)]
    pub customer_persona: Option<String>,
    /// The specific skill the session trains
    #[serde(default)]
    pub challenge: Option<String>,
}

impl ScenarioContext {
    /// Load from a YAML document
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn is_empty(&self) -> bool {
        self.product_description.is_none()
            && self.customer_persona.is_none()
            && self.challenge.is_none()
    }
}

// =============================================================================
// Tests
// =============================================================================
