//! Completion Response Envelopes
//!
//! Gateways and OpenAI-compatible servers wrap completion text in a handful
//! of shapes. The accepted set is a closed union resolved once here, at the
//! adapter boundary; everything above sees plain text.
//!
//! ## Accepted shapes (probe order)
//!
//! 1. `"text"` - a bare JSON string
//! 2. `{"response": "text"}`
//! 3. `{"response": {"text": "text"}}`
//! 4. `{"text": "text"}`
//! 5. `{"content": "text"}`
//! 6. `{"message": {"content": "text"}}`
//! 7. `{"choices": [{"message": {"content": "text"}}]}` (OpenAI)
//!
//! A body that is not JSON at all is taken verbatim as completion text.
//! A JSON body matching none of these shapes yields no text, which the
//! adapter reports as an extraction failure.

use serde::Deserialize;
use serde_json::Value;

/// The closed set of response shapes the adapter accepts
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CompletionEnvelope {
    /// A bare JSON string body
    Direct(String),
    /// `{"response": ...}` with a string or `{"text": ...}` payload
    Response { response: ResponseBody },
    /// `{"text": "..."}`
    Text { text: String },
    /// `{"content": "..."}`
    Content { content: String },
    /// `{"message": {"content": "..."}}`
    Message { message: MessageBody },
    /// OpenAI chat-completions shape
    Chat { choices: Vec<ChatChoice> },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Direct(String),
    Nested { text: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageBody {
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

impl CompletionEnvelope {
    /// Normalized completion text, if any non-empty text exists
    pub fn into_text(self) -> Option<String> {
        let text = match self {
            Self::Direct(text) | Self::Text { text } | Self::Content { content: text } => text,
            Self::Response { response } => match response {
                ResponseBody::Direct(text) | ResponseBody::Nested { text } => text,
            },
            Self::Message { message } => message.content,
            Self::Chat { choices } => choices.into_iter().next()?.message.content?,
        };
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

/// Resolve a raw response body to completion text.
///
/// JSON bodies go through the envelope union; non-JSON bodies are plain
/// completion text. `None` means no usable text was found.
pub fn extract_text(body: &str) -> Option<String> {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => serde_json::from_value::<CompletionEnvelope>(value)
            .ok()?
            .into_text(),
        Err(_) => {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_string_body() {
        assert_eq!(
            extract_text(r#""The call went well.""#).as_deref(),
            Some("The call went well.")
        );
    }

    #[test]
    fn test_response_string() {
        assert_eq!(
            extract_text(r#"{"response": "summary text"}"#).as_deref(),
            Some("summary text")
        );
    }

    #[test]
    fn test_response_nested_text() {
        assert_eq!(
            extract_text(r#"{"response": {"text": "nested text"}}"#).as_deref(),
            Some("nested text")
        );
    }

    #[test]
    fn test_text_field() {
        assert_eq!(
            extract_text(r#"{"text": "plain field"}"#).as_deref(),
            Some("plain field")
        );
    }

    #[test]
    fn test_content_field() {
        assert_eq!(
            extract_text(r#"{"content": "content field"}"#).as_deref(),
            Some("content field")
        );
    }

    #[test]
    fn test_message_content() {
        assert_eq!(
            extract_text(r#"{"message": {"content": "chat reply"}}"#).as_deref(),
            Some("chat reply")
        );
    }

    #[test]
    fn test_openai_choices() {
        let body = r###"{
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "## CONVERSATION OVERVIEW\nGood opening."}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 20}
        }"###;
        assert_eq!(
            extract_text(body).as_deref(),
            Some("## CONVERSATION OVERVIEW\nGood opening.")
        );
    }

    #[test]
    fn test_non_json_body_is_plain_text() {
        assert_eq!(
            extract_text("Just markdown, no JSON here").as_deref(),
            Some("Just markdown, no JSON here")
        );
    }

    #[test]
    fn test_probe_order_prefers_response() {
        // Ambiguous payloads resolve to the earliest variant
        assert_eq!(
            extract_text(r#"{"response": "first", "text": "second"}"#).as_deref(),
            Some("first")
        );
    }

    #[test]
    fn test_empty_text_yields_none() {
        assert_eq!(extract_text(r#"{"text": ""}"#), None);
        assert_eq!(extract_text(r#"{"text": "   "}"#), None);
        assert_eq!(extract_text(""), None);
        assert_eq!(extract_text("   "), None);
    }

    #[test]
    fn test_empty_choices_yields_none() {
        assert_eq!(extract_text(r#"{"choices": []}"#), None);
        assert_eq!(
            extract_text(r#"{"choices": [{"message": {"content": null}}]}"#),
            None
        );
    }

    #[test]
    fn test_unrecognized_json_yields_none() {
        assert_eq!(extract_text(r#"{"error": "model overloaded"}"#), None);
        assert_eq!(extract_text("[1, 2, 3]"), None);
    }

    #[test]
    fn test_text_is_trimmed() {
        assert_eq!(
            extract_text(r#"{"text": "  padded  "}"#).as_deref(),
            Some("padded")
        );
    }
}
