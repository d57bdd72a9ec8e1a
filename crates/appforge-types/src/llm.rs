//! Completion request/response types for the model gateway.
//!
//! These types model the data shapes for remote completion calls:
//! chat history, requests, streaming events, fan-out candidates and
//! outcomes, and gateway errors.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "system" => Ok(MessageRole::System),
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// A single message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Request to the completion gateway.
///
/// An empty `model` means "use the configured default".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub stream: bool,
}

/// Fully materialized response from the completion gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub id: String,
    pub content: String,
    pub model: String,
    pub usage: Usage,
}

/// Token usage for one completion.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl Usage {
    /// Total tokens consumed by this completion.
    pub fn total(&self) -> u64 {
        u64::from(self.input_tokens) + u64::from(self.output_tokens)
    }
}

/// Events emitted during a streaming completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// A chunk of generated text.
    TextDelta { text: String },
    /// Token usage, emitted once near the end of the stream.
    Usage(Usage),
    /// The stream has completed.
    Done,
}

/// Errors from completion gateway operations.
///
/// No automatic retry: any transport or model-side failure surfaces
/// directly to the caller.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("provider error: {message}")]
    Provider { message: String },

    #[error("stream error: {0}")]
    Stream(String),

    #[error("rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// A named reference to a remote completion model.
///
/// Not persisted; rosters are defined in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelCandidate {
    /// Provider-side model identifier (e.g. "openai/gpt-4o-mini").
    pub id: String,
    /// Human-readable display name.
    pub name: String,
}

impl ModelCandidate {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Outcome of invoking one model candidate during fan-out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelOutcome {
    pub candidate: ModelCandidate,
    /// Generated text when the candidate succeeded.
    pub response: Option<String>,
    /// Failure detail when it did not.
    pub error: Option<String>,
}

impl ModelOutcome {
    pub fn succeeded(candidate: ModelCandidate, response: String) -> Self {
        Self {
            candidate,
            response: Some(response),
            error: None,
        }
    }

    pub fn failed(candidate: ModelCandidate, error: String) -> Self {
        Self {
            candidate,
            response: None,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.response.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_role_round_trip() {
        for s in ["system", "user", "assistant"] {
            let role: MessageRole = s.parse().unwrap();
            assert_eq!(role.to_string(), s);
        }
        assert!("tool".parse::<MessageRole>().is_err());
    }

    #[test]
    fn test_message_role_serde_lowercase() {
        let json = serde_json::to_string(&MessageRole::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
    }

    #[test]
    fn test_usage_total() {
        let usage = Usage {
            input_tokens: 120,
            output_tokens: 480,
        };
        assert_eq!(usage.total(), 600);
    }

    #[test]
    fn test_outcome_success_flag() {
        let candidate = ModelCandidate::new("a/b", "B");
        assert!(ModelOutcome::succeeded(candidate.clone(), "hi".into()).is_success());
        assert!(!ModelOutcome::failed(candidate, "boom".into()).is_success());
    }
}
