//! Wire types for the OpenAI chat completions API.
//!
//! Responses are read as `serde_json::Value` by the providers, since the
//! shape varies between vendors and unknown shapes are returned verbatim.

use serde::{Deserialize, Serialize};

/// A chat message in the OpenAI format.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Request body for `POST {base}/chat/completions`.
#[derive(Clone, Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

impl ChatCompletionRequest {
    /// A single-turn request holding one user message.
    pub fn single_turn(
        model: impl Into<String>,
        prompt: impl Into<String>,
        max_tokens: u32,
        temperature: f64,
    ) -> Self {
        Self {
            model: model.into(),
            messages: vec![ChatMessage::user(prompt)],
            max_tokens: Some(max_tokens),
            temperature: Some(temperature),
        }
    }
}

/// Request body for the generic `{model, input}` endpoint shape.
#[derive(Clone, Debug, Serialize)]
pub struct GenericInputRequest {
    pub model: String,
    pub input: String,
}
