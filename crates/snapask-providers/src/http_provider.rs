//! Generic HTTP provider for OpenAI-compatible APIs.
//!
//! Talks to any `/chat/completions` endpoint: OpenAI, DeepSeek, Groq,
//! Together, Ollama, and the first attempt of the custom provider.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};

use snapask_core::types::ChatCompletionRequest;
use snapask_core::utils::truncate_string;

use crate::error::DispatchError;
use crate::registry::ResolvedProvider;
use crate::traits::{ChatBackend, LlmRequestConfig};

// ─────────────────────────────────────────────
// HttpProvider
// ─────────────────────────────────────────────

/// A provider that talks to any OpenAI-compatible HTTP API.
pub struct HttpProvider {
    /// HTTP client (shared, connection-pooled).
    client: reqwest::Client,
    /// API base URL (e.g. `"https://api.openai.com/v1"`).
    api_base: String,
    /// API key for Bearer authentication.
    api_key: String,
    /// Model sent with every request.
    model: String,
    /// Display name for logs.
    display_name: &'static str,
    /// Sampling parameters.
    request: LlmRequestConfig,
}

impl std::fmt::Debug for HttpProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpProvider")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("provider", &self.display_name)
            .finish()
    }
}

impl HttpProvider {
    /// Create an HttpProvider from resolved settings.
    pub fn new(resolved: &ResolvedProvider, request: LlmRequestConfig) -> Result<Self, DispatchError> {
        if resolved.base_url.is_empty() {
            return Err(DispatchError::Configuration(format!(
                "no base URL set for {}",
                resolved.spec.display_name
            )));
        }
        let client = build_client(&request)?;
        Ok(HttpProvider {
            client,
            api_base: resolved.base_url.clone(),
            api_key: resolved.api_key.clone(),
            model: resolved.model.clone(),
            display_name: resolved.spec.display_name,
            request,
        })
    }

    /// Build the full chat completions URL.
    fn completions_url(&self) -> String {
        let base = self.api_base.trim_end_matches('/');
        format!("{}/chat/completions", base)
    }

    /// One chat-completions round trip, answer text extracted.
    pub async fn chat_completion(&self, prompt: &str) -> Result<String, DispatchError> {
        debug!(
            provider = self.display_name,
            model = %self.model,
            prompt_chars = prompt.len(),
            "Calling LLM"
        );

        let body = ChatCompletionRequest::single_turn(
            self.model.clone(),
            prompt,
            self.request.max_tokens,
            self.request.temperature,
        );

        let mut request = self.client.post(self.completions_url());
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let json = post_json(request, &body, self.display_name).await?;
        let text = extract_completion_text(&json);
        debug!(provider = self.display_name, chars = text.len(), "LLM response received");
        Ok(text)
    }
}

#[async_trait]
impl ChatBackend for HttpProvider {
    async fn complete(&self, prompt: &str) -> Result<String, DispatchError> {
        self.chat_completion(prompt).await
    }

    fn display_name(&self) -> &str {
        self.display_name
    }
}

// ─────────────────────────────────────────────
// Shared HTTP plumbing
// ─────────────────────────────────────────────

pub(crate) fn build_client(request: &LlmRequestConfig) -> Result<reqwest::Client, DispatchError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(request.timeout_secs))
        .build()
        .map_err(|e| DispatchError::Transport(format!("failed to build HTTP client: {e}")))
}

/// Send `body` as JSON and read a JSON reply.
///
/// Non-2xx statuses become `UpstreamHttp` carrying the response body.
pub(crate) async fn post_json<T: Serialize + ?Sized>(
    request: reqwest::RequestBuilder,
    body: &T,
    provider: &str,
) -> Result<Value, DispatchError> {
    let response = request.json(body).send().await.map_err(|e| {
        error!(provider, error = %e, "HTTP request failed");
        DispatchError::Transport(e.to_string())
    })?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read error body".to_string());
        error!(provider, status = %status, body = %error_text, "API error");
        return Err(DispatchError::UpstreamHttp {
            status: status.as_u16(),
            body: error_text,
        });
    }

    let text = response
        .text()
        .await
        .map_err(|e| DispatchError::Transport(e.to_string()))?;
    serde_json::from_str(&text).map_err(|e| {
        error!(provider, error = %e, "Failed to parse LLM response");
        DispatchError::InvalidResponse(format!("{e}: {}", truncate_string(&text, 200)))
    })
}

/// Text of a JSON value: strings as-is, `null` empty, anything else serialized.
pub(crate) fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// JSON truthiness: null, false, 0, "" and empty containers are falsy.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Pull the answer out of a chat-completions response.
///
/// Reads `choices[0].message.content`, else `choices[0].text`; any other
/// shape is returned as the serialized response so nothing is lost.
pub fn extract_completion_text(response: &Value) -> String {
    let first = response
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first());

    if let Some(first) = first {
        if let Some(message) = first.get("message").filter(|m| m.is_object()) {
            return message.get("content").map(value_to_text).unwrap_or_default();
        }
        if let Some(text) = first.get("text") {
            return value_to_text(text);
        }
    }

    response.to_string()
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
