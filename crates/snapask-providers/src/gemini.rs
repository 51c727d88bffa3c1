//! Google Gemini backend (Generative Language `generateContent` API).

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::DispatchError;
use crate::http_provider::{build_client, post_json};
use crate::registry::ResolvedProvider;
use crate::traits::{ChatBackend, LlmRequestConfig};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Client for `POST {base}/models/{model}:generateContent`.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
    request: LlmRequestConfig,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

impl GeminiProvider {
    pub fn new(resolved: &ResolvedProvider, request: LlmRequestConfig) -> Result<Self, DispatchError> {
        let api_base = if resolved.base_url.is_empty() {
            DEFAULT_BASE_URL.to_string()
        } else {
            resolved.base_url.clone()
        };
        let model = if resolved.model.is_empty() {
            DEFAULT_MODEL.to_string()
        } else {
            resolved.model.clone()
        };
        Ok(GeminiProvider {
            client: build_client(&request)?,
            api_base,
            api_key: resolved.api_key.clone(),
            model,
            request,
        })
    }

    /// Full endpoint URL. A base that already names `:generateContent` is used as-is.
    fn generate_url(&self) -> String {
        if self.api_base.contains(":generateContent") {
            return self.api_base.clone();
        }
        let base = self.api_base.trim_end_matches('/');
        let model = self.model.strip_prefix("models/").unwrap_or(&self.model);
        format!("{base}/models/{model}:generateContent")
    }

    fn request_body(&self, prompt: &str) -> Value {
        json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "maxOutputTokens": self.request.max_tokens,
                "temperature": self.request.temperature,
            }
        })
    }
}

#[async_trait]
impl ChatBackend for GeminiProvider {
    async fn complete(&self, prompt: &str) -> Result<String, DispatchError> {
        debug!(model = %self.model, prompt_chars = prompt.len(), "Calling Gemini");
        let request = self
            .client
            .post(self.generate_url())
            .header("x-goog-api-key", &self.api_key);
        let json = post_json(request, &self.request_body(prompt), "Google Gemini").await?;
        Ok(extract_gemini_text(&json))
    }

    fn display_name(&self) -> &str {
        "Google Gemini"
    }
}

/// Concatenated `candidates[0].content.parts[*].text`, else a top-level
/// `text`, else the serialized response.
pub fn extract_gemini_text(response: &Value) -> String {
    let parts = response
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array);

    if let Some(parts) = parts {
        let texts: Vec<&str> = parts
            .iter()
            .filter_map(|part| part.get("text").and_then(Value::as_str))
            .collect();
        if !texts.is_empty() {
            return texts.concat();
        }
    }

    if let Some(text) = response.get("text").and_then(Value::as_str) {
        return text.to_string();
    }

    response.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::find_by_name;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn resolved(model: &str, base_url: &str) -> ResolvedProvider {
        ResolvedProvider {
            spec: find_by_name("google").unwrap(),
            api_key: "AIza-test".to_string(),
            model: model.to_string(),
            base_url: base_url.to_string(),
            auth_header_name: "Authorization".to_string(),
        }
    }

    fn provider(model: &str, base_url: &str) -> GeminiProvider {
        GeminiProvider::new(&resolved(model, base_url), LlmRequestConfig::default()).unwrap()
    }

    #[test]
    fn test_default_url() {
        let provider = provider("gemini-2.0-flash", "");
        assert_eq!(
            provider.generate_url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn test_url_with_prefixed_model_and_slash() {
        let provider = provider("models/gemini-pro", "https://proxy.example/v1beta/");
        assert_eq!(
            provider.generate_url(),
            "https://proxy.example/v1beta/models/gemini-pro:generateContent"
        );
    }

    #[test]
    fn test_full_endpoint_base_used_verbatim() {
        let url = "https://proxy.example/v1/models/x:generateContent";
        assert_eq!(provider("ignored", url).generate_url(), url);
    }

    #[test]
    fn test_empty_model_uses_default() {
        assert_eq!(provider("", "").model, DEFAULT_MODEL);
    }

    #[test]
    fn test_extract_concatenates_parts() {
        let json = json!({
            "candidates": [{ "content": { "parts": [{"text": "Hello, "}, {"text": "world"}] } }]
        });
        assert_eq!(extract_gemini_text(&json), "Hello, world");
    }

    #[test]
    fn test_extract_top_level_text() {
        assert_eq!(extract_gemini_text(&json!({"text": "plain"})), "plain");
    }

    #[test]
    fn test_extract_unknown_shape_is_string_form() {
        let json = json!({"promptFeedback": {"blockReason": "SAFETY"}});
        assert_eq!(extract_gemini_text(&json), json.to_string());
    }

    #[tokio::test]
    async fn test_generate_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/gemini-2.0-flash:generateContent"))
            .and(header("x-goog-api-key", "AIza-test"))
            .and(body_partial_json(json!({
                "contents": [{ "parts": [{ "text": "what is this?" }] }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [{ "text": "A cat." }], "role": "model" } }]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = provider("gemini-2.0-flash", &mock_server.uri());
        assert_eq!(provider.complete("what is this?").await.unwrap(), "A cat.");
    }

    #[tokio::test]
    async fn test_generate_http_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
            .mount(&mock_server)
            .await;

        let provider = provider("gemini-2.0-flash", &mock_server.uri());
        match provider.complete("x").await.unwrap_err() {
            DispatchError::UpstreamHttp { status, body } => {
                assert_eq!(status, 403);
                assert_eq!(body, "API key not valid");
            }
            other => panic!("expected UpstreamHttp, got {other:?}"),
        }
    }
}
