//! Custom endpoint backend.
//!
//! Tries the OpenAI-compatible shape first. When the endpoint answers with a
//! non-2xx status it is retried once with a generic `{model, input}` body
//! posted to the base URL itself.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use snapask_core::types::GenericInputRequest;

use crate::error::DispatchError;
use crate::http_provider::{build_client, is_truthy, post_json, value_to_text, HttpProvider};
use crate::registry::ResolvedProvider;
use crate::traits::{ChatBackend, LlmRequestConfig};

pub struct CustomProvider {
    primary: HttpProvider,
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    auth_header_name: String,
}

impl std::fmt::Debug for CustomProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomProvider")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("auth_header_name", &self.auth_header_name)
            .finish()
    }
}

impl CustomProvider {
    pub fn new(resolved: &ResolvedProvider, request: LlmRequestConfig) -> Result<Self, DispatchError> {
        let client = build_client(&request)?;
        Ok(CustomProvider {
            primary: HttpProvider::new(resolved, request)?,
            client,
            base_url: resolved.base_url.clone(),
            api_key: resolved.api_key.clone(),
            model: resolved.model.clone(),
            auth_header_name: resolved.auth_header_name.clone(),
        })
    }

    async fn generic_input(&self, prompt: &str) -> Result<String, DispatchError> {
        let body = GenericInputRequest {
            model: self.model.clone(),
            input: prompt.to_string(),
        };
        let request = self.client.post(&self.base_url).header(
            self.auth_header_name.as_str(),
            format!("Bearer {}", self.api_key),
        );
        let json = post_json(request, &body, "Custom").await?;
        Ok(extract_generic_text(&json))
    }
}

#[async_trait]
impl ChatBackend for CustomProvider {
    async fn complete(&self, prompt: &str) -> Result<String, DispatchError> {
        match self.primary.chat_completion(prompt).await {
            Err(e) if e.is_upstream_http() => {
                warn!(error = %e, "OpenAI-style request failed, trying generic input shape");
                self.generic_input(prompt).await
            }
            other => other,
        }
    }

    fn display_name(&self) -> &str {
        "Custom"
    }
}

/// First truthy of `output` and `result`, else the serialized response.
pub fn extract_generic_text(response: &Value) -> String {
    for key in ["output", "result"] {
        if let Some(value) = response.get(key).filter(|v| is_truthy(v)) {
            debug!(key, "Generic response field found");
            return value_to_text(value);
        }
    }
    response.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::find_by_name;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(base_url: &str, auth_header_name: &str) -> CustomProvider {
        let resolved = ResolvedProvider {
            spec: find_by_name("custom").unwrap(),
            api_key: "custom-key".to_string(),
            model: "my-model".to_string(),
            base_url: base_url.to_string(),
            auth_header_name: auth_header_name.to_string(),
        };
        CustomProvider::new(&resolved, LlmRequestConfig::default()).unwrap()
    }

    #[test]
    fn test_extract_generic_text() {
        assert_eq!(extract_generic_text(&json!({"output": "out"})), "out");
        assert_eq!(extract_generic_text(&json!({"result": "res"})), "res");
        assert_eq!(
            extract_generic_text(&json!({"output": "", "result": "res"})),
            "res"
        );
        let unknown = json!({"data": {"answer": 42}});
        assert_eq!(extract_generic_text(&unknown), unknown.to_string());
    }

    #[tokio::test]
    async fn test_primary_success_skips_fallback() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "content": "primary answer" } }]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"output": "x"})))
            .expect(0)
            .mount(&mock_server)
            .await;

        let provider = provider(&format!("{}/api", mock_server.uri()), "Authorization");
        assert_eq!(provider.complete("hi").await.unwrap(), "primary answer");
    }

    #[tokio::test]
    async fn test_fallback_after_http_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api"))
            .and(header("X-Api-Key", "Bearer custom-key"))
            .and(body_json(json!({"model": "my-model", "input": "hi"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"output": "fallback answer"})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = provider(&format!("{}/api", mock_server.uri()), "X-Api-Key");
        assert_eq!(provider.complete("hi").await.unwrap(), "fallback answer");
    }

    #[tokio::test]
    async fn test_fallback_result_and_unknown_shapes() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/chat/completions"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "from result"})))
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/other"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "done"})))
            .mount(&mock_server)
            .await;

        let provider_a = provider(&format!("{}/api", mock_server.uri()), "Authorization");
        assert_eq!(provider_a.complete("q").await.unwrap(), "from result");

        // /other/chat/completions is unmatched and answers 404
        let provider_b = provider(&format!("{}/other", mock_server.uri()), "Authorization");
        assert_eq!(provider_b.complete("q").await.unwrap(), r#"{"status":"done"}"#);
    }

    #[tokio::test]
    async fn test_fallback_failure_is_final_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("primary down"))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api"))
            .respond_with(ResponseTemplate::new(502).set_body_string("gateway down"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = provider(&format!("{}/api", mock_server.uri()), "Authorization");
        match provider.complete("hi").await.unwrap_err() {
            DispatchError::UpstreamHttp { status, body } => {
                assert_eq!(status, 502);
                assert_eq!(body, "gateway down");
            }
            other => panic!("expected UpstreamHttp, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_transport_error_does_not_fall_back() {
        let provider = provider("http://127.0.0.1:1/api", "Authorization");
        let err = provider.complete("hi").await.unwrap_err();
        assert!(matches!(err, DispatchError::Transport(_)));
    }
}
