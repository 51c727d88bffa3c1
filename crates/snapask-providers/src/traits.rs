//! Backend trait: one implementation per provider kind.

use async_trait::async_trait;

use crate::error::DispatchError;

/// Sampling and transport parameters for each request.
#[derive(Clone, Debug)]
pub struct LlmRequestConfig {
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for LlmRequestConfig {
    fn default() -> Self {
        Self {
            max_tokens: 1024,
            temperature: 0.2,
            timeout_secs: 60,
        }
    }
}

/// A provider call shape that turns a prompt into answer text.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send a single stateless prompt and return the extracted answer text.
    async fn complete(&self, prompt: &str) -> Result<String, DispatchError>;

    /// Display name for logging.
    fn display_name(&self) -> &str;
}
