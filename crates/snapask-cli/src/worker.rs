//! Request worker: runs each dispatch on its own task.
//!
//! The front-end never awaits the provider directly: it spawns a request and
//! reads the finished [`Answer`] from a channel. Every request gets an
//! immutable snapshot of the configuration.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use snapask_core::config::AppConfig;
use snapask_core::sanitize;
use snapask_providers::dispatch;

/// Result of one request, ready for display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Answer {
    /// Id of the request this answers.
    pub request_id: u64,
    /// Sanitized answer, or a diagnostic when `is_error` is set.
    pub text: String,
    pub is_error: bool,
}

pub fn answer_channel() -> (mpsc::UnboundedSender<Answer>, mpsc::UnboundedReceiver<Answer>) {
    mpsc::unbounded_channel()
}

/// Dispatch `prompt` and sanitize the reply; failures become a diagnostic answer.
pub async fn answer(config: &AppConfig, provider: &str, prompt: &str, request_id: u64) -> Answer {
    match dispatch(provider, prompt, config).await {
        Ok(raw) => Answer {
            request_id,
            text: sanitize(&raw),
            is_error: false,
        },
        Err(e) => {
            warn!(request_id, provider, error = %e, "request failed");
            Answer {
                request_id,
                text: e.user_message(),
                is_error: true,
            }
        }
    }
}

/// Spawn a task answering `prompt` and sending the result to `tx`.
pub fn spawn_request(
    config: Arc<AppConfig>,
    provider: String,
    prompt: String,
    request_id: u64,
    tx: mpsc::UnboundedSender<Answer>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let answer = answer(&config, &provider, &prompt, request_id).await;
        if tx.send(answer).is_err() {
            debug!(request_id, "answer receiver dropped");
        }
    })
}
