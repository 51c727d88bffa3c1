//! Dispatch error taxonomy.

use thiserror::Error;

/// Why a dispatch produced no answer.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Settings are incomplete (missing key or base URL, unsupported id).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The backend for this provider was not compiled in.
    #[error("dependency missing: {0}")]
    DependencyMissing(String),

    /// The provider answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    UpstreamHttp { status: u16, body: String },

    /// The provider id is not present in the configuration.
    #[error("provider '{0}' is not configured")]
    UnknownProvider(String),

    /// No HTTP response was received (DNS, connect, timeout).
    #[error("request failed: {0}")]
    Transport(String),

    /// A 2xx response whose body could not be read as JSON.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl DispatchError {
    /// Diagnostic shown in the answer area in place of an answer.
    pub fn user_message(&self) -> String {
        match self {
            DispatchError::Configuration(msg) => {
                format!("⚠️ Settings problem: {msg}\nOpen the settings and fix the provider entry.")
            }
            DispatchError::DependencyMissing(msg) => format!("⚠️ Missing component: {msg}"),
            DispatchError::UpstreamHttp { status, body } => {
                format!("⚠️ HTTP Error: {status}\n{body}")
            }
            DispatchError::UnknownProvider(id) => {
                format!("⚠️ Provider '{id}' is not configured.")
            }
            DispatchError::Transport(msg) => format!("⚠️ Network error: {msg}"),
            DispatchError::InvalidResponse(msg) => {
                format!("⚠️ The provider sent an unreadable response: {msg}")
            }
        }
    }

    /// Whether this is a non-2xx answer from the provider.
    pub fn is_upstream_http(&self) -> bool {
        matches!(self, DispatchError::UpstreamHttp { .. })
    }
}
