//! LLM provider layer for SnapAsk.
//!
//! # Architecture
//!
//! - [`registry`]: static specs for every supported provider id + settings resolution
//! - [`traits::ChatBackend`]: trait that all backends implement
//! - [`http_provider::HttpProvider`]: OpenAI-compatible `/chat/completions` client
//! - [`gemini::GeminiProvider`]: Google Generative Language client (feature `gemini`)
//! - [`custom::CustomProvider`]: OpenAI-compatible first, generic `{model, input}` fallback
//! - [`dispatcher::dispatch`]: provider id + prompt + config → answer text

pub mod custom;
pub mod dispatcher;
pub mod error;
#[cfg(feature = "gemini")]
pub mod gemini;
pub mod http_provider;
pub mod registry;
pub mod traits;

pub use custom::CustomProvider;
pub use dispatcher::{create_backend, dispatch};
pub use error::DispatchError;
#[cfg(feature = "gemini")]
pub use gemini::GeminiProvider;
pub use http_provider::HttpProvider;
pub use registry::{find_by_name, resolve_provider, ProviderKind, ProviderSpec, ResolvedProvider, PROVIDERS};
pub use traits::{ChatBackend, LlmRequestConfig};
