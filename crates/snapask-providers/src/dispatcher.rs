//! Provider dispatcher: provider id + prompt + config → answer text.

use tracing::{debug, info};

use snapask_core::config::AppConfig;

use crate::custom::CustomProvider;
use crate::error::DispatchError;
use crate::http_provider::HttpProvider;
use crate::registry::{resolve_provider, ProviderKind, ResolvedProvider};
use crate::traits::{ChatBackend, LlmRequestConfig};

/// Build the backend matching the resolved provider's kind.
pub fn create_backend(resolved: &ResolvedProvider) -> Result<Box<dyn ChatBackend>, DispatchError> {
    let request = LlmRequestConfig::default();
    match resolved.spec.kind {
        ProviderKind::OpenAiCompatible => Ok(Box::new(HttpProvider::new(resolved, request)?)),
        ProviderKind::CustomFallback => Ok(Box::new(CustomProvider::new(resolved, request)?)),
        ProviderKind::VendorSdk => vendor_backend(resolved, request),
    }
}

#[cfg(feature = "gemini")]
fn vendor_backend(
    resolved: &ResolvedProvider,
    request: LlmRequestConfig,
) -> Result<Box<dyn ChatBackend>, DispatchError> {
    Ok(Box::new(crate::gemini::GeminiProvider::new(resolved, request)?))
}

#[cfg(not(feature = "gemini"))]
fn vendor_backend(
    resolved: &ResolvedProvider,
    _request: LlmRequestConfig,
) -> Result<Box<dyn ChatBackend>, DispatchError> {
    Err(DispatchError::DependencyMissing(format!(
        "{} support is not compiled in (rebuild with the `gemini` feature)",
        resolved.spec.display_name
    )))
}

/// Send `prompt` to the provider named `provider_id` and return its raw answer text.
///
/// Configuration problems are reported before any network activity. The
/// returned text is not sanitized.
pub async fn dispatch(
    provider_id: &str,
    prompt: &str,
    config: &AppConfig,
) -> Result<String, DispatchError> {
    let resolved = resolve_provider(provider_id, config)?;
    let backend = create_backend(&resolved)?;

    info!(provider = backend.display_name(), model = %resolved.model, "Dispatching prompt");
    let text = backend.complete(prompt).await?;
    debug!(provider = backend.display_name(), chars = text.len(), "Dispatch complete");
    Ok(text)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
