//! Provider registry: static specs for every supported provider id.
//!
//! Each `ProviderSpec` ties a provider id to the call shape used for it and
//! to its credential quirks. [`resolve_provider`] merges a spec with the
//! user's settings into the values a backend needs.

use snapask_core::config::{AppConfig, ProviderSettings};
use tracing::debug;

use crate::error::DispatchError;

// ─────────────────────────────────────────────
// ProviderKind / ProviderSpec
// ─────────────────────────────────────────────

/// The call shape used for a provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderKind {
    /// `POST {base}/chat/completions` with Bearer auth.
    OpenAiCompatible,
    /// Vendor generation API (Google Gemini).
    VendorSdk,
    /// OpenAI-compatible first, generic `{model, input}` shape on HTTP failure.
    CustomFallback,
}

/// Static specification describing one provider.
#[derive(Clone, Debug)]
pub struct ProviderSpec {
    /// Provider id as used in the config (e.g. `"deepseek"`).
    pub name: &'static str,
    /// Human-readable name for logs and status output.
    pub display_name: &'static str,
    /// Which backend handles this provider.
    pub kind: ProviderKind,
    /// Environment variable consulted last for the API key.
    pub env_key: Option<&'static str>,
    /// Whether an empty API key is a configuration error.
    pub requires_api_key: bool,
}

/// Complete list of supported providers.
pub static PROVIDERS: &[ProviderSpec] = &[
    ProviderSpec {
        name: "openai",
        display_name: "OpenAI",
        kind: ProviderKind::OpenAiCompatible,
        env_key: None,
        requires_api_key: true,
    },
    ProviderSpec {
        name: "deepseek",
        display_name: "DeepSeek",
        kind: ProviderKind::OpenAiCompatible,
        env_key: None,
        requires_api_key: true,
    },
    ProviderSpec {
        name: "google",
        display_name: "Google Gemini",
        kind: ProviderKind::VendorSdk,
        env_key: Some("GOOGLE_API_KEY"),
        requires_api_key: true,
    },
    ProviderSpec {
        name: "groq",
        display_name: "Groq",
        kind: ProviderKind::OpenAiCompatible,
        env_key: None,
        requires_api_key: true,
    },
    ProviderSpec {
        name: "together",
        display_name: "Together AI",
        kind: ProviderKind::OpenAiCompatible,
        env_key: None,
        requires_api_key: true,
    },
    // Local server; runs without a key.
    ProviderSpec {
        name: "ollama",
        display_name: "Ollama",
        kind: ProviderKind::OpenAiCompatible,
        env_key: None,
        requires_api_key: false,
    },
    ProviderSpec {
        name: "custom",
        display_name: "Custom",
        kind: ProviderKind::CustomFallback,
        env_key: None,
        requires_api_key: true,
    },
];

/// Find a provider spec by exact name.
pub fn find_by_name(name: &str) -> Option<&'static ProviderSpec> {
    PROVIDERS.iter().find(|spec| spec.name == name)
}

// ─────────────────────────────────────────────
// Resolution
// ─────────────────────────────────────────────

/// Settings for one provider after fallbacks, ready for a backend.
#[derive(Clone, Debug)]
pub struct ResolvedProvider {
    pub spec: &'static ProviderSpec,
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    /// Header carrying the key for the generic custom shape.
    pub auth_header_name: String,
}

/// Resolve `provider_id` against `config`, reading fallbacks from the process env.
pub fn resolve_provider(
    provider_id: &str,
    config: &AppConfig,
) -> Result<ResolvedProvider, DispatchError> {
    resolve_provider_with_env(provider_id, config, |key| std::env::var(key).ok())
}

/// Resolve `provider_id` against `config` with an explicit env lookup.
///
/// Each of key, model and base URL comes from the provider's own entry when
/// non-empty, else from the legacy top-level field. The legacy `api_key`
/// holds the key of the saved active provider (it is mirrored on every
/// settings commit), so it only backs that provider; any other id with an
/// empty key fails instead of receiving another vendor's secret. The key for
/// the vendor provider uses `google_api_key` as its legacy field and finally
/// the provider's environment variable.
///
/// Fails before any network activity when the id is unknown, the key is
/// required but empty, or an HTTP-based provider has no base URL.
pub fn resolve_provider_with_env<F>(
    provider_id: &str,
    config: &AppConfig,
    env: F,
) -> Result<ResolvedProvider, DispatchError>
where
    F: Fn(&str) -> Option<String>,
{
    let id = provider_id.trim().to_lowercase();

    let settings = config
        .provider_settings(&id)
        .ok_or_else(|| DispatchError::UnknownProvider(id.clone()))?;
    let spec = find_by_name(&id).ok_or_else(|| {
        DispatchError::Configuration(format!("provider '{id}' is not supported"))
    })?;

    let legacy_key = match spec.kind {
        ProviderKind::VendorSdk => config.google_api_key.as_str(),
        _ if config.provider.trim().eq_ignore_ascii_case(&id) => config.api_key.as_str(),
        _ => "",
    };
    if settings.api_key.is_empty() && !legacy_key.is_empty() {
        debug!(provider = spec.display_name, "API key taken from legacy top-level field");
    }
    let mut api_key = first_non_empty(&settings.api_key, legacy_key);
    if api_key.is_empty() {
        if let Some(var) = spec.env_key {
            api_key = env(var).unwrap_or_default();
        }
    }

    let resolved = ResolvedProvider {
        spec,
        api_key,
        model: first_non_empty(&settings.model, &config.model),
        base_url: first_non_empty(&settings.base_url, &config.base_url),
        auth_header_name: auth_header_name(settings),
    };

    if spec.requires_api_key && resolved.api_key.is_empty() {
        return Err(DispatchError::Configuration(format!(
            "no API key set for {}",
            spec.display_name
        )));
    }
    if spec.kind != ProviderKind::VendorSdk && resolved.base_url.is_empty() {
        return Err(DispatchError::Configuration(format!(
            "no base URL set for {}",
            spec.display_name
        )));
    }

    debug!(
        provider = spec.display_name,
        model = %resolved.model,
        base_url = %resolved.base_url,
        "Resolved provider settings"
    );

    Ok(resolved)
}

fn first_non_empty(primary: &str, fallback: &str) -> String {
    let value = if primary.is_empty() { fallback } else { primary };
    value.to_string()
}

fn auth_header_name(settings: &ProviderSettings) -> String {
    settings
        .auth_header_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or("Authorization")
        .to_string()
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use snapask_core::config::default_providers;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn config_with_key(id: &str, key: &str) -> AppConfig {
        let mut config = AppConfig::default();
        config.providers.get_mut(id).unwrap().api_key = key.to_string();
        config
    }

    #[test]
    fn test_all_providers_have_unique_names() {
        let mut names: Vec<&str> = PROVIDERS.iter().map(|s| s.name).collect();
        let total = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), total, "Duplicate provider names found");
    }

    #[test]
    fn test_registry_matches_default_config() {
        let defaults = default_providers();
        assert_eq!(defaults.len(), PROVIDERS.len());
        for spec in PROVIDERS {
            assert!(defaults.contains_key(spec.name), "no default entry for {}", spec.name);
        }
    }

    #[test]
    fn test_kinds() {
        assert_eq!(find_by_name("groq").unwrap().kind, ProviderKind::OpenAiCompatible);
        assert_eq!(find_by_name("google").unwrap().kind, ProviderKind::VendorSdk);
        assert_eq!(find_by_name("custom").unwrap().kind, ProviderKind::CustomFallback);
        assert!(find_by_name("mistral").is_none());
    }

    #[test]
    fn test_resolve_uses_provider_entry() {
        let config = config_with_key("deepseek", "ds-key");
        let resolved = resolve_provider_with_env("deepseek", &config, no_env).unwrap();
        assert_eq!(resolved.api_key, "ds-key");
        assert_eq!(resolved.model, "deepseek-chat");
        assert_eq!(resolved.base_url, "https://api.deepseek.com");
        assert_eq!(resolved.spec.display_name, "DeepSeek");
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let config = config_with_key("openai", "sk-1");
        let resolved = resolve_provider_with_env(" OpenAI ", &config, no_env).unwrap();
        assert_eq!(resolved.spec.name, "openai");
    }

    #[test]
    fn test_resolve_falls_back_to_legacy_fields() {
        let mut config = AppConfig::default();
        config.provider = "together".to_string();
        config.api_key = "legacy-key".to_string();
        config.model = "legacy-model".to_string();
        config.base_url = "https://legacy.example/v1".to_string();
        let entry = config.providers.get_mut("together").unwrap();
        entry.model.clear();
        entry.base_url.clear();

        let resolved = resolve_provider_with_env("together", &config, no_env).unwrap();
        assert_eq!(resolved.api_key, "legacy-key");
        assert_eq!(resolved.model, "legacy-model");
        assert_eq!(resolved.base_url, "https://legacy.example/v1");
    }

    #[test]
    fn test_legacy_key_not_lent_to_other_providers() {
        let mut config = config_with_key("openai", "sk-openai");
        let openai = config.providers["openai"].clone();
        config.commit_provider("openai", openai);
        assert_eq!(config.api_key, "sk-openai");

        // groq has no key of its own and must not receive the OpenAI one
        let err = resolve_provider_with_env("groq", &config, no_env).unwrap_err();
        assert!(matches!(err, DispatchError::Configuration(_)));

        config.providers.get_mut("custom").unwrap().base_url = "https://llm.internal".into();
        let err = resolve_provider_with_env("custom", &config, no_env).unwrap_err();
        assert!(matches!(err, DispatchError::Configuration(_)));

        let resolved = resolve_provider_with_env("ollama", &config, no_env).unwrap();
        assert!(resolved.api_key.is_empty());
    }

    #[test]
    fn test_provider_entry_beats_legacy() {
        let mut config = config_with_key("groq", "gsk-entry");
        config.api_key = "legacy-key".to_string();
        let resolved = resolve_provider_with_env("groq", &config, no_env).unwrap();
        assert_eq!(resolved.api_key, "gsk-entry");
    }

    #[test]
    fn test_google_key_resolution_order() {
        let env = |key: &str| (key == "GOOGLE_API_KEY").then(|| "env-key".to_string());

        let config = AppConfig::default();
        let resolved = resolve_provider_with_env("google", &config, env).unwrap();
        assert_eq!(resolved.api_key, "env-key");

        let mut config = AppConfig::default();
        config.google_api_key = "legacy-google".to_string();
        let resolved = resolve_provider_with_env("google", &config, env).unwrap();
        assert_eq!(resolved.api_key, "legacy-google");

        config.providers.get_mut("google").unwrap().api_key = "entry-google".to_string();
        let resolved = resolve_provider_with_env("google", &config, env).unwrap();
        assert_eq!(resolved.api_key, "entry-google");
    }

    #[test]
    fn test_google_ignores_generic_legacy_key() {
        let mut config = AppConfig::default();
        config.api_key = "sk-openai".to_string();
        let err = resolve_provider_with_env("google", &config, no_env).unwrap_err();
        assert!(matches!(err, DispatchError::Configuration(_)));
    }

    #[test]
    fn test_env_only_consulted_for_vendor() {
        let env = |_: &str| Some("env-key".to_string());
        let config = AppConfig::default();
        let err = resolve_provider_with_env("openai", &config, env).unwrap_err();
        assert!(matches!(err, DispatchError::Configuration(_)));
    }

    #[test]
    fn test_empty_key_is_configuration_error() {
        for id in ["openai", "deepseek", "google", "groq", "together", "custom"] {
            let err = resolve_provider_with_env(id, &AppConfig::default(), no_env).unwrap_err();
            match err {
                DispatchError::Configuration(msg) => assert!(msg.contains("API key"), "{id}: {msg}"),
                other => panic!("{id}: expected Configuration, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_ollama_runs_without_key() {
        let resolved =
            resolve_provider_with_env("ollama", &AppConfig::default(), no_env).unwrap();
        assert!(resolved.api_key.is_empty());
        assert_eq!(resolved.base_url, "http://localhost:11434/v1");
    }

    #[test]
    fn test_empty_base_url_is_configuration_error() {
        let config = config_with_key("custom", "key");
        let err = resolve_provider_with_env("custom", &config, no_env).unwrap_err();
        match err {
            DispatchError::Configuration(msg) => assert!(msg.contains("base URL")),
            other => panic!("expected Configuration, got {other:?}"),
        }
    }

    #[test]
    fn test_google_needs_no_base_url() {
        let config = config_with_key("google", "AIza-test");
        let resolved = resolve_provider_with_env("google", &config, no_env).unwrap();
        assert!(resolved.base_url.is_empty());
    }

    #[test]
    fn test_unknown_provider() {
        let err = resolve_provider_with_env("mistral", &AppConfig::default(), no_env).unwrap_err();
        assert!(matches!(err, DispatchError::UnknownProvider(ref id) if id == "mistral"));
    }

    #[test]
    fn test_configured_but_unsupported_provider() {
        let mut config = AppConfig::default();
        config.providers.insert(
            "mistral".to_string(),
            ProviderSettings::new("mistral-large", "https://api.mistral.ai/v1"),
        );
        let err = resolve_provider_with_env("mistral", &config, no_env).unwrap_err();
        assert!(matches!(err, DispatchError::Configuration(_)));
    }

    #[test]
    fn test_auth_header_name_defaults() {
        let mut config = config_with_key("custom", "key");
        config.providers.get_mut("custom").unwrap().base_url = "https://x".to_string();
        let resolved = resolve_provider_with_env("custom", &config, no_env).unwrap();
        assert_eq!(resolved.auth_header_name, "Authorization");

        config.providers.get_mut("custom").unwrap().auth_header_name = Some("  ".to_string());
        let resolved = resolve_provider_with_env("custom", &config, no_env).unwrap();
        assert_eq!(resolved.auth_header_name, "Authorization");

        config.providers.get_mut("custom").unwrap().auth_header_name =
            Some("X-Api-Key".to_string());
        let resolved = resolve_provider_with_env("custom", &config, no_env).unwrap();
        assert_eq!(resolved.auth_header_name, "X-Api-Key");
    }
}
