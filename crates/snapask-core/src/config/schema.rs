//! Configuration schema.
//!
//! Hierarchy: `AppConfig` → `providers: { <id> → ProviderSettings }`.
//!
//! JSON on disk uses **snake_case** keys so files written by earlier releases
//! keep loading. Keys this release does not know about are carried through
//! `extra` maps and written back untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration, loaded from `~/.snapask/config.json`.
///
/// Passed explicitly into the dispatcher; there is no process-wide instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Active provider id (e.g. `"google"`, `"openai"`).
    pub provider: String,
    /// UI theme name (`"dark"` / `"light"`).
    pub theme: String,
    /// Global capture hotkey, e.g. `"ctrl+b"`.
    pub hotkey: String,
    /// Path to the `tesseract` executable.
    pub tesseract_path: String,
    /// Directory where captured regions are stored.
    pub screenshot_dir: String,
    /// Legacy top-level API key, used when a provider entry has none.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub api_key: String,
    /// Legacy top-level model, used when a provider entry has none.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub model: String,
    /// Legacy top-level base URL, used when a provider entry has none.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub base_url: String,
    /// Legacy Google key.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub google_api_key: String,
    /// Per-provider settings keyed by provider id.
    pub providers: BTreeMap<String, ProviderSettings>,
    /// Unknown top-level keys, preserved on save.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            provider: "google".to_string(),
            theme: "dark".to_string(),
            hotkey: "ctrl+b".to_string(),
            tesseract_path: default_tesseract_path().to_string(),
            screenshot_dir: crate::utils::get_default_screenshot_path()
                .to_string_lossy()
                .into_owned(),
            api_key: String::new(),
            model: String::new(),
            base_url: String::new(),
            google_api_key: String::new(),
            providers: default_providers(),
            extra: Map::new(),
        }
    }
}

impl AppConfig {
    /// Fill in every default provider id missing from `providers`.
    ///
    /// Entries already present are kept as they are, so the merge is key-wise:
    /// a provider id introduced by a newer release shows up with its default
    /// (empty-key) settings instead of being absent.
    pub fn merge_default_providers(&mut self) {
        for (id, settings) in default_providers() {
            self.providers.entry(id).or_insert(settings);
        }
    }

    /// Get the settings for a provider id.
    pub fn provider_settings(&self, id: &str) -> Option<&ProviderSettings> {
        self.providers.get(id)
    }

    /// Settings of the active provider, if configured.
    pub fn active_provider_settings(&self) -> Option<&ProviderSettings> {
        self.provider_settings(&self.provider)
    }

    /// Store settings for `id` and make it the active provider.
    ///
    /// Also mirrors the key and model into the legacy top-level fields,
    /// which older releases read directly.
    pub fn commit_provider(&mut self, id: &str, settings: ProviderSettings) {
        self.api_key = settings.api_key.clone();
        self.model = settings.model.clone();
        self.provider = id.to_string();
        self.providers.insert(id.to_string(), settings);
    }
}

fn default_tesseract_path() -> &'static str {
    if cfg!(windows) {
        r"C:\Program Files\Tesseract-OCR\tesseract.exe"
    } else {
        "tesseract"
    }
}

// ─────────────────────────────────────────────
// Providers
// ─────────────────────────────────────────────

/// Configuration for a single LLM provider.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// API key for authentication.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
    /// API base URL.
    pub base_url: String,
    /// Header carrying the key for the generic custom shape.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_header_name: Option<String>,
    /// Provider-specific keys we don't interpret (e.g. `region`).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProviderSettings {
    pub fn new(model: &str, base_url: &str) -> Self {
        Self {
            model: model.to_string(),
            base_url: base_url.to_string(),
            ..Default::default()
        }
    }

    /// Whether this provider has a configured API key.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

/// The built-in provider table every loaded config is merged against.
pub fn default_providers() -> BTreeMap<String, ProviderSettings> {
    let mut google = ProviderSettings::new("gemini-2.0-flash", "");
    google.extra.insert("region".to_string(), Value::String(String::new()));
    google.extra.insert("project_id".to_string(), Value::String(String::new()));

    let mut custom = ProviderSettings::new("", "");
    custom.auth_header_name = Some("Authorization".to_string());

    let entries = [
        (
            "openai",
            ProviderSettings::new("gpt-4o-mini", "https://api.openai.com/v1"),
        ),
        (
            "deepseek",
            ProviderSettings::new("deepseek-chat", "https://api.deepseek.com"),
        ),
        ("google", google),
        (
            "groq",
            ProviderSettings::new("llama-3.3-70b-versatile", "https://api.groq.com/openai/v1"),
        ),
        (
            "together",
            ProviderSettings::new("meta-llama/Llama-3-70b-chat-hf", "https://api.together.ai/v1"),
        ),
        (
            "ollama",
            ProviderSettings::new("llama3.2", "http://localhost:11434/v1"),
        ),
        ("custom", custom),
    ];

    entries
        .into_iter()
        .map(|(id, settings)| (id.to_string(), settings))
        .collect()
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
