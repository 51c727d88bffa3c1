//! Config loader: reads `~/.snapask/config.json`, applies migrations, merges
//! defaults, applies env var overrides.
//!
//! # Loading precedence
//! 1. Defaults (from `AppConfig::default()`)
//! 2. JSON file at `~/.snapask/config.json` (top-level keys shallow-merged,
//!    `providers` merged per provider id)
//! 3. Environment variables `SNAPASK_<SECTION>__<FIELD>` (override JSON)

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::schema::AppConfig;

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default path + env vars.
///
/// Falls back to defaults if the file doesn't exist or can't be parsed.
/// Creates the screenshot directory if it is missing.
pub fn load_config(path: Option<&Path>) -> AppConfig {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    let config = load_config_from_path(&config_path);
    ensure_screenshot_dir(&config);
    config
}

/// Load config from a specific file path.
fn load_config_from_path(path: &Path) -> AppConfig {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return apply_env_overrides(AppConfig::default());
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return apply_env_overrides(AppConfig::default());
        }
    };

    // Parse JSON → Value first for migration
    let mut raw: Value = match serde_json::from_str(&content) {
        Ok(v) => v,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            return apply_env_overrides(AppConfig::default());
        }
    };

    migrate_config(&mut raw);

    let mut config: AppConfig = match serde_json::from_value(raw) {
        Ok(c) => c,
        Err(e) => {
            // Only reachable when the top level is not a JSON object
            warn!("Failed to deserialize config: {}", e);
            return apply_env_overrides(AppConfig::default());
        }
    };

    config.merge_default_providers();
    apply_env_overrides(config)
}

/// Save configuration to disk (pretty-printed JSON).
pub fn save_config(config: &AppConfig, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config).map_err(std::io::Error::other)?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Top-level fields that must be strings.
const STRING_FIELDS: &[&str] = &[
    "provider",
    "theme",
    "hotkey",
    "tesseract_path",
    "screenshot_dir",
    "api_key",
    "model",
    "base_url",
    "google_api_key",
];

/// Provider entry fields that must be strings.
const PROVIDER_STRING_FIELDS: &[&str] = &["api_key", "model", "base_url"];

/// Normalize hand-edited files before deserializing.
///
/// - provider ids (the active one and the `providers` keys) are lowercased
/// - `providers` entries that are not objects are dropped so defaults apply
/// - null or mistyped known fields are dropped so only that field falls back
///   to its default; everything else in the file is kept
fn migrate_config(raw: &mut Value) {
    let Some(obj) = raw.as_object_mut() else {
        return;
    };

    drop_mistyped(obj, STRING_FIELDS, "");

    if let Some(Value::String(provider)) = obj.get_mut("provider") {
        *provider = provider.trim().to_lowercase();
    }

    match obj.get_mut("providers") {
        Some(Value::Object(providers)) => {
            let entries = std::mem::take(providers);
            for (id, mut entry) in entries {
                let Some(fields) = entry.as_object_mut() else {
                    warn!("Migration: dropping malformed provider entry '{}'", id);
                    continue;
                };
                drop_mistyped(fields, PROVIDER_STRING_FIELDS, &id);
                if matches!(fields.get("auth_header_name"), Some(v) if !v.is_string() && !v.is_null()) {
                    warn!("Migration: dropping non-string {}.auth_header_name", id);
                    fields.remove("auth_header_name");
                }

                let normalized = id.trim().to_lowercase();
                if normalized != id {
                    debug!("Migration: provider id '{}' → '{}'", id, normalized);
                }
                providers.insert(normalized, entry);
            }
        }
        Some(_) => {
            warn!("Migration: replacing malformed providers section");
            obj.remove("providers");
        }
        None => {}
    }
}

/// Remove every field in `keys` whose value is present but not a string.
fn drop_mistyped(obj: &mut Map<String, Value>, keys: &[&str], section: &str) {
    for key in keys {
        if matches!(obj.get(*key), Some(v) if !v.is_string()) {
            if section.is_empty() {
                warn!("Migration: dropping non-string '{}', using default", key);
            } else {
                warn!("Migration: dropping non-string {}.{}", section, key);
            }
            obj.remove(*key);
        }
    }
}

fn ensure_screenshot_dir(config: &AppConfig) {
    let dir = crate::utils::expand_home(&config.screenshot_dir);
    if let Err(e) = std::fs::create_dir_all(&dir) {
        warn!("Failed to create screenshot dir {}: {}", dir.display(), e);
    }
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Env var format: `SNAPASK_<SECTION>__<FIELD>` (double underscore as delimiter).
///
/// Supported overrides:
/// - `SNAPASK_PROVIDER` → `provider`
/// - `SNAPASK_TESSERACT_PATH` → `tesseract_path`
/// - `SNAPASK_PROVIDERS__<ID>__API_KEY` → `providers.<id>.api_key`
/// - `SNAPASK_PROVIDERS__<ID>__MODEL` → `providers.<id>.model`
/// - `SNAPASK_PROVIDERS__<ID>__BASE_URL` → `providers.<id>.base_url`
fn apply_env_overrides(config: AppConfig) -> AppConfig {
    apply_env_overrides_with(config, |key| std::env::var(key).ok())
}

/// [`apply_env_overrides`] with an explicit env lookup.
fn apply_env_overrides_with<F>(mut config: AppConfig, env: F) -> AppConfig
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = env("SNAPASK_PROVIDER") {
        config.provider = val.trim().to_lowercase();
    }
    if let Some(val) = env("SNAPASK_TESSERACT_PATH") {
        config.tesseract_path = val;
    }

    for (id, settings) in config.providers.iter_mut() {
        let name = id.to_uppercase();
        if let Some(val) = env(&format!("SNAPASK_PROVIDERS__{name}__API_KEY")) {
            settings.api_key = val;
        }
        if let Some(val) = env(&format!("SNAPASK_PROVIDERS__{name}__MODEL")) {
            settings.model = val;
        }
        if let Some(val) = env(&format!("SNAPASK_PROVIDERS__{name}__BASE_URL")) {
            settings.base_url = val;
        }
    }

    config
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
