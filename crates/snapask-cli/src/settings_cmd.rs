//! `snapask settings`: edit provider settings and save them.
//!
//! Only the fields given on the command line change. Saving a provider also
//! makes it the active one.

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use snapask_core::config::{get_config_path, load_config, save_config, AppConfig};
use snapask_providers::find_by_name;

#[derive(Args, Debug, Default)]
pub struct SettingsArgs {
    /// Provider id to edit and activate (defaults to the active provider)
    #[arg(short, long)]
    pub provider: Option<String>,

    /// API key
    #[arg(long)]
    pub api_key: Option<String>,

    /// Model identifier
    #[arg(short, long)]
    pub model: Option<String>,

    /// API base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Header carrying the key for the custom provider's fallback request
    #[arg(long)]
    pub auth_header: Option<String>,

    /// Path to the tesseract executable
    #[arg(long)]
    pub tesseract_path: Option<String>,
}

impl SettingsArgs {
    fn touches_provider(&self) -> bool {
        self.provider.is_some()
            || self.api_key.is_some()
            || self.model.is_some()
            || self.base_url.is_some()
            || self.auth_header.is_some()
    }
}

/// Run the settings command against `config_path` (default location if `None`).
pub fn run(args: SettingsArgs, config_path: Option<&Path>) -> Result<()> {
    let mut config = load_config(config_path);
    let changed = apply(&mut config, args)?;

    if changed.is_empty() {
        println!("{}", "Nothing to change. See `snapask settings --help`.".dimmed());
        return Ok(());
    }

    let path = config_path.map(Path::to_path_buf).unwrap_or_else(get_config_path);
    save_config(&config, Some(&path))
        .with_context(|| format!("failed to save config to {}", path.display()))?;

    for field in &changed {
        println!("  {} {}", "✓".green(), field);
    }
    println!("  {} saved to {}", "✓".green(), path.display());
    Ok(())
}

/// Apply `args` to `config`, returning a line per changed field.
fn apply(config: &mut AppConfig, args: SettingsArgs) -> Result<Vec<String>> {
    let mut changed = Vec::new();

    if args.touches_provider() {
        let id = args
            .provider
            .as_deref()
            .unwrap_or(&config.provider)
            .trim()
            .to_lowercase();
        if find_by_name(&id).is_none() {
            bail!("unknown provider '{id}', see `snapask providers`");
        }

        let mut settings = config.provider_settings(&id).cloned().unwrap_or_default();
        if let Some(key) = args.api_key {
            settings.api_key = key.trim().to_string();
            changed.push(format!("{id}.api_key"));
        }
        if let Some(model) = args.model {
            settings.model = model.trim().to_string();
            changed.push(format!("{id}.model"));
        }
        if let Some(base_url) = args.base_url {
            settings.base_url = base_url.trim().to_string();
            changed.push(format!("{id}.base_url"));
        }
        if let Some(header) = args.auth_header {
            settings.auth_header_name = Some(header.trim().to_string());
            changed.push(format!("{id}.auth_header_name"));
        }

        config.commit_provider(&id, settings);
        changed.push(format!("active provider: {id}"));
    }

    if let Some(path) = args.tesseract_path {
        config.tesseract_path = path.trim().to_string();
        changed.push("tesseract_path".to_string());
    }

    Ok(changed)
}
