//! `snapask status` / `snapask providers`: show configuration and providers.

use anyhow::Result;
use colored::Colorize;

use snapask_core::config::{get_config_path, load_config, AppConfig};
use snapask_core::instance::running_instance;
use snapask_core::utils::{expand_home, mask_secret};
use snapask_core::InstanceLock;
use snapask_providers::{resolve_provider, PROVIDERS};

use crate::helpers::kind_label;

/// Run the status command.
pub fn run() -> Result<()> {
    let config = load_config(None);
    let config_path = get_config_path();

    println!();
    println!("{}", "📸 SnapAsk Status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        found_marker(config_path.exists())
    );

    let screenshots = expand_home(&config.screenshot_dir);
    println!(
        "  {:<18} {} {}",
        "Screenshots:".bold(),
        screenshots.display(),
        found_marker(screenshots.exists())
    );

    println!("  {:<18} {}", "Tesseract:".bold(), config.tesseract_path);
    println!("  {:<18} {}", "Hotkey:".bold(), config.hotkey);

    let instance = match running_instance(&InstanceLock::default_path()) {
        Some(pid) => format!("running (pid {pid})"),
        None => "not running".dimmed().to_string(),
    };
    println!("  {:<18} {}", "Chat session:".bold(), instance);

    println!();
    println!("  {:<18} {}", "Active provider:".bold(), active_summary(&config));

    println!();
    println!("  {}", "Providers:".bold());
    for spec in PROVIDERS {
        let key = config
            .provider_settings(spec.name)
            .map(|s| s.api_key.as_str())
            .unwrap_or_default();
        let status = if !key.is_empty() {
            format!("{} key {}", "✓".green(), mask_secret(key))
        } else if !spec.requires_api_key {
            format!("{}", "✓ no key needed".green())
        } else {
            format!("{}", "· not configured".dimmed())
        };
        println!("    {:<20} {}", spec.display_name, status);
    }

    println!();

    Ok(())
}

/// Run the providers command.
pub fn list_providers() {
    println!();
    println!("{}", "📸 Supported providers".cyan().bold());
    println!();
    for spec in PROVIDERS {
        println!(
            "  {:<10} {:<16} {}",
            spec.name.bold(),
            spec.display_name,
            kind_label(spec.kind).dimmed()
        );
    }
    println!();
}

/// One-line description of the active provider after fallbacks are applied.
fn active_summary(config: &AppConfig) -> String {
    match resolve_provider(&config.provider, config) {
        Ok(resolved) => {
            let model = if resolved.model.is_empty() {
                "(default model)"
            } else {
                resolved.model.as_str()
            };
            format!("{} {} {}", config.provider, "·".dimmed(), model)
        }
        Err(e) => format!("{} {}", config.provider, format!("({e})").red()),
    }
}

fn found_marker(exists: bool) -> String {
    if exists {
        "✓".green().to_string()
    } else {
        "(not found)".red().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_summary_reports_model() {
        let mut config = AppConfig::default();
        config.provider = "ollama".into();
        let summary = active_summary(&config);
        assert!(summary.contains("ollama"));
        assert!(summary.contains("llama3.2"));
    }

    #[test]
    fn active_summary_reports_problem() {
        let mut config = AppConfig::default();
        config.provider = "openai".into();
        let summary = active_summary(&config);
        assert!(summary.contains("API key"), "{summary}");
    }
}
