//! `snapask onboard`: create the config file and data directories.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use snapask_core::config::{load_config, save_config};
use snapask_core::utils::{expand_home, get_data_path};

/// Run the onboard command.
pub fn run() -> Result<()> {
    println!();
    println!("{}", "📸 SnapAsk Setup".cyan().bold());
    println!();

    setup(&get_data_path())?;

    println!();
    println!(
        "{}",
        "  Setup complete! Add a key with `snapask settings --provider <id> --api-key <key>`."
            .green()
    );
    println!();

    Ok(())
}

/// Create `config.json`, the screenshot directory and the history directory under `data_dir`.
fn setup(data_dir: &Path) -> Result<()> {
    let config_path = data_dir.join("config.json");

    let existed = config_path.exists();
    let config = load_config(Some(&config_path));
    // Rewritten even when present so provider ids added since then appear in it
    save_config(&config, Some(&config_path))?;
    let verb = if existed { "updated" } else { "created" };
    println!("  {} {} config at {}", "✓".green(), verb, config_path.display());

    let screenshots = expand_home(&config.screenshot_dir);
    std::fs::create_dir_all(&screenshots)?;
    println!("  {} screenshots at {}", "✓".green(), screenshots.display());

    let history_dir = data_dir.join("history");
    std::fs::create_dir_all(&history_dir)?;
    println!("  {} history at {}", "✓".green(), history_dir.display());

    Ok(())
}
