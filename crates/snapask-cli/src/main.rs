//! SnapAsk CLI: entry point.
//!
//! # Commands
//!
//! - `snapask ask [-q QUESTION] [--image PATH | --context TEXT]`: single-shot question
//! - `snapask chat [--image PATH]`: interactive REPL (single instance)
//! - `snapask settings [...]`: edit and save provider settings
//! - `snapask status`: show configuration and provider status
//! - `snapask providers`: list supported providers
//! - `snapask onboard`: create the config file and data directories

mod helpers;
mod ocr;
mod onboard;
mod repl;
mod settings_cmd;
mod status;
mod worker;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use snapask_core::config::load_config;
use snapask_core::{build_prompt, QUICK_QUESTIONS};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// 📸 SnapAsk: ask an AI about text on your screen
#[derive(Parser)]
#[command(name = "snapask", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask one question about a screenshot or a piece of text
    Ask {
        /// The question. May be omitted when --quick is given.
        #[arg(short, long, default_value = "")]
        question: String,

        /// Image to run OCR on; its text becomes the context
        #[arg(short, long, conflicts_with = "context")]
        image: Option<PathBuf>,

        /// Context text used instead of OCR
        #[arg(short, long)]
        context: Option<String>,

        /// Quick question number (1-4), used when no question is typed
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=4))]
        quick: Option<u8>,

        /// Provider id overriding the configured one
        #[arg(short, long)]
        provider: Option<String>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Interactive session: capture context, ask repeatedly
    Chat {
        /// Image to run OCR on before the first question
        #[arg(short, long)]
        image: Option<PathBuf>,

        /// Provider id overriding the configured one
        #[arg(short, long)]
        provider: Option<String>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Change and save provider settings
    Settings(settings_cmd::SettingsArgs),

    /// Show configuration and provider status
    Status,

    /// List supported providers
    Providers,

    /// Create the config file and data directories
    Onboard,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ask {
            question,
            image,
            context,
            quick,
            provider,
            logs,
        } => {
            init_logging(logs);
            run_ask(question, image, context, quick, provider).await
        }
        Commands::Chat {
            image,
            provider,
            logs,
        } => {
            init_logging(logs);
            run_chat(image, provider).await
        }
        Commands::Settings(args) => settings_cmd::run(args, None),
        Commands::Status => status::run(),
        Commands::Providers => {
            status::list_providers();
            Ok(())
        }
        Commands::Onboard => onboard::run(),
    }
}

// ─────────────────────────────────────────────
// Ask command
// ─────────────────────────────────────────────

async fn run_ask(
    question: String,
    image: Option<PathBuf>,
    context: Option<String>,
    quick: Option<u8>,
    provider: Option<String>,
) -> Result<()> {
    let config = Arc::new(load_config(None));

    let context = match (image, context) {
        (Some(image), _) => {
            let image = helpers::expand_tilde(&image.to_string_lossy());
            ocr::extract_text(&config.tesseract_path, &image).await
        }
        (None, Some(text)) => text,
        (None, None) => String::new(),
    };

    let preset = quick.map(|n| QUICK_QUESTIONS[usize::from(n) - 1]);
    let prompt = build_prompt(&context, &question, preset)?;
    let provider = provider.unwrap_or_else(|| config.provider.clone());

    info!(provider = %provider, "single-shot request");
    let (tx, mut rx) = worker::answer_channel();
    worker::spawn_request(Arc::clone(&config), provider, prompt, 1, tx);

    helpers::print_thinking();
    let answer = rx.recv().await.context("request task ended without an answer")?;
    helpers::clear_thinking();
    helpers::print_answer(&answer);

    if answer.is_error {
        bail!("request failed");
    }
    Ok(())
}

// ─────────────────────────────────────────────
// Chat command
// ─────────────────────────────────────────────

async fn run_chat(image: Option<PathBuf>, provider: Option<String>) -> Result<()> {
    let lock = snapask_core::InstanceLock::acquire(snapask_core::InstanceLock::default_path())
        .context("cannot start an interactive session")?;

    let config = load_config(None);
    let provider = provider.unwrap_or_else(|| config.provider.clone());

    let initial_context = match image {
        Some(image) => {
            let image = helpers::expand_tilde(&image.to_string_lossy());
            Some(ocr::extract_text(&config.tesseract_path, &image).await)
        }
        None => None,
    };

    let result = repl::run(config, provider, initial_context).await;
    drop(lock);
    result
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("snapask=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_ask_with_quick_question() {
        let cli = Cli::try_parse_from(["snapask", "ask", "--context", "E = mc^2", "--quick", "2"])
            .unwrap();
        match cli.command {
            Commands::Ask { context, quick, question, .. } => {
                assert_eq!(context.as_deref(), Some("E = mc^2"));
                assert_eq!(quick, Some(2));
                assert!(question.is_empty());
            }
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn quick_question_out_of_range_rejected() {
        assert!(Cli::try_parse_from(["snapask", "ask", "--quick", "5"]).is_err());
    }

    #[test]
    fn image_conflicts_with_context() {
        let parsed =
            Cli::try_parse_from(["snapask", "ask", "--image", "a.png", "--context", "x"]);
        assert!(parsed.is_err());
    }
}
