//! Shared CLI helpers: path expansion, answer printing, banner.

use std::path::PathBuf;

use colored::Colorize;

use snapask_core::utils::truncate_string;
use snapask_providers::ProviderKind;

use crate::worker::Answer;

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_next::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs_next::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Print an answer (or its diagnostic) to stdout.
pub fn print_answer(answer: &Answer) {
    println!();
    if answer.is_error {
        println!("{}", answer.text.red());
    } else {
        println!("{}", "📸 SnapAsk".cyan().bold());
        if answer.text.is_empty() {
            println!("{}", "(empty answer)".dimmed());
        } else {
            println!("{}", answer.text);
        }
    }
    println!();
}

/// Show the start of the current context.
pub fn print_context(context: &str) {
    if context.trim().is_empty() {
        println!("{}", "(no context)".dimmed());
    } else {
        println!("{} {}", "Context:".bold(), truncate_string(context.trim(), 300).dimmed());
    }
}

/// Print the banner shown at REPL start.
pub fn print_banner(provider: &str) {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}  v{}", "📸 SnapAsk".cyan().bold(), version.dimmed());
    println!("{} {}", "Provider:".dimmed(), provider);
    println!(
        "{}",
        "Type a question, /help for commands, or \"exit\" to quit.".dimmed()
    );
    println!();
}

/// Print a "thinking" placeholder while a request is in flight.
pub fn print_thinking() {
    eprint!("{}", "⠿ thinking...".dimmed());
}

/// Clear the "thinking" placeholder.
pub fn clear_thinking() {
    eprint!("\r{}\r", " ".repeat(40));
}

/// Short label for a provider's call shape.
pub fn kind_label(kind: ProviderKind) -> &'static str {
    match kind {
        ProviderKind::OpenAiCompatible => "OpenAI-compatible",
        ProviderKind::VendorSdk => "vendor API",
        ProviderKind::CustomFallback => "custom (with fallback)",
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
