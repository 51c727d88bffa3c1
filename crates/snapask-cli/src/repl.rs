//! Interactive REPL: capture context once, ask as many questions as needed.
//!
//! Uses `rustyline` for readline-style editing with persistent history.

use std::sync::Arc;

use anyhow::Result;
use rustyline::config::Configurer;
use rustyline::history::DefaultHistory;
use rustyline::{DefaultEditor, Editor};
use tracing::debug;

use snapask_core::config::AppConfig;
use snapask_core::utils::get_history_path;
use snapask_core::{build_prompt, QUICK_QUESTIONS};

use crate::{helpers, ocr, worker};

/// Exit commands (case-insensitive match).
const EXIT_COMMANDS: &[&str] = &["exit", "quit", "/exit", "/quit", ":q"];

/// A parsed line of REPL input.
#[derive(Debug, PartialEq, Eq)]
enum ReplCommand<'a> {
    Exit,
    Help,
    /// Run OCR on an image and use its text as context.
    Ocr(&'a str),
    /// Replace the context; `None` shows the current one.
    Context(Option<&'a str>),
    Clear,
    /// Ask quick question `n` (1-based).
    Quick(usize),
    /// Switch provider for the rest of the session.
    Provider(&'a str),
    Ask(&'a str),
    Invalid(String),
}

fn parse_command(input: &str) -> ReplCommand<'_> {
    let trimmed = input.trim();
    if is_exit_command(trimmed) {
        return ReplCommand::Exit;
    }
    if !trimmed.starts_with('/') {
        return ReplCommand::Ask(trimmed);
    }

    let (name, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (trimmed, ""),
    };

    match name {
        "/help" => ReplCommand::Help,
        "/clear" => ReplCommand::Clear,
        "/ocr" if arg.is_empty() => ReplCommand::Invalid("usage: /ocr <image path>".into()),
        "/ocr" => ReplCommand::Ocr(arg),
        "/context" if arg.is_empty() => ReplCommand::Context(None),
        "/context" => ReplCommand::Context(Some(arg)),
        "/provider" if arg.is_empty() => {
            ReplCommand::Invalid("usage: /provider <id>".into())
        }
        "/provider" => ReplCommand::Provider(arg),
        "/quick" => match arg.parse::<usize>() {
            Ok(n) if (1..=QUICK_QUESTIONS.len()).contains(&n) => ReplCommand::Quick(n),
            _ => ReplCommand::Invalid(format!(
                "usage: /quick <1-{}>",
                QUICK_QUESTIONS.len()
            )),
        },
        other => ReplCommand::Invalid(format!("unknown command {other}, try /help")),
    }
}

/// Run the interactive REPL loop.
///
/// `provider` is the session's provider. Switching it never touches the
/// loaded config, whose `provider` stays the saved active one.
pub async fn run(
    config: AppConfig,
    mut provider: String,
    initial_context: Option<String>,
) -> Result<()> {
    helpers::print_banner(&provider);

    let mut context = initial_context.unwrap_or_default();
    if !context.is_empty() {
        helpers::print_context(&context);
    }

    let config = Arc::new(config);
    let (tx, mut rx) = worker::answer_channel();
    let mut next_request_id: u64 = 0;

    let mut editor = create_editor()?;

    loop {
        let input = match editor.readline("You: ") {
            Ok(line) => line,
            Err(rustyline::error::ReadlineError::Interrupted) => break,
            Err(rustyline::error::ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        };

        if input.trim().is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(&input);

        let (question, preset) = match parse_command(&input) {
            ReplCommand::Exit => {
                println!("\nGoodbye! 👋");
                break;
            }
            ReplCommand::Help => {
                print_help();
                continue;
            }
            ReplCommand::Ocr(path) => {
                let image = helpers::expand_tilde(path);
                context = ocr::extract_text(&config.tesseract_path, &image).await;
                helpers::print_context(&context);
                continue;
            }
            ReplCommand::Context(Some(text)) => {
                context = text.to_string();
                helpers::print_context(&context);
                continue;
            }
            ReplCommand::Context(None) => {
                helpers::print_context(&context);
                continue;
            }
            ReplCommand::Clear => {
                context.clear();
                println!("Context cleared.");
                continue;
            }
            ReplCommand::Provider(id) => {
                provider = id.to_lowercase();
                println!("Provider: {provider}");
                continue;
            }
            ReplCommand::Invalid(msg) => {
                eprintln!("{msg}");
                continue;
            }
            ReplCommand::Quick(n) => (String::new(), Some(QUICK_QUESTIONS[n - 1])),
            ReplCommand::Ask(question) => (question.to_string(), None),
        };

        let prompt = match build_prompt(&context, &question, preset) {
            Ok(prompt) => prompt,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };

        next_request_id += 1;
        debug!(request_id = next_request_id, provider = %provider, "sending request");
        worker::spawn_request(
            Arc::clone(&config),
            provider.clone(),
            prompt,
            next_request_id,
            tx.clone(),
        );

        helpers::print_thinking();
        // Answers from earlier requests that arrive late are shown too
        while let Some(answer) = rx.recv().await {
            helpers::clear_thinking();
            helpers::print_answer(&answer);
            if answer.request_id == next_request_id {
                break;
            }
        }
    }

    save_history(&mut editor);

    Ok(())
}

fn print_help() {
    println!();
    println!("  <question>          ask about the current context");
    println!("  /ocr <image>        recognize text in an image and use it as context");
    println!("  /context [text]     show or replace the context");
    println!("  /clear              clear the context");
    for (i, question) in QUICK_QUESTIONS.iter().enumerate() {
        println!("  /quick {}            {}", i + 1, question);
    }
    println!("  /provider <id>      switch provider for this session");
    println!("  exit                quit");
    println!();
}

/// Create a rustyline editor with history.
fn create_editor() -> Result<Editor<(), DefaultHistory>> {
    let mut editor = DefaultEditor::new()?;
    editor.set_max_history_size(1000)?;

    let history_path = get_history_path();
    if history_path.exists() {
        let _ = editor.load_history(&history_path);
        debug!("loaded REPL history from {}", history_path.display());
    }

    Ok(editor)
}

/// Save history to disk.
fn save_history(editor: &mut Editor<(), DefaultHistory>) {
    let path = get_history_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = editor.save_history(&path) {
        debug!("failed to save history: {e}");
    }
}

/// Check if input is an exit command.
fn is_exit_command(input: &str) -> bool {
    let lower = input.to_lowercase();
    EXIT_COMMANDS.contains(&lower.as_str())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
