//! Prompt building: recognized screen text + the user's question.
//!
//! Each request is stateless: the prompt is rebuilt from whatever context and
//! question are current, nothing from earlier answers is carried over.

use thiserror::Error;

/// One-click questions offered next to the question box.
pub const QUICK_QUESTIONS: [&str; 4] = [
    "What is this?",
    "Explain the meaning",
    "Summarize briefly",
    "Apply it in practice",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PromptError {
    #[error("enter a question or capture a screenshot first")]
    Empty,
}

/// Build the prompt sent to the provider.
///
/// `preset` is used only when the typed question is blank. Fails when both
/// the question and the context are blank.
pub fn build_prompt(
    context: &str,
    question: &str,
    preset: Option<&str>,
) -> Result<String, PromptError> {
    let mut question = question.trim();
    if question.is_empty() {
        question = preset.map(str::trim).unwrap_or_default();
    }
    let context = context.trim();

    if question.is_empty() && context.is_empty() {
        return Err(PromptError::Empty);
    }

    Ok(format!("{context}\n\nUser asks: {question}"))
}
