//! Markdown → plain text sanitizer for model output.
//!
//! Model answers are displayed in a plain text box, so formatting syntax is
//! stripped while the text it wraps is kept. Steps run in a fixed order:
//!
//! 1. Code fences (```) removed, enclosed text kept (unterminated fences too)
//! 2. Inline code (`x`) → `x`
//! 3. Emphasis markers (`**`, `*`, `__`, `_`) removed everywhere
//! 4. Heading (`#`) and blockquote (`>`) prefixes removed at line starts,
//!    nested runs such as `>>>` included
//! 5. Tildes and backslashes removed
//! 6. Runs of spaces/tabs collapsed to one space
//! 7. Lines right-trimmed, 3+ newlines collapsed to 2, result trimmed
//!
//! Step 3 is a blunt character pass: literal asterisks and underscores
//! (`2*3`, `snake_case`) are removed as well.
//!
//! The whole pipeline repeats until the text stops changing. Every step only
//! removes characters, so this terminates, and the result is a fixed point.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;

const FENCE: &str = "```";

static FENCED_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```.*?```").expect("fenced block pattern"));
static INLINE_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"`([^`]+)`").expect("inline code pattern"));
static EMPHASIS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*|\*|__|_").expect("emphasis pattern"));
static HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|\n)#+\s*").expect("heading pattern"));
static BLOCKQUOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|\n)>\s*").expect("blockquote pattern"));
static LINE_PREFIX_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|\n)(?:#+\s*|>\s*)+").expect("line prefix pattern"));
static HORIZONTAL_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]{2,}").expect("whitespace pattern"));
static BLANK_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("blank line pattern"));

/// Strip Markdown formatting from `raw`, returning display-ready plain text.
pub fn sanitize(raw: &str) -> String {
    let mut current = clean_pass(raw);
    loop {
        let next = clean_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Sanitize an optional string; `None` becomes empty.
pub fn sanitize_opt(raw: Option<&str>) -> String {
    raw.map(sanitize).unwrap_or_default()
}

/// Sanitize an arbitrary JSON value.
///
/// `null` becomes empty, strings are sanitized as-is, anything else is
/// sanitized in its serialized form.
pub fn sanitize_value(raw: &Value) -> String {
    match raw {
        Value::Null => String::new(),
        Value::String(s) => sanitize(s),
        other => sanitize(&other.to_string()),
    }
}

fn clean_pass(text: &str) -> String {
    // 1. Fences: drop the markers of each paired block, then any leftovers
    let text = FENCED_BLOCK.replace_all(text, |caps: &Captures| caps[0].replace(FENCE, ""));
    let text = strip_stray_fences(text);

    // 2. Inline code
    let text = INLINE_CODE.replace_all(&text, "$1");

    // 3. Emphasis
    let text = EMPHASIS.replace_all(&text, "");

    // 4. Headings, then blockquotes
    let text = HEADING.replace_all(&text, "${1}");
    let text = BLOCKQUOTE.replace_all(&text, "${1}");
    // Nested prefixes (`>>>`, `> #`) in one go, not one per pass
    let text = LINE_PREFIX_RUN.replace_all(&text, "${1}");

    // 5. Tildes and backslashes
    let text = text.replace(|c: char| c == '~' || c == '\\', "");

    // 6. Horizontal whitespace
    let text = HORIZONTAL_RUN.replace_all(&text, " ");

    // 7. Line ends, blank runs, outer whitespace
    let joined = text.lines().map(str::trim_end).collect::<Vec<_>>().join("\n");
    let collapsed = BLANK_RUN.replace_all(&joined, "\n\n");

    collapsed.trim().to_string()
}

fn strip_stray_fences(text: Cow<'_, str>) -> Cow<'_, str> {
    if text.contains(FENCE) {
        Cow::Owned(text.replace(FENCE, ""))
    } else {
        text
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
