//! Utility helpers: path resolution and string manipulation.

use std::path::PathBuf;

/// Get the SnapAsk data directory (e.g. `~/.snapask/`).
pub fn get_data_path() -> PathBuf {
    let home = home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".snapask")
}

/// Get the default screenshot directory (e.g. `~/.snapask/screenshots/`).
pub fn get_default_screenshot_path() -> PathBuf {
    get_data_path().join("screenshots")
}

/// Get the REPL history file (e.g. `~/.snapask/history/cli_history`).
pub fn get_history_path() -> PathBuf {
    get_data_path().join("history").join("cli_history")
}

/// Truncate a string to `max_len` characters, adding "..." if truncated.
/// Unicode-safe.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

/// Mask a secret for display, keeping only the last four characters.
pub fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= 4 {
        return "*".repeat(count);
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("{}{}", "*".repeat(count - 4), tail)
}

/// Expand `~` to the home directory in a path string.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(rest)
    } else if path == "~" {
        home_dir().unwrap_or_else(|| PathBuf::from("."))
    } else {
        PathBuf::from(path)
    }
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| std::env::var("USERPROFILE").ok().map(PathBuf::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_string() {
        assert_eq!(truncate_string("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_long_string() {
        let result = truncate_string("hello world, this is a long string", 15);
        assert_eq!(result, "hello world,...");
    }

    #[test]
    fn test_truncate_unicode() {
        assert_eq!(truncate_string("Привет, мир!", 6), "При...");
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("sk-abcdef1234"), "*********1234");
        assert_eq!(mask_secret("abc"), "***");
        assert_eq!(mask_secret(""), "");
    }

    #[test]
    fn test_expand_home_tilde() {
        let expanded = expand_home("~/shots");
        assert!(!expanded.starts_with("~"));
        assert!(expanded.ends_with("shots"));
    }

    #[test]
    fn test_expand_home_absolute() {
        assert_eq!(expand_home("/tmp/shots"), PathBuf::from("/tmp/shots"));
    }

    #[test]
    fn test_data_path_ends_with_snapask() {
        assert!(get_data_path().ends_with(".snapask"));
        assert!(get_history_path().ends_with("history/cli_history"));
        assert!(get_default_screenshot_path().ends_with("screenshots"));
    }
}
