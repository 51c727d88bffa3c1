//! OCR: runs the `tesseract` binary on a captured image.
//!
//! Failures never propagate: they come back as an inline `[OCR error: ...]`
//! string that ends up in the context box like any recognized text.

use std::path::Path;

use tokio::process::Command;
use tracing::debug;

use snapask_core::utils::expand_home;

/// Recognition languages passed to tesseract.
const LANGUAGES: &str = "eng+rus";
/// Page segmentation mode: a single uniform block of text.
const PAGE_SEGMENTATION_MODE: &str = "6";

/// Recognize the text in `image` with the tesseract binary at `tesseract`.
pub async fn extract_text(tesseract: &str, image: &Path) -> String {
    let binary = expand_home(tesseract);
    debug!(binary = %binary.display(), image = %image.display(), "running OCR");

    let output = Command::new(&binary)
        .arg(image)
        .arg("stdout")
        .args(["-l", LANGUAGES, "--psm", PAGE_SEGMENTATION_MODE])
        .output()
        .await;

    match output {
        Ok(output) if output.status.success() => {
            String::from_utf8_lossy(&output.stdout).trim().to_string()
        }
        Ok(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = match stderr.trim() {
                "" => format!("tesseract exited with {}", output.status),
                msg => msg.to_string(),
            };
            format!("[OCR error: {reason}]")
        }
        Err(e) => format!("[OCR error: {e}]"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_binary_reported_inline() {
        let text = extract_text("/nonexistent/bin/tesseract", Path::new("shot.png")).await;
        assert!(text.starts_with("[OCR error:"), "{text}");
        assert!(text.ends_with(']'));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn passes_expected_arguments() {
        // `echo` stands in for tesseract and prints the arguments it got
        let text = extract_text("echo", Path::new("shot.png")).await;
        assert_eq!(text, "shot.png stdout -l eng+rus --psm 6");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_exit_status_reported_inline() {
        let text = extract_text("false", Path::new("shot.png")).await;
        assert!(text.starts_with("[OCR error: tesseract exited with"), "{text}");
    }
}
