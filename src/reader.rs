use std::fs;
use std::path::Path;
use std::process::Command;

use anyhow::{bail, Context, Result};
use tracing::info;

/// Document Text Provider: hands the core already-decoded plain text.
/// `.pdf` inputs are rendered with a `pdftotext` shell-out; anything else is
/// read as UTF-8 text. Read or decode failures are hard errors — the run
/// performs no computation on unreadable input.
pub fn read_report_text(path: &Path) -> Result<String> {
    let is_pdf = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

    if is_pdf {
        let text = extract_text_with_pdftotext(path)?;
        info!(path = %path.display(), chars = text.len(), "extracted PDF text");
        return Ok(text);
    }

    fs::read_to_string(path)
        .with_context(|| format!("failed to read report text: {}", path.display()))
}

fn extract_text_with_pdftotext(path: &Path) -> Result<String> {
    let output = Command::new("pdftotext")
        .arg("-enc")
        .arg("UTF-8")
        .arg(path)
        .arg("-")
        .output()
        .with_context(|| format!("failed to execute pdftotext for {}", path.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "pdftotext returned non-zero exit status for {}: {}",
            path.display(),
            stderr.trim()
        );
    }

    let raw = String::from_utf8_lossy(&output.stdout);
    // Pages arrive separated by form feeds; the estimator wants one blob.
    Ok(raw.replace('\u{000C}', "\n").replace('\u{0000}', ""))
}
