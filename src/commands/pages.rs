//! `routesync pages` command.

use std::fmt::Write as _;
use std::io::Write;

use serde_json::json;

use super::emit;
use crate::cli::OutputFormat;
use crate::config::ReconcileConfig;
use crate::inventory::scan_pages;
use crate::pipeline::scan_options;

/// Execute the `pages` command: lists the page inventory.
///
/// # Errors
///
/// Returns an error string if the pages root cannot be walked.
pub fn run(
    config: &ReconcileConfig,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<(), String> {
    let inventory = scan_pages(&config.pages_root, &scan_options(config))
        .map_err(|e| format!("Failed to scan pages: {e}"))?;

    if format == OutputFormat::Json {
        let value = json!({ "files": inventory.files, "skipped": inventory.skipped });
        let text = serde_json::to_string_pretty(&value)
            .map_err(|e| format!("Failed to render pages: {e}"))?;
        return emit(out, &text);
    }

    if inventory.files.is_empty() {
        return emit(out, "No page files found.");
    }
    let width = inventory.files.iter().map(|f| f.relative_path.len()).max().unwrap_or(4).max(4);
    let mut text = String::new();
    let _ = writeln!(text, "{:<width$}  TOKENS", "FILE");
    let _ = writeln!(text, "{:-<width$}  {:-<6}", "", "");
    for file in &inventory.files {
        let tokens: Vec<&str> = file.tokens.iter().map(String::as_str).collect();
        let _ = writeln!(text, "{:<width$}  {}", file.relative_path, tokens.join(" "));
    }
    let _ = write!(
        text,
        "\n{} file(s), {} skipped.",
        inventory.files.len(),
        inventory.skipped.len()
    );
    emit(out, &text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_files_with_tokens() {
        let dir = tempfile::tempdir().unwrap();
        let pages = dir.path().join("pages");
        std::fs::create_dir_all(pages.join("reports")).unwrap();
        std::fs::write(pages.join("reports/QuarterlySummary.vue"), "").unwrap();
        std::fs::write(pages.join("Draft.vue"), "").unwrap();
        let config = ReconcileConfig::with_roots(&dir.path().join("router.js"), &pages);

        let mut out = Vec::new();
        run(&config, OutputFormat::Text, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("reports/QuarterlySummary.vue  quarterly reports summary"));
        assert!(text.contains("1 file(s), 1 skipped."));
    }

    #[test]
    fn empty_inventory_says_so() {
        let dir = tempfile::tempdir().unwrap();
        let config = ReconcileConfig::with_roots(&dir.path().join("router.js"), dir.path());
        let mut out = Vec::new();
        run(&config, OutputFormat::Json, &mut out).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["files"].as_array().map(Vec::len), Some(0));
    }
}
