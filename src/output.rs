//! CLI output formatting for compile runs.
//!
//! The report leads with the page and where it was written, then lists each
//! declared asset by the placeholder that refers to it:
//!
//! ```text
//! Home → dist/Home
//!     @0@ img/logo.png → assets/9f86d081884c...
//!     @1@ css/site.css → assets/60303ae22b99...
//!     @2@ img/logo.png → assets/9f86d081884c...
//! 3 assets, 2 unique, stored in dist/assets
//! ```
//!
//! Each `format_*` function returns `Vec<String>` and does no I/O, so tests
//! can assert on exact lines. The `print_*` wrappers write to stdout.

use crate::types::CompileReport;
use std::path::Path;

/// Number of hash characters shown per asset. Full ids are in `--json`.
const SHORT_ID_LEN: usize = 12;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Shorten a long id for display, keeping the directory prefix intact.
fn short_url(url: &str) -> String {
    let (prefix, id) = match url.rsplit_once('/') {
        Some((prefix, id)) => (format!("{prefix}/"), id),
        None => (String::new(), url),
    };
    if id.len() > SHORT_ID_LEN {
        format!("{prefix}{}...", &id[..SHORT_ID_LEN])
    } else {
        url.to_string()
    }
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// Format the summary of a compiled document.
pub fn format_compile_output(report: &CompileReport) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!(
        "{} → {}",
        report.page_name,
        report.output_path.display()
    ));

    for asset in &report.assets {
        lines.push(format!(
            "{}@{}@ {} → {}",
            indent(1),
            asset.index,
            asset.source,
            short_url(&asset.url)
        ));
    }

    if report.assets.is_empty() {
        lines.push("No assets declared".to_string());
    } else {
        lines.push(format!(
            "{}, {} unique, stored in {}",
            plural(report.assets.len(), "asset"),
            report.unique_assets(),
            report.asset_dir.display()
        ));
    }
    lines
}

/// Format the notice for a document that opened with `@ignore`.
pub fn format_skipped(source: Option<&Path>) -> Vec<String> {
    let name = match source {
        Some(path) => path.display().to_string(),
        None => "<stdin>".to_string(),
    };
    vec![format!("Skipped {name} (@ignore)")]
}

/// Print compile output to stdout.
pub fn print_compile_output(report: &CompileReport) {
    for line in format_compile_output(report) {
        println!("{}", line);
    }
}

/// Print the skip notice to stdout.
pub fn print_skipped(source: Option<&Path>) {
    for line in format_skipped(source) {
        println!("{}", line);
    }
}
