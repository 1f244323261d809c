//! Press-release identifiers (PRID).
//!
//! PIB pages carry the release id in the query string
//! (`PressReleaseIframePage.aspx?PRID=2138823`); the id names the output file
//! and fills in the direct generation endpoints.

use regex::Regex;
use std::sync::OnceLock;

fn prid_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)\bprid=(\d+)").expect("PRID pattern is valid"))
}

/// Extracts the digits following `PRID=` (key matched case-insensitively).
pub fn extract_prid(url: &str) -> Option<String> {
    prid_pattern()
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Expands each template's `{prid}` placeholder. Templates without the
/// placeholder are skipped; they would fetch the same URL for every release.
pub fn generator_urls(prid: &str, templates: &[String]) -> Vec<String> {
    templates
        .iter()
        .filter(|t| t.contains("{prid}"))
        .map(|t| t.replace("{prid}", prid))
        .collect()
}

/// Local file name for a release: `pib_<prid>.pdf`.
pub fn pdf_filename(prid: &str) -> String {
    format!("pib_{prid}.pdf")
}
