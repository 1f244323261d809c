//! Local filenames for downloaded and rendered PDFs.
//!
//! Press releases with a PRID are named `pib_<prid>.pdf`; everything else is
//! named from Content-Disposition or the URL path, sanitized, and forced to
//! a `.pdf` extension.

mod content_disposition;
mod path;
mod sanitize;

use crate::prid;

pub use content_disposition::parse_content_disposition_filename;
pub use path::filename_from_url_path;
pub use sanitize::{numbered_filename, sanitize_filename, truncate_filename};

/// Fallback when neither the response nor the URL yields a usable name.
const DEFAULT_FILENAME: &str = "download.pdf";

/// Derives a safe `.pdf` filename for a downloaded link.
///
/// Preference: PRID in the URL, then the Content-Disposition filename, then
/// the last URL path segment. The result never exceeds 255 bytes.
///
/// - `derive_filename("https://mospi.gov.in/docs/SDD_2024.pdf", None)` → `"SDD_2024.pdf"`
/// - `derive_filename("https://pib.gov.in/PrintRelease.aspx?relid=7", None)` → `"pib_7.pdf"`
pub fn derive_filename(url: &str, content_disposition: Option<&str>) -> String {
    if let Some(id) = prid::extract_prid(url).or_else(|| relid(url)) {
        return prid::pdf_filename(&id);
    }

    let candidate = content_disposition
        .and_then(parse_content_disposition_filename)
        .filter(|s| !s.is_empty())
        .or_else(|| filename_from_url_path(url));

    match candidate.map(|c| sanitize_filename(&c)) {
        Some(name) if !name.is_empty() => with_pdf_extension(&name),
        _ => DEFAULT_FILENAME.to_string(),
    }
}

/// Filename for a browser-rendered page: `pib_<prid>.pdf`, or the page's
/// last path segment with its extension swapped for `.pdf`.
pub fn page_pdf_filename(url: &str) -> String {
    if let Some(id) = prid::extract_prid(url) {
        return prid::pdf_filename(&id);
    }
    let stem = filename_from_url_path(url)
        .map(|name| match name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem.to_string(),
            _ => name,
        })
        .map(|s| sanitize_filename(&s))
        .filter(|s| !s.is_empty());
    match stem {
        Some(stem) => truncate_filename(&format!("{stem}.pdf")),
        None => "page.pdf".to_string(),
    }
}

fn with_pdf_extension(name: &str) -> String {
    if name.to_ascii_lowercase().ends_with(".pdf") {
        name.to_string()
    } else {
        truncate_filename(&format!("{name}.pdf"))
    }
}

/// `relid=<digits>` as used by the PIB print endpoint.
fn relid(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let value = parsed
        .query_pairs()
        .find(|(k, _)| k.eq_ignore_ascii_case("relid"))
        .map(|(_, v)| v.into_owned())?;
    (!value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_filename_from_url_path() {
        assert_eq!(
            derive_filename("https://mospi.gov.in/documents/213904/SDD_2024.pdf", None),
            "SDD_2024.pdf"
        );
        assert_eq!(
            derive_filename("https://example.org/files/Annual%20Report.PDF", None),
            "Annual_Report.PDF"
        );
    }

    #[test]
    fn derive_filename_prefers_release_id() {
        assert_eq!(
            derive_filename("https://pib.gov.in/PrintRelease.aspx?relid=2138823", None),
            "pib_2138823.pdf"
        );
        assert_eq!(
            derive_filename(
                "https://pib.gov.in/doc.pdf?PRID=5",
                Some("attachment; filename=\"other.pdf\"")
            ),
            "pib_5.pdf"
        );
    }

    #[test]
    fn derive_filename_content_disposition_overrides_url() {
        assert_eq!(
            derive_filename(
                "https://example.org/download?id=9",
                Some("attachment; filename=\"Bulletin May.pdf\"")
            ),
            "Bulletin_May.pdf"
        );
    }

    #[test]
    fn derive_filename_adds_extension_and_falls_back() {
        assert_eq!(derive_filename("https://example.org/get/report", None), "report.pdf");
        assert_eq!(derive_filename("https://example.org/", None), "download.pdf");
        assert_eq!(derive_filename("https://example.org/..", None), "download.pdf");
    }

    #[test]
    fn page_filename() {
        assert_eq!(
            page_pdf_filename("https://pib.gov.in/PressReleaseIframePage.aspx?PRID=2138823"),
            "pib_2138823.pdf"
        );
        assert_eq!(
            page_pdf_filename("https://example.org/news/release-12.html"),
            "release-12.pdf"
        );
        assert_eq!(page_pdf_filename("https://example.org/"), "page.pdf");
    }

    #[test]
    fn long_names_stay_within_name_max() {
        let url = format!("https://example.org/files/{}", "r".repeat(300));
        let name = derive_filename(&url, None);
        assert_eq!(name.len(), 255);
        assert!(name.ends_with(".pdf"));

        let page = format!("https://example.org/{}.html", "p".repeat(300));
        let name = page_pdf_filename(&page);
        assert!(name.len() <= 255);
        assert!(name.ends_with(".pdf"));
    }
}
