//! PDF link discovery on HTML pages.
//!
//! Scans anchors, iframes, embeds and objects, resolves each reference
//! against the page URL and keeps the ones that point at a PDF (or at a known
//! generation endpoint).

use anyhow::{Context, Result};
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use url::Url;

use crate::http::HttpClient;

/// Element selector and the attribute holding its link.
const LINK_SOURCES: &[(&str, &str)] = &[
    ("a[href]", "href"),
    ("iframe[src]", "src"),
    ("embed[src]", "src"),
    ("object[data]", "data"),
];

/// Extracts every valid PDF link from `html`, resolved against `base_url`.
///
/// Relative, root-relative and absolute references are all accepted;
/// fragments are dropped so `a.pdf#page=2` and `a.pdf` count once.
pub fn extract_pdf_links(html: &str, base_url: &str) -> BTreeSet<String> {
    let base = Url::parse(base_url).ok();
    let document = Html::parse_document(html);
    let mut out = BTreeSet::new();

    for (css, attr) in LINK_SOURCES {
        let Ok(selector) = Selector::parse(css) else {
            continue;
        };
        for element in document.select(&selector) {
            let Some(raw) = element.value().attr(attr) else {
                continue;
            };
            if let Some(link) = resolve_link(base.as_ref(), raw) {
                if is_valid_pdf_link(&link) {
                    out.insert(link.to_string());
                }
            }
        }
    }

    out
}

/// Resolve `raw` against `base`; absolute URLs pass through. Fragment removed.
pub fn resolve_link(base: Option<&Url>, raw: &str) -> Option<Url> {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with('#') {
        return None;
    }
    let mut url = match Url::parse(raw) {
        Ok(u) => u,
        Err(url::ParseError::RelativeUrlWithoutBase) => base?.join(raw).ok()?,
        Err(_) => return None,
    };
    url.set_fragment(None);
    Some(url)
}

/// Link validity rules: http(s) only, and either a `.pdf` path
/// (case-insensitive, query ignored) or a generation endpoint.
pub fn is_valid_pdf_link(url: &Url) -> bool {
    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }
    if url.path().to_ascii_lowercase().ends_with(".pdf") {
        return true;
    }
    is_generator_endpoint(url)
}

/// PIB's print endpoint: `PrintRelease.aspx?relid=<n>` (or `PRID=<n>`).
pub fn is_generator_endpoint(url: &Url) -> bool {
    url.path().to_ascii_lowercase().ends_with("/printrelease.aspx")
        && url.query_pairs().any(|(k, v)| {
            (k.eq_ignore_ascii_case("relid") || k.eq_ignore_ascii_case("prid"))
                && !v.is_empty()
                && v.bytes().all(|b| b.is_ascii_digit())
        })
}

/// GET `page_url` and return the PDF links on it.
pub fn fetch_pdf_links(http: &HttpClient, page_url: &str) -> Result<BTreeSet<String>> {
    let resp = http
        .get(page_url)
        .with_context(|| format!("fetch page {page_url}"))?;
    let links = extract_pdf_links(&resp.text(), page_url);
    tracing::debug!(page = page_url, count = links.len(), "scanned page for PDF links");
    Ok(links)
}
