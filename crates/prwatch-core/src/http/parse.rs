//! Parse HTTP response header lines into ResponseMeta.

/// Response headers the fetcher cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseMeta {
    /// `Content-Type` without parameters, lowercased (e.g. `application/pdf`).
    pub content_type: Option<String>,
    /// Declared body size; checked against the received body.
    pub content_length: Option<u64>,
    /// Raw `Content-Disposition` value (filename hint).
    pub content_disposition: Option<String>,
}

/// Parse collected header lines into ResponseMeta.
///
/// With redirects followed, curl reports the headers of every hop; a status
/// line starts a new block so only the final response counts.
pub(crate) fn parse_headers(lines: &[String]) -> ResponseMeta {
    let mut meta = ResponseMeta::default();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("HTTP/") {
            meta = ResponseMeta::default();
            continue;
        }
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let name = name.trim();
        let value = value.trim();
        if name.eq_ignore_ascii_case("content-type") {
            let mime = value.split(';').next().unwrap_or_default().trim();
            meta.content_type = Some(mime.to_ascii_lowercase());
        } else if name.eq_ignore_ascii_case("content-length") {
            meta.content_length = value.parse::<u64>().ok();
        } else if name.eq_ignore_ascii_case("content-disposition") {
            meta.content_disposition = Some(value.to_string());
        }
    }

    meta
}
