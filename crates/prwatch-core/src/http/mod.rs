//! Blocking HTTP transport.
//!
//! Uses the curl crate (libcurl) for page GETs, PDF fetches and the webhook
//! POST. Every call runs in the current thread; call from `spawn_blocking`
//! when used from async code.

mod parse;

use std::str;
use std::time::Duration;

use crate::config::PrwatchConfig;
use crate::retry::{run_with_retry, FetchError, RetryPolicy};

pub use parse::ResponseMeta;

/// Maximum redirects followed per request.
const MAX_REDIRECTS: u32 = 10;

/// Transport settings shared by every request.
#[derive(Debug, Clone)]
pub struct HttpOptions {
    pub connect_timeout: Duration,
    pub timeout: Duration,
    pub user_agent: String,
    pub retry: RetryPolicy,
}

impl HttpOptions {
    pub fn from_config(cfg: &PrwatchConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            timeout: Duration::from_secs(cfg.request_timeout_secs),
            user_agent: cfg.user_agent.clone(),
            retry: RetryPolicy::from(&cfg.retry_config()),
        }
    }
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self::from_config(&PrwatchConfig::default())
    }
}

/// A completed 2xx response held in memory.
#[derive(Debug, Clone)]
pub struct Response {
    pub meta: ResponseMeta,
    pub body: Vec<u8>,
}

impl Response {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Cheap to clone; holds settings only (a fresh curl handle per request).
#[derive(Debug, Clone, Default)]
pub struct HttpClient {
    opts: HttpOptions,
}

impl HttpClient {
    pub fn new(opts: HttpOptions) -> Self {
        Self { opts }
    }

    fn easy(&self, url: &str) -> Result<curl::easy::Easy, FetchError> {
        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(MAX_REDIRECTS)?;
        easy.useragent(&self.opts.user_agent)?;
        easy.connect_timeout(self.opts.connect_timeout)?;
        easy.timeout(self.opts.timeout)?;
        Ok(easy)
    }

    /// GET `url` into memory. Non-2xx is `FetchError::Http`.
    pub fn get(&self, url: &str) -> Result<Response, FetchError> {
        run_with_retry(&self.opts.retry, || self.get_once(url))
    }

    fn get_once(&self, url: &str) -> Result<Response, FetchError> {
        let mut easy = self.easy(url)?;
        let mut headers: Vec<String> = Vec::new();
        let mut body: Vec<u8> = Vec::new();

        {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    headers.push(s.trim_end().to_string());
                }
                true
            })?;
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(FetchError::Http(code));
        }
        tracing::debug!(url, status = code, bytes = body.len(), "GET");

        Ok(Response {
            meta: parse::parse_headers(&headers),
            body,
        })
    }

    /// GET `url` and require a PDF body (checked by signature, not by
    /// Content-Type: government servers mislabel both ways).
    pub fn fetch_pdf(&self, url: &str) -> Result<Response, FetchError> {
        run_with_retry(&self.opts.retry, || {
            let resp = self.get_once(url)?;
            if looks_like_pdf(&resp.body) {
                Ok(resp)
            } else {
                Err(FetchError::NotPdf(resp.meta.content_type))
            }
        })
    }

    /// POST a JSON document; returns the response status.
    pub fn post_json(&self, url: &str, payload: &serde_json::Value) -> Result<u32, FetchError> {
        let body = serde_json::to_vec(payload)?;
        run_with_retry(&self.opts.retry, || self.post_once(url, &body))
    }

    fn post_once(&self, url: &str, body: &[u8]) -> Result<u32, FetchError> {
        let mut easy = self.easy(url)?;
        easy.post(true)?;
        easy.post_fields_copy(body)?;

        let mut list = curl::easy::List::new();
        list.append("Content-Type: application/json")?;
        list.append("Accept: application/json")?;
        list.append("Expect:")?;
        easy.http_headers(list)?;

        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| Ok(data.len()))?;
            transfer.perform()?;
        }

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(FetchError::Http(code));
        }
        tracing::debug!(url, status = code, bytes = body.len(), "POST");
        Ok(code)
    }
}

/// True if `bytes` starts with the `%PDF-` signature (leading whitespace allowed).
pub fn looks_like_pdf(bytes: &[u8]) -> bool {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    bytes[start..].starts_with(b"%PDF-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_signature() {
        assert!(looks_like_pdf(b"%PDF-1.7\n..."));
        assert!(looks_like_pdf(b"\r\n  %PDF-1.4"));
        assert!(!looks_like_pdf(b"<!DOCTYPE html><html>"));
        assert!(!looks_like_pdf(b""));
        assert!(!looks_like_pdf(b"%PD"));
    }

    #[test]
    fn options_follow_config() {
        let mut cfg = PrwatchConfig::default();
        cfg.request_timeout_secs = 5;
        cfg.user_agent = "test-agent".into();
        let opts = HttpOptions::from_config(&cfg);
        assert_eq!(opts.timeout, Duration::from_secs(5));
        assert_eq!(opts.user_agent, "test-agent");
        assert_eq!(opts.retry.max_attempts, 1);
    }

    #[test]
    fn invalid_url_is_curl_error() {
        let client = HttpClient::default();
        let err = client.get("http://[::1").unwrap_err();
        assert!(matches!(err, FetchError::Curl(_)));
    }
}
