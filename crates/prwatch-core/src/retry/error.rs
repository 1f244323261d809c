//! Transport error type for retry classification.

use thiserror::Error;

/// Error returned by a single HTTP exchange. Kept structured until the
/// retry loop has classified it; callers convert to `anyhow` afterwards.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection, TLS, etc.).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// Response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// Body did not start with the `%PDF-` signature.
    #[error("response is not a PDF (content-type: {})", .0.as_deref().unwrap_or("unknown"))]
    NotPdf(Option<String>),
    /// Request payload could not be encoded.
    #[error("encode payload: {0}")]
    Encode(#[from] serde_json::Error),
}
