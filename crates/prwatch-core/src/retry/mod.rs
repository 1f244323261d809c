//! Retry and backoff policy.
//!
//! Classifies transport failures (timeouts, throttling, connection errors,
//! 5xx) and decides exponential backoff, so the page fetcher, the PDF
//! download and the webhook POST share one policy.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use error::FetchError;
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
