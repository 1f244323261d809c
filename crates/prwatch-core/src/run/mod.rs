//! The two run modes.
//!
//! - `fetch`: acquire a PDF for each press-release page (flat fan-out).
//! - `watch`: diff a listing page's PDF links against the seen-links file,
//!   download and mail the new ones.

mod fetch;
mod watch;

pub use fetch::{run_fetch, run_fetch_with};
pub use watch::{run_watch, WatchOutcome, WatchRequest};

use crate::notify::Delivery;
use crate::report::RunSummary;

/// Post the summary to the webhook if one is configured. Never fatal.
pub(crate) fn deliver_summary(delivery: &Delivery, summary: &RunSummary) {
    let Some(hook) = &delivery.webhook else {
        tracing::debug!("no webhook configured; summary not posted");
        return;
    };
    if let Err(e) = hook.send(summary) {
        tracing::warn!(url = hook.url(), "webhook delivery failed: {:#}", e);
    }
}
