//! Webhook delivery (`N8N_WEBHOOK`).

use anyhow::{Context, Result};

use crate::http::HttpClient;
use crate::report::RunSummary;

#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    url: String,
    http: HttpClient,
}

impl WebhookNotifier {
    pub fn new(url: String, http: HttpClient) -> Self {
        Self { url, http }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST the run summary as JSON.
    pub fn send(&self, summary: &RunSummary) -> Result<()> {
        let status = self
            .http
            .post_json(&self.url, &summary.to_json())
            .with_context(|| format!("webhook POST to {}", self.url))?;
        tracing::info!(status, total = summary.total, "webhook delivered");
        Ok(())
    }
}
