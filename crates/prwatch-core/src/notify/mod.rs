//! Delivery of results: JSON summary to a webhook, new PDFs by e-mail.

mod email;
mod webhook;

pub use email::{build_message, EmailNotifier, DEFAULT_SUBJECT};
pub use webhook::WebhookNotifier;

use crate::config::PrwatchConfig;
use crate::http::HttpClient;

/// Configured delivery channels. Either may be absent.
#[derive(Debug, Clone, Default)]
pub struct Delivery {
    pub webhook: Option<WebhookNotifier>,
    pub email: Option<EmailNotifier>,
}

impl Delivery {
    pub fn from_config(cfg: &PrwatchConfig, http: &HttpClient) -> Self {
        Self {
            webhook: cfg
                .webhook_url
                .as_ref()
                .map(|url| WebhookNotifier::new(url.clone(), http.clone())),
            email: cfg.email.clone().map(EmailNotifier::new),
        }
    }
}
