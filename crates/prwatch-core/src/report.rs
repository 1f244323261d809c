//! Result records and run summaries.
//!
//! Every processed item becomes one [`ItemResult`]; a run folds them into a
//! [`RunSummary`] that is posted to the webhook and decides the exit code.

use serde::{Deserialize, Serialize};

use crate::config::Environment;
use crate::storage::WrittenPdf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Success,
    /// Every strategy ran cleanly but none produced a PDF.
    Failed,
    /// An operation raised and the item could not be completed.
    Error,
}

/// Strategy that produced (or was producing) the item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Generator,
    Browser,
    Link,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemResult {
    pub url: String,
    pub source: String,
    pub status: ItemStatus,
    pub method: Option<Method>,
    pub filename: Option<String>,
    pub size: Option<u64>,
    pub sha256: Option<String>,
    pub error: Option<String>,
}

impl ItemResult {
    pub fn success(source: &str, url: &str, method: Method, pdf: &WrittenPdf) -> Self {
        Self {
            url: url.to_string(),
            source: source.to_string(),
            status: ItemStatus::Success,
            method: Some(method),
            filename: Some(pdf.filename.clone()),
            size: Some(pdf.size),
            sha256: Some(pdf.sha256.clone()),
            error: None,
        }
    }

    pub fn failed(source: &str, url: &str, reason: impl Into<String>) -> Self {
        Self {
            url: url.to_string(),
            source: source.to_string(),
            status: ItemStatus::Failed,
            method: None,
            filename: None,
            size: None,
            sha256: None,
            error: Some(reason.into()),
        }
    }

    pub fn error(source: &str, url: &str, method: Option<Method>, err: impl std::fmt::Display) -> Self {
        Self {
            url: url.to_string(),
            source: source.to_string(),
            status: ItemStatus::Error,
            method,
            filename: None,
            size: None,
            sha256: None,
            error: Some(format!("{err:#}")),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ItemStatus::Success
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Fetch,
    Watch,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub mode: RunMode,
    pub environment: Environment,
    pub total: usize,
    pub successful: usize,
    /// `failed` and `error` records together.
    pub failed: usize,
    pub success_rate: f64,
    pub results: Vec<ItemResult>,
}

impl RunSummary {
    pub fn from_results(mode: RunMode, environment: Environment, results: Vec<ItemResult>) -> Self {
        let total = results.len();
        let successful = results.iter().filter(|r| r.is_success()).count();
        let success_rate = if total == 0 {
            0.0
        } else {
            successful as f64 / total as f64
        };
        Self {
            mode,
            environment,
            total,
            successful,
            failed: total - successful,
            success_rate,
            results,
        }
    }

    /// `0` when the success rate reaches `threshold`, else `1`.
    /// An empty run never reaches it.
    pub fn exit_code(&self, threshold: f64) -> i32 {
        if self.total > 0 && self.success_rate >= threshold {
            0
        } else {
            1
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
