//! `watch` mode: new-PDF detection on listing pages.

use anyhow::Result;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use super::deliver_summary;
use crate::acquire::{download_link, AcquireContext};
use crate::links;
use crate::notify::{Delivery, DEFAULT_SUBJECT};
use crate::report::{ItemResult, RunMode, RunSummary};
use crate::seen::{self, SeenStore};

/// Listing pages to scan and where the seen-links file lives.
#[derive(Debug, Clone)]
pub struct WatchRequest {
    pub pages: Vec<String>,
    pub seen_file: PathBuf,
}

#[derive(Debug, Clone)]
pub enum WatchOutcome {
    /// No listing page yielded a PDF link. Seen file untouched.
    NoPdfsFound,
    /// Seen file was empty: current links saved, nothing sent.
    FirstRun { seeded: usize },
    NothingNew,
    Processed(RunSummary),
}

impl WatchOutcome {
    /// Quiet outcomes exit 0; processed runs use the success threshold.
    pub fn exit_code(&self, threshold: f64) -> i32 {
        match self {
            WatchOutcome::Processed(summary) => summary.exit_code(threshold),
            _ => 0,
        }
    }

    pub fn summary(&self) -> Option<&RunSummary> {
        match self {
            WatchOutcome::Processed(summary) => Some(summary),
            _ => None,
        }
    }
}

/// One pass of the watcher. Blocking; callers on a runtime use `spawn_blocking`.
pub fn run_watch(ctx: &AcquireContext, delivery: &Delivery, req: &WatchRequest) -> Result<WatchOutcome> {
    // link -> listing page it was first seen on
    let mut current: BTreeMap<String, String> = BTreeMap::new();
    for page in &req.pages {
        match links::fetch_pdf_links(&ctx.http, page) {
            Ok(found) => {
                tracing::info!(page = %page, count = found.len(), "listing scanned");
                for link in found {
                    current.entry(link).or_insert_with(|| page.clone());
                }
            }
            Err(e) => tracing::warn!(page = %page, "listing fetch failed: {:#}", e),
        }
    }

    if current.is_empty() {
        tracing::info!("no PDFs found");
        return Ok(WatchOutcome::NoPdfsFound);
    }

    let store = SeenStore::open(&req.seen_file);
    let previous = store.load()?;
    let current_set: BTreeSet<String> = current.keys().cloned().collect();

    if previous.is_empty() {
        store.save(&current_set)?;
        tracing::info!(
            seeded = current_set.len(),
            path = %store.path().display(),
            "first run: seen links saved, nothing sent"
        );
        return Ok(WatchOutcome::FirstRun {
            seeded: current_set.len(),
        });
    }

    let fresh = seen::new_links(&current_set, &previous);
    if fresh.is_empty() {
        tracing::info!("no new PDFs");
        return Ok(WatchOutcome::NothingNew);
    }
    tracing::info!(count = fresh.len(), "new PDFs found");

    let mut results = Vec::with_capacity(fresh.len());
    for link in &fresh {
        let page = current.get(link).map(String::as_str).unwrap_or(link);
        let result = download_link(ctx, page, link);
        results.push(deliver_by_email(ctx, delivery, result));
    }

    let merged: BTreeSet<String> = previous.union(&fresh).cloned().collect();
    store.save(&merged)?;

    let summary = RunSummary::from_results(RunMode::Watch, ctx.environment, results);
    tracing::info!(
        total = summary.total,
        successful = summary.successful,
        failed = summary.failed,
        "watch run finished"
    );
    deliver_summary(delivery, &summary);
    Ok(WatchOutcome::Processed(summary))
}

/// Mail a downloaded PDF and remove the local copy once sent. A failed send
/// turns the record into an error and keeps the file.
fn deliver_by_email(ctx: &AcquireContext, delivery: &Delivery, result: ItemResult) -> ItemResult {
    let Some(mailer) = &delivery.email else {
        return result;
    };
    let path = match (&result.filename, result.is_success()) {
        (Some(filename), true) => ctx.output_dir.join(filename),
        _ => return result,
    };
    let body = format!("A new PDF has been uploaded:\n{}", result.url);
    match mailer.send_pdf(DEFAULT_SUBJECT, &body, &path) {
        Ok(()) => {
            tracing::info!(url = %result.url, "e-mail sent");
            if let Err(e) = std::fs::remove_file(&path) {
                tracing::warn!(path = %path.display(), "could not remove sent PDF: {}", e);
            }
            result
        }
        Err(e) => {
            tracing::warn!(url = %result.url, "e-mail failed: {:#}", e);
            ItemResult::error(&result.source, &result.url, result.method, e)
        }
    }
}
