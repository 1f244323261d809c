//! `prwatch fetch`: acquire PDFs for press-release pages.

use anyhow::Result;
use prwatch_core::config::{Environment, PrwatchConfig};
use prwatch_core::report::{ItemStatus, RunSummary};
use prwatch_core::run;
use std::path::PathBuf;

/// Command-line overrides for a fetch run.
#[derive(Debug, Default)]
pub struct FetchArgs {
    pub urls: Vec<String>,
    pub jobs: Option<usize>,
    pub no_browser: bool,
    pub output_dir: Option<PathBuf>,
    pub threshold: Option<f64>,
}

pub async fn run_fetch(mut cfg: PrwatchConfig, env: Environment, args: FetchArgs) -> Result<i32> {
    if args.no_browser {
        cfg.browser.enabled = false;
    }
    if let Some(dir) = args.output_dir {
        cfg.output_dir = dir;
    }
    let threshold = args.threshold.unwrap_or(cfg.success_threshold);
    let jobs = args.jobs.unwrap_or(cfg.jobs);
    let urls = if args.urls.is_empty() {
        cfg.sources.clone()
    } else {
        args.urls
    };
    if urls.is_empty() {
        tracing::warn!("no source URLs (pass URLs, set PDF_URLS, or config `sources`)");
    }

    let summary = run::run_fetch(&cfg, env, urls, jobs).await?;
    print_summary(&summary);
    Ok(summary.exit_code(threshold))
}

pub(super) fn print_summary(summary: &RunSummary) {
    for r in &summary.results {
        match r.status {
            ItemStatus::Success => println!(
                "ok      {}  {}",
                r.filename.as_deref().unwrap_or("-"),
                r.url
            ),
            ItemStatus::Failed | ItemStatus::Error => println!(
                "{:<7} {}  {}",
                if r.status == ItemStatus::Failed { "failed" } else { "error" },
                r.url,
                r.error.as_deref().unwrap_or("")
            ),
        }
    }
    println!(
        "{}/{} succeeded ({:.1}%)",
        summary.successful,
        summary.total,
        summary.success_rate * 100.0
    );
}
