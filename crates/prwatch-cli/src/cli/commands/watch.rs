//! `prwatch watch`: mail PDFs newly listed on the watched pages.

use anyhow::{Context, Result};
use prwatch_core::acquire::AcquireContext;
use prwatch_core::config::{Environment, PrwatchConfig};
use prwatch_core::notify::Delivery;
use prwatch_core::run::{self, WatchOutcome, WatchRequest};
use std::path::PathBuf;

use super::fetch::print_summary;

pub async fn run_watch(
    mut cfg: PrwatchConfig,
    env: Environment,
    pages: Vec<String>,
    seen_file: Option<PathBuf>,
) -> Result<i32> {
    if seen_file.is_some() {
        cfg.seen_file = seen_file;
    }
    // Listing pages link straight to PDFs; no page rendering.
    cfg.browser.enabled = false;
    let req = WatchRequest {
        pages: if pages.is_empty() {
            cfg.watch_pages.clone()
        } else {
            pages
        },
        seen_file: cfg.seen_file_path(env)?,
    };
    if cfg.email.is_none() {
        tracing::warn!("e-mail not configured (EMAIL_FROM, EMAIL_TO, EMAIL_PASSWORD); new PDFs are only downloaded");
    }

    let ctx = AcquireContext::from_config(&cfg, env);
    let delivery = Delivery::from_config(&cfg, &ctx.http);
    let outcome = tokio::task::spawn_blocking(move || run::run_watch(&ctx, &delivery, &req))
        .await
        .context("watch task")??;

    match &outcome {
        WatchOutcome::NoPdfsFound => println!("No PDFs found."),
        WatchOutcome::FirstRun { seeded } => {
            println!("First run: recorded {} existing PDF link(s); nothing sent.", seeded)
        }
        WatchOutcome::NothingNew => println!("No new PDFs."),
        WatchOutcome::Processed(summary) => print_summary(summary),
    }
    Ok(outcome.exit_code(cfg.success_threshold))
}
