//! `fetch` mode: flat fan-out over source pages.
//!
//! Keeps up to `jobs` sources in flight at once; each worker runs the whole
//! fallback chain on a blocking thread. Results come back in input order.
//! A worker that panics yields an `error` record for its source; the other
//! sources and the webhook are unaffected.

use anyhow::Result;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use super::deliver_summary;
use crate::acquire::{acquire, AcquireContext};
use crate::config::{Environment, PrwatchConfig};
use crate::notify::Delivery;
use crate::report::{ItemResult, RunMode, RunSummary};

/// Build the context from config and run every source.
pub async fn run_fetch(
    cfg: &PrwatchConfig,
    env: Environment,
    urls: Vec<String>,
    jobs: usize,
) -> Result<RunSummary> {
    let ctx = Arc::new(AcquireContext::from_config(cfg, env));
    let delivery = Delivery::from_config(cfg, &ctx.http);
    run_fetch_with(ctx, delivery, urls, jobs).await
}

/// Run every source with an explicit context and delivery (tests inject fakes).
pub async fn run_fetch_with(
    ctx: Arc<AcquireContext>,
    delivery: Delivery,
    urls: Vec<String>,
    jobs: usize,
) -> Result<RunSummary> {
    let jobs = jobs.max(1);
    tracing::info!(sources = urls.len(), jobs, "fetch run starting");

    let mut pending = urls.into_iter().enumerate();
    let mut join_set = tokio::task::JoinSet::new();
    let mut collected: Vec<(usize, Vec<ItemResult>)> = Vec::new();

    loop {
        while join_set.len() < jobs {
            let Some((index, url)) = pending.next() else {
                break;
            };
            let ctx = Arc::clone(&ctx);
            join_set.spawn_blocking(move || {
                tracing::info!(source = %url, "processing");
                let results = panic::catch_unwind(AssertUnwindSafe(|| acquire(&ctx, &url)))
                    .unwrap_or_else(|payload| {
                        let msg = panic_message(payload.as_ref());
                        tracing::error!(source = %url, "source worker panicked: {}", msg);
                        vec![ItemResult::error(&url, &url, None, format!("worker panicked: {msg}"))]
                    });
                (index, results)
            });
        }

        if join_set.is_empty() {
            break;
        }

        let Some(res) = join_set.join_next().await else {
            break;
        };
        collected.push(res.map_err(|e| anyhow::anyhow!("source task join: {}", e))?);
    }

    collected.sort_by_key(|(index, _)| *index);
    let results = collected.into_iter().flat_map(|(_, r)| r).collect();
    let summary = RunSummary::from_results(RunMode::Fetch, ctx.environment, results);
    tracing::info!(
        total = summary.total,
        successful = summary.successful,
        failed = summary.failed,
        "fetch run finished"
    );

    let summary = tokio::task::spawn_blocking(move || {
        deliver_summary(&delivery, &summary);
        summary
    })
    .await
    .map_err(|e| anyhow::anyhow!("webhook task join: {}", e))?;

    Ok(summary)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
