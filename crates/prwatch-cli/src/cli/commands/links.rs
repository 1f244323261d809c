//! `prwatch links <URL>`: list the PDF links on a page.

use anyhow::{Context, Result};
use prwatch_core::config::PrwatchConfig;
use prwatch_core::http::{HttpClient, HttpOptions};
use prwatch_core::links;

pub async fn run_links(cfg: &PrwatchConfig, url: &str) -> Result<()> {
    let http = HttpClient::new(HttpOptions::from_config(cfg));
    let page = url.to_string();
    let found = tokio::task::spawn_blocking(move || links::fetch_pdf_links(&http, &page))
        .await
        .context("link scan task")??;

    if found.is_empty() {
        println!("No PDF links found.");
        return Ok(());
    }
    for link in &found {
        println!("{}", link);
    }
    tracing::info!(url, count = found.len(), "links listed");
    Ok(())
}
