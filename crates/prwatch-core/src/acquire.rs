//! Obtaining PDFs for one source page.
//!
//! Strategies run in order and the first one that yields a PDF wins:
//! 1. the direct generation endpoint (only when the URL carries a PRID),
//! 2. a headless-browser print of the page,
//! 3. every PDF link found on the page, downloaded one by one.
//!
//! Failures inside a strategy are logged and the next one is tried; nothing
//! here returns an error, the outcome is always a list of records.

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{Environment, PrwatchConfig};
use crate::http::{HttpClient, HttpOptions};
use crate::links;
use crate::prid;
use crate::render::{ChromeRenderer, RenderOptions, Renderer};
use crate::report::{ItemResult, Method};
use crate::storage::{self, WrittenPdf};
use crate::url_model;

/// Everything a worker needs to process a source. Shared across tasks.
#[derive(Clone)]
pub struct AcquireContext {
    pub http: HttpClient,
    /// `None` skips the browser strategy.
    pub renderer: Option<Arc<dyn Renderer>>,
    pub output_dir: PathBuf,
    pub generator_templates: Vec<String>,
    pub environment: Environment,
}

impl AcquireContext {
    pub fn from_config(cfg: &PrwatchConfig, environment: Environment) -> Self {
        let renderer: Option<Arc<dyn Renderer>> = if cfg.browser.enabled {
            Some(Arc::new(ChromeRenderer::new(RenderOptions::from_config(&cfg.browser))))
        } else {
            None
        };
        Self {
            http: HttpClient::new(HttpOptions::from_config(cfg)),
            renderer,
            output_dir: cfg.output_dir.clone(),
            generator_templates: cfg.generator_templates.clone(),
            environment,
        }
    }
}

impl std::fmt::Debug for AcquireContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AcquireContext")
            .field("http", &self.http)
            .field("renderer", &self.renderer.is_some())
            .field("output_dir", &self.output_dir)
            .field("generator_templates", &self.generator_templates)
            .field("environment", &self.environment)
            .finish()
    }
}

/// Run the fallback chain for `source` and return one record per item.
pub fn acquire(ctx: &AcquireContext, source: &str) -> Vec<ItemResult> {
    let prid = prid::extract_prid(source);

    if let Some(id) = prid.as_deref() {
        if let Some(result) = try_generator(ctx, source, id) {
            return vec![result];
        }
    }

    if let Some(renderer) = ctx.renderer.as_deref() {
        match try_browser(ctx, renderer, source) {
            Ok(result) => return vec![result],
            Err(e) => tracing::warn!(source, "browser render failed: {:#}", e),
        }
    }

    match links::fetch_pdf_links(&ctx.http, source) {
        Ok(found) if found.is_empty() => {
            tracing::warn!(source, "no PDF found");
            vec![ItemResult::failed(source, source, "no PDF found")]
        }
        Ok(found) => found
            .iter()
            .map(|link| download_link(ctx, source, link))
            .collect(),
        Err(e) => {
            tracing::warn!(source, "page scan failed: {:#}", e);
            vec![ItemResult::error(source, source, None, e)]
        }
    }
}

fn try_generator(ctx: &AcquireContext, source: &str, id: &str) -> Option<ItemResult> {
    for url in prid::generator_urls(id, &ctx.generator_templates) {
        let outcome = ctx
            .http
            .fetch_pdf(&url)
            .map_err(anyhow::Error::from)
            .and_then(|resp| storage::write_pdf(&ctx.output_dir, &prid::pdf_filename(id), &resp.body));
        match outcome {
            Ok(pdf) => return Some(ItemResult::success(source, &url, Method::Generator, &pdf)),
            Err(e) => tracing::debug!(source, url = %url, "generator endpoint failed: {:#}", e),
        }
    }
    None
}

fn try_browser(ctx: &AcquireContext, renderer: &dyn Renderer, source: &str) -> Result<ItemResult> {
    let bytes = renderer.render(source)?;
    let pdf = storage::write_pdf(&ctx.output_dir, &url_model::page_pdf_filename(source), &bytes)?;
    Ok(ItemResult::success(source, source, Method::Browser, &pdf))
}

/// Download one PDF link and save it under a name not yet present in the
/// output directory.
pub fn download_link(ctx: &AcquireContext, source: &str, link: &str) -> ItemResult {
    match fetch_link(ctx, link) {
        Ok(pdf) => ItemResult::success(source, link, Method::Link, &pdf),
        Err(e) => {
            tracing::warn!(source, link, "download failed: {:#}", e);
            ItemResult::error(source, link, Some(Method::Link), e)
        }
    }
}

fn fetch_link(ctx: &AcquireContext, link: &str) -> Result<WrittenPdf> {
    let resp = ctx.http.fetch_pdf(link)?;
    if let Some(expected) = resp.meta.content_length {
        if expected != resp.body.len() as u64 {
            tracing::warn!(link, expected, got = resp.body.len(), "body length differs from Content-Length");
        }
    }
    let name = url_model::derive_filename(link, resp.meta.content_disposition.as_deref());
    storage::write_pdf(&ctx.output_dir, &name, &resp.body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ItemStatus;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeRenderer {
        calls: AtomicUsize,
        output: Option<Vec<u8>>,
    }

    impl Renderer for FakeRenderer {
        fn render(&self, _url: &str) -> Result<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.output
                .clone()
                .ok_or_else(|| anyhow::anyhow!("browser unavailable"))
        }
    }

    fn ctx(dir: &std::path::Path, renderer: Option<Arc<dyn Renderer>>) -> AcquireContext {
        AcquireContext {
            http: HttpClient::default(),
            renderer,
            output_dir: dir.to_path_buf(),
            // Unroutable: the generator step fails fast.
            generator_templates: vec!["http://127.0.0.1:9/gen?relid={prid}".to_string()],
            environment: Environment::Local,
        }
    }

    #[test]
    fn browser_result_used_when_generator_fails() {
        let dir = tempfile::tempdir().unwrap();
        let fake = Arc::new(FakeRenderer {
            calls: AtomicUsize::new(0),
            output: Some(b"%PDF-1.7 rendered".to_vec()),
        });
        let renderer: Arc<dyn Renderer> = fake.clone();
        let c = ctx(dir.path(), Some(renderer));
        let source = "http://127.0.0.1:9/PressReleaseIframePage.aspx?PRID=2138823";
        let results = acquire(&c, source);
        assert_eq!(results.len(), 1);
        let r = &results[0];
        assert_eq!(r.status, ItemStatus::Success);
        assert_eq!(r.method, Some(Method::Browser));
        assert_eq!(r.filename.as_deref(), Some("pib_2138823.pdf"));
        assert_eq!(fake.calls.load(Ordering::SeqCst), 1);
        assert!(dir.path().join("pib_2138823.pdf").exists());
    }

    #[test]
    fn every_strategy_failing_yields_error_record() {
        let dir = tempfile::tempdir().unwrap();
        let renderer: Arc<dyn Renderer> = Arc::new(FakeRenderer {
            calls: AtomicUsize::new(0),
            output: None,
        });
        let c = ctx(dir.path(), Some(renderer));
        let results = acquire(&c, "http://127.0.0.1:9/page.aspx?PRID=1");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, ItemStatus::Error);
        assert!(results[0].filename.is_none());
    }
}
