//! headless_chrome backed renderer.

use anyhow::{anyhow, Context, Result};
use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::{Browser, LaunchOptions};
use std::time::Instant;

use super::{removal_script, RenderOptions, Renderer, A4_HEIGHT_IN, A4_WIDTH_IN};
use crate::http::looks_like_pdf;

/// Launches a fresh headless Chromium per page. The browser process is
/// closed when the `Browser` handle drops, on success or error.
#[derive(Debug, Clone)]
pub struct ChromeRenderer {
    opts: RenderOptions,
}

impl ChromeRenderer {
    pub fn new(opts: RenderOptions) -> Self {
        Self { opts }
    }

    fn print_options(&self) -> PrintToPdfOptions {
        let m = self.opts.margin_in;
        PrintToPdfOptions {
            landscape: Some(false),
            display_header_footer: Some(false),
            print_background: Some(true),
            paper_width: Some(A4_WIDTH_IN),
            paper_height: Some(A4_HEIGHT_IN),
            margin_top: Some(m),
            margin_bottom: Some(m),
            margin_left: Some(m),
            margin_right: Some(m),
            ..Default::default()
        }
    }
}

impl Renderer for ChromeRenderer {
    fn render(&self, url: &str) -> Result<Vec<u8>> {
        let started = Instant::now();
        let launch = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(self.opts.sandbox)
            .window_size(Some(self.opts.viewport))
            .idle_browser_timeout(self.opts.timeout)
            .build()
            .map_err(|e| anyhow!("browser launch options: {e}"))?;
        let browser = Browser::new(launch).context("launch headless browser")?;

        let tab = browser.new_tab().context("open browser tab")?;
        tab.set_default_timeout(self.opts.timeout);
        tab.navigate_to(url)
            .with_context(|| format!("navigate to {url}"))?
            .wait_until_navigated()
            .with_context(|| format!("page load timed out: {url}"))?;
        tracing::debug!(url, elapsed_ms = started.elapsed().as_millis() as u64, "page loaded");

        tab.evaluate(&removal_script(&self.opts.remove_selectors), false)
            .context("remove page chrome")?;

        let pdf = tab
            .print_to_pdf(Some(self.print_options()))
            .context("print page to PDF")?;
        if !looks_like_pdf(&pdf) {
            anyhow::bail!("browser returned {} bytes that are not a PDF", pdf.len());
        }
        tracing::debug!(
            url,
            bytes = pdf.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "rendered PDF"
        );
        Ok(pdf)
    }
}
