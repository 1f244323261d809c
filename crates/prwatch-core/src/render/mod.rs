//! Page → PDF rendering in a headless browser.
//!
//! The acquirer only sees the [`Renderer`] trait; [`ChromeRenderer`] is the
//! production implementation and tests substitute their own.

mod chrome;

use anyhow::Result;
use std::time::Duration;

use crate::config::BrowserConfig;

pub use chrome::ChromeRenderer;

/// Anything that can turn a page URL into PDF bytes.
pub trait Renderer: Send + Sync {
    fn render(&self, url: &str) -> Result<Vec<u8>>;
}

/// A4 paper in inches (Chrome's print unit).
pub const A4_WIDTH_IN: f64 = 8.27;
pub const A4_HEIGHT_IN: f64 = 11.69;

const MM_PER_INCH: f64 = 25.4;

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub viewport: (u32, u32),
    pub timeout: Duration,
    pub margin_in: f64,
    pub remove_selectors: String,
    pub sandbox: bool,
}

impl RenderOptions {
    pub fn from_config(cfg: &BrowserConfig) -> Self {
        Self {
            viewport: (cfg.viewport_width, cfg.viewport_height),
            timeout: Duration::from_secs(cfg.timeout_secs),
            margin_in: mm_to_inches(cfg.margin_mm),
            remove_selectors: cfg.remove_selectors.clone(),
            sandbox: cfg.sandbox,
        }
    }
}

pub fn mm_to_inches(mm: f64) -> f64 {
    mm / MM_PER_INCH
}

/// Script that strips elements matching `selectors` before printing.
pub fn removal_script(selectors: &str) -> String {
    // JSON string literals are valid JS string literals.
    let quoted = serde_json::Value::String(selectors.to_string()).to_string();
    format!("(() => {{ document.querySelectorAll({quoted}).forEach(el => el.remove()); return true; }})()")
}
