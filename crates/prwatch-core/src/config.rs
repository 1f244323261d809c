use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Listing page the watcher scans when nothing else is configured.
pub const DEFAULT_WATCH_PAGE: &str = "https://mospi.gov.in/documents/213904/0/SDD_Publications.html";

/// PIB print endpoint; `{prid}` is replaced with the press-release id.
pub const DEFAULT_GENERATOR_TEMPLATE: &str = "https://pib.gov.in/PrintRelease.aspx?relid={prid}";

/// Seen-links file name (relative to the working dir in CI, else the XDG state dir).
pub const SEEN_FILE_NAME: &str = "pdf_links.txt";

/// Where the process is running. Detected from `GITHUB_ACTIONS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Environment {
    GithubActions,
    Local,
}

impl Environment {
    pub fn detect() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup("GITHUB_ACTIONS") {
            Some(v) if v.trim().eq_ignore_ascii_case("true") => Environment::GithubActions,
            _ => Environment::Local,
        }
    }

    pub fn is_ci(self) -> bool {
        self == Environment::GithubActions
    }
}

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per request (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.25 = 250ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            base_delay_secs: 0.25,
            max_delay_secs: 30,
        }
    }
}

/// Headless browser settings for the print-to-PDF fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Set to false to skip browser rendering entirely.
    pub enabled: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Navigation timeout in seconds.
    pub timeout_secs: u64,
    /// Page margin on every side, in millimetres.
    pub margin_mm: f64,
    /// CSS selector list of elements removed before printing.
    pub remove_selectors: String,
    /// Chromium sandbox. Always disabled under GitHub Actions.
    pub sandbox: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            viewport_width: 1280,
            viewport_height: 1080,
            timeout_secs: 60,
            margin_mm: 20.0,
            remove_selectors: "iframe, script, noscript, .header, .footer, .navbar".to_string(),
            sandbox: true,
        }
    }
}

/// SMTP delivery settings. Usually supplied through `EMAIL_*` / `SMTP_*` env vars.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailConfig {
    /// Sender address; also the SMTP username.
    pub from: String,
    pub to: String,
    pub password: String,
    #[serde(default = "default_smtp_server")]
    pub smtp_server: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("password", &"<redacted>")
            .field("smtp_server", &self.smtp_server)
            .field("smtp_port", &self.smtp_port)
            .finish()
    }
}

fn default_smtp_server() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

/// Global configuration loaded from `~/.config/prwatch/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrwatchConfig {
    /// Press-release pages processed by `prwatch fetch`.
    pub sources: Vec<String>,
    /// Listing pages scanned by `prwatch watch`.
    pub watch_pages: Vec<String>,
    /// Directory PDFs are written to.
    pub output_dir: PathBuf,
    /// Seen-links file; see [`PrwatchConfig::seen_file_path`] for the default.
    pub seen_file: Option<PathBuf>,
    /// Direct PDF generation endpoints, `{prid}` substituted.
    pub generator_templates: Vec<String>,
    /// Minimum success rate for a zero exit code.
    pub success_threshold: f64,
    /// Sources processed concurrently by `prwatch fetch`.
    pub jobs: usize,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// JSON summary endpoint (`N8N_WEBHOOK`).
    pub webhook_url: Option<String>,
    pub email: Option<EmailConfig>,
    /// Optional retry policy; if missing, built-in defaults are used.
    pub retry: Option<RetryConfig>,
    pub browser: BrowserConfig,
}

impl Default for PrwatchConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            watch_pages: vec![DEFAULT_WATCH_PAGE.to_string()],
            output_dir: PathBuf::from("pdfs"),
            seen_file: None,
            generator_templates: vec![DEFAULT_GENERATOR_TEMPLATE.to_string()],
            success_threshold: 0.5,
            jobs: 4,
            connect_timeout_secs: 15,
            request_timeout_secs: 60,
            user_agent: concat!("prwatch/", env!("CARGO_PKG_VERSION")).to_string(),
            webhook_url: None,
            email: None,
            retry: None,
            browser: BrowserConfig::default(),
        }
    }
}

impl PrwatchConfig {
    /// Apply environment variable overrides on top of file values.
    ///
    /// `lookup` is `std::env::var` in production; tests pass a map.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(urls) = get("PDF_URLS") {
            self.sources = split_url_list(&urls);
        }
        if let Some(hook) = get("N8N_WEBHOOK") {
            self.webhook_url = Some(hook);
        }

        let current = self.email.take();
        let from = get("EMAIL_FROM").or_else(|| current.as_ref().map(|e| e.from.clone()));
        let to = get("EMAIL_TO").or_else(|| current.as_ref().map(|e| e.to.clone()));
        let password = get("EMAIL_PASSWORD").or_else(|| current.as_ref().map(|e| e.password.clone()));
        let smtp_server = get("SMTP_SERVER")
            .or_else(|| current.as_ref().map(|e| e.smtp_server.clone()))
            .unwrap_or_else(default_smtp_server);
        let smtp_port = match get("SMTP_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("invalid SMTP_PORT: {raw}"))?,
            None => current.as_ref().map_or_else(default_smtp_port, |e| e.smtp_port),
        };

        self.email = match (from, to, password) {
            (Some(from), Some(to), Some(password)) => Some(EmailConfig {
                from,
                to,
                password,
                smtp_server,
                smtp_port,
            }),
            _ => None,
        };

        if Environment::from_lookup(&lookup).is_ci() {
            self.browser.sandbox = false;
        }
        Ok(())
    }

    pub fn retry_config(&self) -> RetryConfig {
        self.retry.clone().unwrap_or_default()
    }

    /// Resolve the seen-links file: explicit config wins, then `./pdf_links.txt`
    /// in CI (so a workflow can commit it), else the XDG state dir.
    pub fn seen_file_path(&self, env: Environment) -> Result<PathBuf> {
        if let Some(p) = &self.seen_file {
            return Ok(p.clone());
        }
        if env.is_ci() {
            return Ok(PathBuf::from(SEEN_FILE_NAME));
        }
        let xdg_dirs = xdg::BaseDirectories::with_prefix("prwatch")?;
        Ok(xdg_dirs.get_state_home().join("prwatch").join(SEEN_FILE_NAME))
    }
}

/// Split a comma-separated URL list, dropping blanks.
pub fn split_url_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("prwatch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
///
/// Under GitHub Actions nothing is written; a missing file means defaults.
pub fn load_or_init(env: Environment) -> Result<PrwatchConfig> {
    if env.is_ci() {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("prwatch")?;
        return match xdg_dirs.find_config_file("config.toml") {
            Some(path) => read_config(&path),
            None => Ok(PrwatchConfig::default()),
        };
    }

    let path = config_path()?;
    if !path.exists() {
        let default_cfg = PrwatchConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    read_config(&path)
}

fn read_config(path: &std::path::Path) -> Result<PrwatchConfig> {
    let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: PrwatchConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}

/// File config plus environment overrides.
pub fn load(env: Environment) -> Result<PrwatchConfig> {
    let mut cfg = load_or_init(env)?;
    cfg.apply_env(|key| std::env::var(key).ok())?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_config_values() {
        let cfg = PrwatchConfig::default();
        assert!(cfg.sources.is_empty());
        assert_eq!(cfg.watch_pages, vec![DEFAULT_WATCH_PAGE.to_string()]);
        assert_eq!(cfg.output_dir, PathBuf::from("pdfs"));
        assert_eq!(cfg.jobs, 4);
        assert!((cfg.success_threshold - 0.5).abs() < 1e-9);
        assert_eq!(cfg.retry_config().max_attempts, 1);
        assert_eq!(cfg.browser.viewport_width, 1280);
        assert_eq!(cfg.browser.viewport_height, 1080);
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = PrwatchConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: PrwatchConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.watch_pages, cfg.watch_pages);
        assert_eq!(parsed.generator_templates, cfg.generator_templates);
        assert_eq!(parsed.jobs, cfg.jobs);
        assert_eq!(parsed.browser.remove_selectors, cfg.browser.remove_selectors);
    }

    #[test]
    fn config_toml_partial_uses_defaults() {
        let toml = r#"
            sources = ["https://pib.gov.in/PressReleaseIframePage.aspx?PRID=2138823"]
            jobs = 2

            [browser]
            enabled = false
        "#;
        let cfg: PrwatchConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.sources.len(), 1);
        assert_eq!(cfg.jobs, 2);
        assert!(!cfg.browser.enabled);
        assert_eq!(cfg.browser.timeout_secs, 60);
        assert!(cfg.webhook_url.is_none());
        assert!(cfg.email.is_none());
    }

    #[test]
    fn config_toml_retry_section() {
        let toml = r#"
            [retry]
            max_attempts = 3
            base_delay_secs = 0.5
            max_delay_secs = 15
        "#;
        let cfg: PrwatchConfig = toml::from_str(toml).unwrap();
        let retry = cfg.retry_config();
        assert_eq!(retry.max_attempts, 3);
        assert!((retry.base_delay_secs - 0.5).abs() < 1e-9);
        assert_eq!(retry.max_delay_secs, 15);
    }

    #[test]
    fn env_overrides_sources_and_webhook() {
        let mut cfg = PrwatchConfig::default();
        cfg.apply_env(lookup(&[
            ("PDF_URLS", " https://a.example/x?PRID=1 , ,https://b.example/y?PRID=2"),
            ("N8N_WEBHOOK", "https://hooks.example/abc"),
        ]))
        .unwrap();
        assert_eq!(
            cfg.sources,
            vec!["https://a.example/x?PRID=1", "https://b.example/y?PRID=2"]
        );
        assert_eq!(cfg.webhook_url.as_deref(), Some("https://hooks.example/abc"));
        assert!(cfg.email.is_none());
    }

    #[test]
    fn env_email_requires_all_credentials() {
        let mut cfg = PrwatchConfig::default();
        cfg.apply_env(lookup(&[("EMAIL_FROM", "a@example.com"), ("EMAIL_TO", "b@example.com")]))
            .unwrap();
        assert!(cfg.email.is_none());

        cfg.apply_env(lookup(&[
            ("EMAIL_FROM", "a@example.com"),
            ("EMAIL_TO", "b@example.com"),
            ("EMAIL_PASSWORD", "secret"),
            ("SMTP_PORT", "2525"),
        ]))
        .unwrap();
        let email = cfg.email.unwrap();
        assert_eq!(email.smtp_server, "smtp.gmail.com");
        assert_eq!(email.smtp_port, 2525);
    }

    #[test]
    fn email_debug_hides_password() {
        let email = EmailConfig {
            from: "a@example.com".into(),
            to: "b@example.com".into(),
            password: "hunter2".into(),
            smtp_server: default_smtp_server(),
            smtp_port: default_smtp_port(),
        };
        let shown = format!("{email:?}");
        assert!(!shown.contains("hunter2"));
        assert!(shown.contains("<redacted>"));
    }

    #[test]
    fn env_invalid_smtp_port_is_error() {
        let mut cfg = PrwatchConfig::default();
        assert!(cfg.apply_env(lookup(&[("SMTP_PORT", "not-a-port")])).is_err());
    }

    #[test]
    fn github_actions_detection_disables_sandbox() {
        assert_eq!(
            Environment::from_lookup(lookup(&[("GITHUB_ACTIONS", "true")])),
            Environment::GithubActions
        );
        assert_eq!(Environment::from_lookup(lookup(&[])), Environment::Local);

        let mut cfg = PrwatchConfig::default();
        cfg.apply_env(lookup(&[("GITHUB_ACTIONS", "true")])).unwrap();
        assert!(!cfg.browser.sandbox);
    }

    #[test]
    fn seen_file_path_in_ci_is_relative() {
        let cfg = PrwatchConfig::default();
        let p = cfg.seen_file_path(Environment::GithubActions).unwrap();
        assert_eq!(p, PathBuf::from(SEEN_FILE_NAME));

        let explicit = PrwatchConfig {
            seen_file: Some(PathBuf::from("/tmp/links.txt")),
            ..PrwatchConfig::default()
        };
        assert_eq!(
            explicit.seen_file_path(Environment::Local).unwrap(),
            PathBuf::from("/tmp/links.txt")
        );
    }
}
