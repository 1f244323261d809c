//! CLI for prwatch.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use prwatch_core::config::{self, Environment};
use std::path::PathBuf;

use commands::{run_checksum, run_completions, run_fetch, run_links, run_watch, FetchArgs};

/// Top-level CLI for prwatch.
#[derive(Debug, Parser)]
#[command(name = "prwatch")]
#[command(about = "prwatch: government press-release PDF scraper and watcher", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch a PDF for each press-release page (generator, browser, page links).
    Fetch {
        /// Source page URLs. Defaults to PDF_URLS / config `sources`.
        urls: Vec<String>,
        /// Process up to N sources concurrently (default from config, 4).
        #[arg(long, value_name = "N")]
        jobs: Option<usize>,
        /// Skip the headless-browser strategy.
        #[arg(long)]
        no_browser: bool,
        /// Directory PDFs are written to.
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
        /// Minimum success rate (0.0-1.0) for exit code 0.
        #[arg(long, value_name = "F")]
        threshold: Option<f64>,
    },

    /// Check listing pages for PDFs not seen before; download and mail them.
    Watch {
        /// Listing page URL (repeatable). Defaults to config `watch_pages`.
        #[arg(long = "page", value_name = "URL")]
        pages: Vec<String>,
        /// Seen-links file (default: ./pdf_links.txt in CI, else state dir).
        #[arg(long, value_name = "PATH")]
        seen_file: Option<PathBuf>,
    },

    /// Print the PDF links found on a page.
    Links {
        /// Page URL to scan.
        url: String,
    },

    /// Compute SHA-256 of a file (e.g. a downloaded PDF).
    Checksum {
        /// Path to the file.
        path: PathBuf,
    },

    /// Print a shell completion script.
    Completions {
        /// Target shell.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

impl CliCommand {
    /// Parse arguments, dispatch, and return the process exit code.
    pub async fn run_from_args(env: Environment) -> Result<i32> {
        let cli = Cli::parse();

        let load = || -> Result<config::PrwatchConfig> {
            let cfg = config::load(env)?;
            tracing::debug!(?env, "loaded config: {:?}", cfg);
            Ok(cfg)
        };

        match cli.command {
            CliCommand::Fetch {
                urls,
                jobs,
                no_browser,
                output_dir,
                threshold,
            } => {
                let args = FetchArgs {
                    urls,
                    jobs,
                    no_browser,
                    output_dir,
                    threshold,
                };
                run_fetch(load()?, env, args).await
            }
            CliCommand::Watch { pages, seen_file } => run_watch(load()?, env, pages, seen_file).await,
            CliCommand::Links { url } => {
                run_links(&load()?, &url).await?;
                Ok(0)
            }
            CliCommand::Checksum { path } => {
                run_checksum(&path)?;
                Ok(0)
            }
            CliCommand::Completions { shell } => {
                run_completions(shell);
                Ok(0)
            }
        }
    }
}

#[cfg(test)]
mod tests;
