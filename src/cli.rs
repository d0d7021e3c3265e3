//! Command-line interface definitions for News Extract.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Most arguments can also be provided via environment variables.

use crate::outputs::OutputFormat;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for one crawl run.
///
/// # Examples
///
/// ```sh
/// # Crawl every configured site, write CSV batches to ./out
/// news_extract -c sites.yaml -o ./out
///
/// # Only two sites, JSON and CSV, four article fetches in flight
/// news_extract --site vanguardia --site eltiempo --format both --concurrency 4
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the site configuration YAML
    #[arg(short, long, env = "SITES_CONFIG", default_value = "sites.yaml")]
    pub config: PathBuf,

    /// Directory for the article and category batches
    #[arg(short, long, default_value = ".")]
    pub output_dir: String,

    /// Line-delimited file of article URLs scraped by earlier runs
    #[arg(long, default_value = "urls.txt")]
    pub seen_urls: PathBuf,

    /// Line-delimited file of categories emitted by earlier runs
    #[arg(long, default_value = "categories.txt")]
    pub seen_categories: PathBuf,

    /// Output format for the batches
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,

    /// Only crawl the site with this id (repeatable)
    #[arg(long = "site")]
    pub sites: Vec<String>,

    /// Article pages fetched concurrently within a site
    #[arg(long, default_value_t = 1)]
    pub concurrency: usize,

    /// Retries per request on network errors and 5xx responses
    #[arg(long, default_value_t = 3)]
    pub max_retries: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    #[arg(long, env = "NEWS_EXTRACT_USER_AGENT", default_value = concat!("news_extract/", env!("CARGO_PKG_VERSION")))]
    pub user_agent: String,
}
