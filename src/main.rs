//! # News Extract
//!
//! A configuration-driven news scraper. For every site listed in the site
//! configuration it walks home page → category pages → article pages, pulls
//! the article fields out with per-site CSS queries, and writes the results as
//! an article batch and a category batch for the downstream load stage.
//!
//! ## Usage
//!
//! ```sh
//! news_extract -c sites.yaml -o ./out
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Indexing**: discover category pages, then article URLs, per site
//! 2. **De-duplication**: skip URLs recorded in `urls.txt` by earlier runs
//! 3. **Extraction**: fetch each new article and extract every field independently
//! 4. **Output**: write the batches, then append new URLs and categories to the
//!    seen files

use clap::Parser;
use std::error::Error;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod crawler;
mod errors;
mod fetcher;
mod links;
mod models;
mod outputs;
mod query;
mod scrapers;
mod seen;
mod utils;

use cli::Cli;
use crawler::{CrawlOptions, SeenSets};
use utils::ensure_writable_dir;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("news_extract starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    // Early check: ensure the output dir is writable before spending a crawl on it
    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir,
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    // ---- Site configuration ----
    let sites = config::load_sites(&args.config).inspect_err(|e| {
        error!(path = %args.config.display(), error = %e, "Failed to load site configuration");
    })?;
    let sites = config::select_sites(sites, &args.sites).inspect_err(|e| {
        error!(requested = ?args.sites, error = %e, "No configured site matches the --site filter");
    })?;
    info!(
        sites = ?sites.iter().map(|s| s.id.as_str()).collect::<Vec<_>>(),
        "Sites selected for this run"
    );

    // ---- Seen sets from earlier runs ----
    let seen = SeenSets {
        urls: seen::load_seen(&args.seen_urls).await?,
        categories: seen::load_seen(&args.seen_categories).await?,
    };

    // ---- Crawl ----
    let fetcher = fetcher::http_fetcher(
        &args.user_agent,
        Duration::from_secs(args.timeout_secs),
        args.max_retries,
    )?;
    let options = CrawlOptions {
        concurrency: args.concurrency,
    };
    let batch = crawler::crawl(&fetcher, &sites, seen, &options).await;

    // ---- Output ----
    let output_dir = Path::new(&args.output_dir);
    match outputs::write_batch(&batch, output_dir, args.format).await {
        Ok(()) => {
            // Seen files only advance once the batches are safely on disk.
            if let Err(e) = seen::append_seen(&args.seen_urls, &batch.new_urls).await {
                error!(path = %args.seen_urls.display(), error = %e, "Failed to update seen URLs");
            }
            if let Err(e) = seen::append_seen(&args.seen_categories, &batch.new_categories).await {
                error!(path = %args.seen_categories.display(), error = %e, "Failed to update seen categories");
            }
        }
        Err(e) => {
            error!(error = %e, "Failed to write output batches; seen files left untouched");
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        articles = batch.articles.len(),
        categories = batch.categories.len(),
        "Execution complete"
    );

    Ok(())
}
