//! JSON output of the whole batch.
//!
//! Writes `data.json` holding both batches plus the run timestamp:
//!
//! ```text
//! {
//!   "generated_at": "2025-05-06T20:30:00+00:00",
//!   "articles": [ { "title": [...], "subtitle": null, ... } ],
//!   "categories": [ { "categories": "World" } ]
//! }
//! ```
//!
//! Nulls stay explicit, and the rows use the same ordering as the CSV output.

use crate::models::{ArticleRecord, CategoryRecord, CrawlBatch};
use chrono::{SecondsFormat, Utc};
use itertools::Itertools;
use serde::Serialize;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

pub const DATA_FILE: &str = "data.json";

#[derive(Serialize)]
struct DataFile<'a> {
    generated_at: String,
    articles: Vec<&'a ArticleRecord>,
    categories: Vec<&'a CategoryRecord>,
}

/// Serialize a [`CrawlBatch`] to pretty JSON, sorted like the CSV output.
pub fn batch_json(batch: &CrawlBatch) -> Result<String, serde_json::Error> {
    let data = DataFile {
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, false),
        articles: batch
            .articles
            .iter()
            .sorted_by(|a, b| a.news_url.cmp(&b.news_url))
            .collect(),
        categories: batch
            .categories
            .iter()
            .sorted_by(|a, b| a.categories.cmp(&b.categories))
            .collect(),
    };
    serde_json::to_string_pretty(&data)
}

/// Write `data.json` into `output_dir`, creating the directory if needed.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir.display()))]
pub async fn write_batch(batch: &CrawlBatch, output_dir: &Path) -> Result<(), Box<dyn Error>> {
    let json = batch_json(batch)?;

    if let Err(e) = fs::create_dir_all(output_dir).await {
        error!(error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let path = output_dir.join(DATA_FILE);
    info!(path = %path.display(), "Writing JSON");
    fs::write(&path, json).await?;
    info!(path = %path.display(), articles = batch.articles.len(), "Wrote JSON batch");

    Ok(())
}
