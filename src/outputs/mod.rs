//! Output generation for the crawl batch.
//!
//! # Submodules
//!
//! - [`csv`]: `articles.csv` and `categories.csv`, the format the load stage reads
//! - [`json`]: `data.json` with both batches in one document
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── articles.csv
//! ├── categories.csv
//! └── data.json        # only with --format json|both
//! ```

pub mod csv;
pub mod json;

use crate::models::CrawlBatch;
use clap::ValueEnum;
use std::error::Error;
use std::path::Path;

/// Which batch files to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Csv,
    Json,
    Both,
}

/// Write `batch` into `output_dir` in the requested format(s).
pub async fn write_batch(
    batch: &CrawlBatch,
    output_dir: &Path,
    format: OutputFormat,
) -> Result<(), Box<dyn Error>> {
    if matches!(format, OutputFormat::Csv | OutputFormat::Both) {
        self::csv::write_batch(batch, output_dir).await?;
    }
    if matches!(format, OutputFormat::Json | OutputFormat::Both) {
        json::write_batch(batch, output_dir).await?;
    }
    Ok(())
}
