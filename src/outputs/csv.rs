//! CSV output of the article and category batches.
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── articles.csv     # title, subtitle, body, images, category_long, tags,
//! │                    # author, publication_date, news_url, host
//! └── categories.csv   # categories
//! ```
//!
//! Null fields are written as empty cells. Rows are sorted (articles by
//! `news_url`, categories by name) so reruns over the same pages diff cleanly.

use crate::models::{ARTICLE_COLUMNS, ArticleRecord, CategoryRecord, CrawlBatch};
use itertools::Itertools;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

pub const ARTICLES_FILE: &str = "articles.csv";
pub const CATEGORIES_FILE: &str = "categories.csv";

/// Render the article batch, header included.
pub fn articles_csv(articles: &[ArticleRecord]) -> Result<String, Box<dyn Error>> {
    let mut w = ::csv::Writer::from_writer(Vec::new());
    w.write_record(ARTICLE_COLUMNS)?;
    for article in articles.iter().sorted_by(|a, b| a.news_url.cmp(&b.news_url)) {
        w.write_record(article.to_row())?;
    }
    Ok(String::from_utf8(w.into_inner().map_err(|e| e.into_error())?)?)
}

/// Render the category batch, header included.
pub fn categories_csv(categories: &[CategoryRecord]) -> Result<String, Box<dyn Error>> {
    let mut w = ::csv::Writer::from_writer(Vec::new());
    w.write_record(["categories"])?;
    for category in categories.iter().sorted_by(|a, b| a.categories.cmp(&b.categories)) {
        w.write_record([category.categories.as_str()])?;
    }
    Ok(String::from_utf8(w.into_inner().map_err(|e| e.into_error())?)?)
}

/// Write `articles.csv` and `categories.csv` into `output_dir`.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir.display()))]
pub async fn write_batch(batch: &CrawlBatch, output_dir: &Path) -> Result<(), Box<dyn Error>> {
    let articles_path = output_dir.join(ARTICLES_FILE);
    fs::write(&articles_path, articles_csv(&batch.articles)?).await?;
    info!(path = %articles_path.display(), rows = batch.articles.len(), "Wrote article batch");

    let categories_path = output_dir.join(CATEGORIES_FILE);
    fs::write(&categories_path, categories_csv(&batch.categories)?).await?;
    info!(path = %categories_path.display(), rows = batch.categories.len(), "Wrote category batch");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(url: &str) -> ArticleRecord {
        ArticleRecord {
            title: Some(vec!["T, with comma".to_string()]),
            body: Some(vec!["a".to_string(), "b".to_string()]),
            news_url: url.to_string(),
            host: "https://x.com".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_articles_csv_header_nulls_and_order() {
        let out = articles_csv(&[record("https://x.com/b"), record("https://x.com/a")]).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines[0],
            "title,subtitle,body,images,category_long,tags,author,publication_date,news_url,host"
        );
        assert_eq!(
            lines[1],
            "\"['T, with comma']\",,\"['a', 'b']\",,,,,,https://x.com/a,https://x.com"
        );
        assert!(lines[2].contains("https://x.com/b"));
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_articles_csv_parses_back_with_all_columns() {
        let out = articles_csv(&[record("https://x.com/a")]).unwrap();
        let mut rdr = ::csv::Reader::from_reader(out.as_bytes());
        let row = rdr.records().next().unwrap().unwrap();
        assert_eq!(row.len(), 10);
        assert_eq!(&row[0], "['T, with comma']");
        assert_eq!(&row[1], "");
        assert_eq!(&row[8], "https://x.com/a");
    }

    #[test]
    fn test_categories_csv_sorted() {
        let cats = vec![
            CategoryRecord { categories: "World".to_string() },
            CategoryRecord { categories: "Sport".to_string() },
        ];
        assert_eq!(categories_csv(&cats).unwrap(), "categories\nSport\nWorld\n");
    }

    #[tokio::test]
    async fn test_write_batch_empty() {
        let dir = tempfile::tempdir().unwrap();
        write_batch(&CrawlBatch::default(), dir.path()).await.unwrap();
        let articles = std::fs::read_to_string(dir.path().join(ARTICLES_FILE)).unwrap();
        assert_eq!(articles.lines().count(), 1);
        let categories = std::fs::read_to_string(dir.path().join(CATEGORIES_FILE)).unwrap();
        assert_eq!(categories, "categories\n");
    }
}
