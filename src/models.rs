//! Data models for scraped articles, derived categories and the run batch.
//!
//! - [`ArticleRecord`]: fields extracted from one article page
//! - [`CategoryRecord`]: one category label first seen in this run
//! - [`CrawlBatch`]: everything one run produced, owned by the crawler

use serde::{Deserialize, Serialize};

/// Column order of the article batch.
pub const ARTICLE_COLUMNS: [&str; 10] = [
    "title",
    "subtitle",
    "body",
    "images",
    "category_long",
    "tags",
    "author",
    "publication_date",
    "news_url",
    "host",
];

/// A news article as extracted from its page.
///
/// Every content field is `None` when its query found nothing on the page.
/// `news_url` and `host` are always set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub title: Option<Vec<String>>,
    pub subtitle: Option<Vec<String>>,
    pub body: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
    pub category_long: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub author: Option<Vec<String>>,
    pub publication_date: Option<Vec<String>>,
    pub news_url: String,
    pub host: String,
}

impl ArticleRecord {
    /// Row in [`ARTICLE_COLUMNS`] order, nulls as empty cells.
    pub fn to_row(&self) -> [String; 10] {
        [
            list_cell(&self.title),
            list_cell(&self.subtitle),
            list_cell(&self.body),
            list_cell(&self.images),
            list_cell(&self.category_long),
            list_cell(&self.tags),
            list_cell(&self.author),
            list_cell(&self.publication_date),
            self.news_url.clone(),
            self.host.clone(),
        ]
    }
}

/// Render a sequence field as a list literal, e.g. `['a', 'b']`.
///
/// The cleaning stage downstream splits these cells on `',`, so each element is
/// wrapped in single quotes. An element containing `'` is double-quoted
/// instead, and the quote character and backslash are escaped when both kinds
/// appear. `None` becomes an empty cell.
pub fn list_cell(value: &Option<Vec<String>>) -> String {
    match value {
        None => String::new(),
        Some(items) => {
            let inner = items.iter().map(|s| quote_item(s)).collect::<Vec<_>>().join(", ");
            format!("[{inner}]")
        }
    }
}

fn quote_item(item: &str) -> String {
    let quote = if item.contains('\'') && !item.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(item.len() + 2);
    out.push(quote);
    for c in item.chars() {
        if c == quote || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push(quote);
    out
}

/// A category label derived from an article page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub categories: String,
}

/// Output of one crawl run.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CrawlBatch {
    pub articles: Vec<ArticleRecord>,
    pub categories: Vec<CategoryRecord>,
    /// Article URLs scraped in this run, to append to the seen-URL file.
    #[serde(skip)]
    pub new_urls: Vec<String>,
    /// Category names emitted in this run, to append to the seen-category file.
    #[serde(skip)]
    pub new_categories: Vec<String>,
}
