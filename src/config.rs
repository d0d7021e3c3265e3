//! Site query registry.
//!
//! One entry per supported news site, describing where its category links
//! live, where article links live on a category page, and how to pull each
//! article field. The file keeps the historical key names (`url`,
//! `categories_links`, `articles`, `queries.content`):
//!
//! ```yaml
//! news_sites:
//!   - id: vanguardia
//!     url: https://www.vanguardia.com
//!     categories_links: "nav.menu a::attr(href)"
//!     articles: "article h2 a::attr(href)"
//!     queries:
//!       title: "h1.title"
//!       subtitle: "h2.subtitle"
//!       content: "div.article-body p"
//!       images: "figure img::attr(src)"
//!       category_long: "nav.breadcrumb a"
//!       tags: "ul.tags a"
//!       author: "span.author"
//!       publication_date: "time::attr(datetime)"
//!       categories: "nav.breadcrumb a:last-child"
//! ```
//!
//! Entries are validated one by one; a malformed entry is logged and dropped
//! without affecting the others.

use crate::errors::ConfigError;
use crate::query::Query;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::{debug, error, info, instrument};
use url::Url;

/// An article field that has its own query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    Subtitle,
    Body,
    Images,
    CategoryLong,
    Tags,
    Author,
    PublicationDate,
    Categories,
}

impl Field {
    pub const ALL: [Field; 9] = [
        Field::Title,
        Field::Subtitle,
        Field::Body,
        Field::Images,
        Field::CategoryLong,
        Field::Tags,
        Field::Author,
        Field::PublicationDate,
        Field::Categories,
    ];

    /// Name used in logs and output columns.
    pub fn name(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Subtitle => "subtitle",
            Field::Body => "body",
            Field::Images => "images",
            Field::CategoryLong => "category_long",
            Field::Tags => "tags",
            Field::Author => "author",
            Field::PublicationDate => "publication_date",
            Field::Categories => "categories",
        }
    }

    /// Key under `queries:` in the YAML file.
    fn config_key(self) -> &'static str {
        match self {
            Field::Body => "content",
            other => other.name(),
        }
    }
}

/// Queries for every article field of one site.
#[derive(Debug, Clone)]
pub struct FieldQueries {
    title: Query,
    subtitle: Query,
    body: Query,
    images: Query,
    category_long: Query,
    tags: Query,
    author: Query,
    publication_date: Query,
    categories: Query,
}

impl FieldQueries {
    pub fn get(&self, field: Field) -> &Query {
        match field {
            Field::Title => &self.title,
            Field::Subtitle => &self.subtitle,
            Field::Body => &self.body,
            Field::Images => &self.images,
            Field::CategoryLong => &self.category_long,
            Field::Tags => &self.tags,
            Field::Author => &self.author,
            Field::PublicationDate => &self.publication_date,
            Field::Categories => &self.categories,
        }
    }
}

/// Validated configuration of a single news site.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Explicit site identifier.
    pub id: String,
    /// Home page URL, without trailing slash.
    pub host: String,
    pub category_link_query: Query,
    pub article_link_query: Query,
    pub field_queries: FieldQueries,
}

/// Raw YAML shape of one site entry.
#[derive(Debug, Deserialize)]
struct SiteEntry {
    id: Option<String>,
    url: Option<String>,
    categories_links: Option<String>,
    articles: Option<String>,
    #[serde(default)]
    queries: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct SitesFile {
    news_sites: Vec<SiteEntry>,
}

fn parse_query(site: &str, name: &'static str, expr: Option<&String>) -> Result<Query, ConfigError> {
    let expr = expr
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingQuery {
            site: site.to_string(),
            query: name,
        })?;
    Query::parse(expr).map_err(|reason| ConfigError::InvalidQuery {
        site: site.to_string(),
        query: expr.clone(),
        reason,
    })
}

impl SiteConfig {
    fn from_entry(ordinal: usize, entry: SiteEntry) -> Result<Self, ConfigError> {
        let id = entry.id.unwrap_or_else(|| ordinal.to_string());

        let url = entry
            .url
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingHost { site: id.clone() })?;
        let host = url.trim().trim_end_matches('/').to_string();
        let host_ok = Url::parse(&host)
            .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
            .unwrap_or(false);
        if !host_ok {
            return Err(ConfigError::InvalidHost {
                site: id,
                host: url,
            });
        }

        let category_link_query = parse_query(&id, "categories_links", entry.categories_links.as_ref())?;
        let article_link_query = parse_query(&id, "articles", entry.articles.as_ref())?;

        let q = |field: Field| parse_query(&id, field.config_key(), entry.queries.get(field.config_key()));
        let field_queries = FieldQueries {
            title: q(Field::Title)?,
            subtitle: q(Field::Subtitle)?,
            body: q(Field::Body)?,
            images: q(Field::Images)?,
            category_long: q(Field::CategoryLong)?,
            tags: q(Field::Tags)?,
            author: q(Field::Author)?,
            publication_date: q(Field::PublicationDate)?,
            categories: q(Field::Categories)?,
        };

        Ok(Self {
            id,
            host,
            category_link_query,
            article_link_query,
            field_queries,
        })
    }
}

/// Parse site configuration from YAML text.
///
/// Invalid entries are logged and skipped. Fails only if the document itself
/// cannot be parsed, if two valid entries share an id, or if nothing usable is
/// left.
pub fn parse_sites(yaml: &str) -> Result<Vec<SiteConfig>, ConfigError> {
    let file: SitesFile = serde_yaml::from_str(yaml)?;

    let mut sites = Vec::with_capacity(file.news_sites.len());
    let mut ids = HashSet::new();
    for (ordinal, entry) in file.news_sites.into_iter().enumerate() {
        match SiteConfig::from_entry(ordinal, entry) {
            Ok(site) => {
                if !ids.insert(site.id.clone()) {
                    return Err(ConfigError::DuplicateId(site.id));
                }
                for field in Field::ALL {
                    debug!(site = %site.id, field = field.name(), query = %site.field_queries.get(field), "Field query");
                }
                sites.push(site);
            }
            Err(e) => error!(ordinal, error = %e, "Skipping misconfigured site"),
        }
    }

    if sites.is_empty() {
        return Err(ConfigError::NoSites);
    }
    Ok(sites)
}

/// Load and validate the site configuration file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn load_sites(path: &Path) -> Result<Vec<SiteConfig>, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let sites = parse_sites(&content)?;
    info!(count = sites.len(), "Loaded site configuration");
    Ok(sites)
}

/// Keep only the sites whose id is listed in `only`; an empty list keeps all.
///
/// A filter that matches nothing is an error, so a mistyped `--site` never
/// runs an empty crawl over the previous outputs.
pub fn select_sites(sites: Vec<SiteConfig>, only: &[String]) -> Result<Vec<SiteConfig>, ConfigError> {
    if only.is_empty() {
        return Ok(sites);
    }
    let selected: Vec<SiteConfig> = sites.into_iter().filter(|s| only.contains(&s.id)).collect();
    if selected.is_empty() {
        return Err(ConfigError::NoSiteSelected(only.to_vec()));
    }
    Ok(selected)
}

/// Build a site with simple, predictable queries for tests.
#[cfg(test)]
pub fn test_site(host: &str) -> SiteConfig {
    let yaml = format!(
        r#"
news_sites:
  - id: test
    url: {host}
    categories_links: "nav a.category::attr(href)"
    articles: "a.article::attr(href)"
    queries:
      title: "h1.title"
      subtitle: "h2.subtitle"
      content: "div.body p"
      images: "figure img::attr(src)"
      category_long: "nav.breadcrumb a"
      tags: "ul.tags li"
      author: "span.author"
      publication_date: "time::attr(datetime)"
      categories: "ul.categories li"
"#
    );
    parse_sites(&yaml)
        .expect("test site config is valid")
        .remove(0)
}
