//! Crawl orchestration across all configured sites.
//!
//! Each site walks the same sequence of states:
//!
//! ```text
//! Idle → ResolveCategories → ResolveArticleLinks → ExtractArticles → Accumulate
//! ```
//!
//! then the next site starts. Once every site is done, category labels are
//! de-duplicated against the seen set and the [`CrawlBatch`] is returned. No
//! error is fatal here; the batch may simply be empty.

use crate::config::SiteConfig;
use crate::fetcher::{PageFetcher, Transport};
use crate::models::{ArticleRecord, CategoryRecord, CrawlBatch};
use crate::scrapers::{article, index};
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info, instrument};

/// Per-site crawl phase, used for log context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlState {
    Idle,
    ResolveCategories,
    ResolveArticleLinks,
    ExtractArticles,
    Accumulate,
    Done,
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CrawlState::Idle => "idle",
            CrawlState::ResolveCategories => "resolve_categories",
            CrawlState::ResolveArticleLinks => "resolve_article_links",
            CrawlState::ExtractArticles => "extract_articles",
            CrawlState::Accumulate => "accumulate",
            CrawlState::Done => "done",
        };
        f.write_str(s)
    }
}

/// Entries recorded by earlier runs.
#[derive(Debug, Default, Clone)]
pub struct SeenSets {
    pub urls: HashSet<String>,
    pub categories: HashSet<String>,
}

#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Article pages fetched at once within a site; 1 is fully sequential.
    pub concurrency: usize,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self { concurrency: 1 }
    }
}

/// Crawl every site in order and collect new articles and categories.
///
/// `seen` is taken by value: URLs scraped during the run are added to it so
/// an article linked from two sites is only extracted once.
#[instrument(level = "info", skip_all, fields(sites = sites.len()))]
pub async fn crawl<T: Transport>(
    fetcher: &PageFetcher<T>,
    sites: &[SiteConfig],
    mut seen: SeenSets,
    options: &CrawlOptions,
) -> CrawlBatch {
    let mut batch = CrawlBatch::default();
    let mut pending_categories: Vec<String> = Vec::new();

    for site in sites {
        let (records, labels) = crawl_site(fetcher, site, &seen.urls, options).await;
        for record in &records {
            seen.urls.insert(record.news_url.clone());
            batch.new_urls.push(record.news_url.clone());
        }
        batch.articles.extend(records);
        pending_categories.extend(labels);
        debug!(site = %site.id, state = %CrawlState::Accumulate, total = batch.articles.len(), "Accumulated site results");
    }

    for name in pending_categories
        .into_iter()
        .filter(|c| !c.is_empty())
        .unique()
    {
        if seen.categories.contains(&name) {
            continue;
        }
        batch.categories.push(CategoryRecord {
            categories: name.clone(),
        });
        batch.new_categories.push(name);
    }

    info!(
        state = %CrawlState::Done,
        articles = batch.articles.len(),
        categories = batch.categories.len(),
        "Crawl finished"
    );
    batch
}

/// Run one site through discovery and extraction.
#[instrument(level = "info", skip_all, fields(site = %site.id, host = %site.host))]
async fn crawl_site<T: Transport>(
    fetcher: &PageFetcher<T>,
    site: &SiteConfig,
    seen_urls: &HashSet<String>,
    options: &CrawlOptions,
) -> (Vec<ArticleRecord>, Vec<String>) {
    info!(state = %CrawlState::Idle, "Beginning scraper");

    debug!(state = %CrawlState::ResolveCategories, "Resolving categories");
    let categories = index::resolve_categories(fetcher, site).await;

    debug!(state = %CrawlState::ResolveArticleLinks, "Resolving article links");
    let links = index::resolve_article_links(fetcher, site, &categories).await;

    let to_scrape: Vec<&String> = links.iter().filter(|l| !seen_urls.contains(*l)).collect();
    info!(
        state = %CrawlState::ExtractArticles,
        found = links.len(),
        already_seen = links.len() - to_scrape.len(),
        to_scrape = to_scrape.len(),
        "Extracting articles"
    );

    let results: Vec<Option<(ArticleRecord, String)>> = stream::iter(to_scrape)
        .map(|url| article::extract(fetcher, site, url))
        .buffer_unordered(options.concurrency.max(1))
        .collect()
        .await;

    let (records, labels): (Vec<_>, Vec<_>) = results.into_iter().flatten().unzip();
    info!(extracted = records.len(), "Site complete");
    (records, labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_site;
    use crate::fetcher::test_fetcher;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn serve(server: &MockServer, route: &str, body: String) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    fn article_page(title: &str, categories: &[&str]) -> String {
        let cats: String = categories.iter().map(|c| format!("<li>{c}</li>")).collect();
        format!(
            r#"<html><body><h1 class="title">{title}</h1>
            <div class="body"><p>Body of {title}</p></div>
            <ul class="categories">{cats}</ul></body></html>"#
        )
    }

    /// Home with two categories, each listing two articles and one PDF.
    async fn mount_site(server: &MockServer) {
        serve(
            server,
            "/",
            r#"<nav><a class="category" href="/world">World</a>
               <a class="category" href="/sport">Sport</a></nav>"#
                .to_string(),
        )
        .await;
        for cat in ["world", "sport"] {
            serve(
                server,
                &format!("/{cat}"),
                format!(
                    r#"<a class="article" href="/{cat}/1">1</a>
                       <a class="article" href="/{cat}/2">2</a>
                       <a class="article" href="/{cat}/brief.pdf">pdf</a>"#
                ),
            )
            .await;
            for n in 1..=2 {
                serve(
                    server,
                    &format!("/{cat}/{n}"),
                    article_page(&format!("{cat} {n}"), &[cat]),
                )
                .await;
            }
        }
    }

    #[tokio::test]
    async fn test_crawl_single_site() {
        let server = MockServer::start().await;
        mount_site(&server).await;
        let sites = vec![test_site(&server.uri())];

        let batch = crawl(&test_fetcher(), &sites, SeenSets::default(), &CrawlOptions::default()).await;

        assert_eq!(batch.articles.len(), 4);
        assert_eq!(batch.new_urls.len(), 4);
        for record in &batch.articles {
            assert!(record.title.is_some());
            assert!(record.body.is_some());
            assert_eq!(record.tags, None);
            assert_eq!(record.author, None);
            assert!(!record.news_url.ends_with(".pdf"));
        }
        let mut names: Vec<_> = batch.categories.iter().map(|c| c.categories.as_str()).collect();
        names.sort();
        assert_eq!(names, vec!["Sport", "World"]);
    }

    #[tokio::test]
    async fn test_second_run_skips_recorded_urls() {
        let server = MockServer::start().await;
        mount_site(&server).await;
        let sites = vec![test_site(&server.uri())];
        let dir = tempfile::tempdir().unwrap();
        let urls_path = dir.path().join("urls.txt");
        let categories_path = dir.path().join("categories.txt");

        let first = crawl(&test_fetcher(), &sites, SeenSets::default(), &CrawlOptions::default()).await;
        crate::seen::append_seen(&urls_path, &first.new_urls).await.unwrap();
        crate::seen::append_seen(&categories_path, &first.new_categories).await.unwrap();
        assert_eq!(std::fs::read_to_string(&urls_path).unwrap().lines().count(), 4);

        let seen = SeenSets {
            urls: crate::seen::load_seen(&urls_path).await.unwrap(),
            categories: crate::seen::load_seen(&categories_path).await.unwrap(),
        };
        let second = crawl(&test_fetcher(), &sites, seen, &CrawlOptions::default()).await;
        assert!(second.articles.is_empty());
        assert!(second.categories.is_empty());
        assert!(second.new_urls.is_empty());
    }

    #[tokio::test]
    async fn test_seen_urls_are_not_extracted() {
        let server = MockServer::start().await;
        mount_site(&server).await;

        let uri = server.uri();
        let seen = SeenSets {
            urls: [format!("{uri}/world/1")].into_iter().collect(),
            categories: ["World".to_string()].into_iter().collect(),
        };
        let sites = vec![test_site(&uri)];
        let batch = crawl(&test_fetcher(), &sites, seen, &CrawlOptions::default()).await;

        assert_eq!(batch.articles.len(), 3);
        assert!(batch.articles.iter().all(|a| a.news_url != format!("{uri}/world/1")));
        assert_eq!(batch.new_categories, vec!["Sport".to_string()]);

        let requests = server.received_requests().await.unwrap();
        assert!(!requests.iter().any(|r| r.url.path() == "/world/1"));
    }

    #[tokio::test]
    async fn test_failed_articles_and_sites_do_not_abort() {
        let server = MockServer::start().await;
        let uri = server.uri();
        serve(&server, "/", r#"<nav><a class="category" href="/world">w</a></nav>"#.to_string()).await;
        serve(
            &server,
            "/world",
            r#"<a class="article" href="/world/ok">ok</a><a class="article" href="/world/broken">x</a>"#
                .to_string(),
        )
        .await;
        serve(&server, "/world/ok", article_page("ok", &[])).await;
        Mock::given(method("GET"))
            .and(path("/world/broken"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let unreachable = test_site("http://127.0.0.1:1");
        let sites = vec![unreachable, test_site(&uri)];
        let batch = crawl(&test_fetcher(), &sites, SeenSets::default(), &CrawlOptions::default()).await;

        assert_eq!(batch.articles.len(), 1);
        assert_eq!(batch.new_urls, vec![format!("{uri}/world/ok")]);
        let requests = server.received_requests().await.unwrap();
        assert!(requests.iter().any(|r| r.url.path() == "/world/broken"));
        // Empty label from a page without categories is never emitted.
        assert!(batch.categories.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_extraction_matches_sequential() {
        let server = MockServer::start().await;
        mount_site(&server).await;
        let sites = vec![test_site(&server.uri())];

        let options = CrawlOptions { concurrency: 4 };
        let batch = crawl(&test_fetcher(), &sites, SeenSets::default(), &options).await;
        let mut urls = batch.new_urls.clone();
        urls.sort();
        let uri = server.uri();
        assert_eq!(
            urls,
            vec![
                format!("{uri}/sport/1"),
                format!("{uri}/sport/2"),
                format!("{uri}/world/1"),
                format!("{uri}/world/2"),
            ]
        );
    }

    #[test]
    fn test_state_display() {
        assert_eq!(CrawlState::ResolveArticleLinks.to_string(), "resolve_article_links");
        assert_eq!(CrawlState::Done.to_string(), "done");
    }
}
