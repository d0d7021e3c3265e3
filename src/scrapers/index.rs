//! Link discovery: home page → category pages → article links.
//!
//! Both resolvers swallow fetch failures. An unreachable home page yields no
//! categories; an unreachable category page is skipped and the others are
//! still visited.

use crate::config::SiteConfig;
use crate::fetcher::{PageFetcher, Transport};
use crate::links::{build_link, is_pdf};
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};

/// Discover category page URLs from a site's home page.
#[instrument(level = "info", skip_all, fields(site = %site.id, host = %site.host))]
pub async fn resolve_categories<T: Transport>(
    fetcher: &PageFetcher<T>,
    site: &SiteConfig,
) -> HashSet<String> {
    let document = match fetcher.fetch(&site.host).await {
        Ok(doc) => doc,
        Err(e) => {
            warn!(error = %e, "Failed to fetch home page; site yields no categories");
            return HashSet::new();
        }
    };

    let categories: HashSet<String> = site
        .category_link_query
        .select(&document)
        .iter()
        .map(|link| build_link(&site.host, link))
        .collect();

    info!(count = categories.len(), "Resolved category pages");
    debug!(categories = ?categories, "Category URLs");
    categories
}

/// Discover article URLs across all `categories` of a site.
///
/// PDF links are dropped.
#[instrument(level = "info", skip_all, fields(site = %site.id, categories = categories.len()))]
pub async fn resolve_article_links<T: Transport>(
    fetcher: &PageFetcher<T>,
    site: &SiteConfig,
    categories: &HashSet<String>,
) -> HashSet<String> {
    let mut articles = HashSet::new();

    for category in categories {
        let document = match fetcher.fetch(category).await {
            Ok(doc) => doc,
            Err(e) => {
                warn!(%category, error = %e, "Failed to fetch category page; skipping");
                continue;
            }
        };

        let before = articles.len();
        let mut pdfs = 0usize;
        for link in site.article_link_query.select(&document) {
            let url = build_link(&site.host, &link);
            if is_pdf(&url) {
                pdfs += 1;
                continue;
            }
            articles.insert(url);
        }
        debug!(%category, new = articles.len() - before, pdfs, "Collected article links");
    }

    info!(count = articles.len(), "Resolved article links");
    articles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_site;
    use crate::fetcher::test_fetcher;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn serve(server: &MockServer, route: &str, status: u16, body: &str) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_string(body.to_string()))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_resolve_categories_normalizes_and_dedupes() {
        let server = MockServer::start().await;
        let uri = server.uri();
        let home = format!(
            r#"<nav>
                <a class="category" href="/world">World</a>
                <a class="category" href="world">World again</a>
                <a class="category" href="{uri}/sport">Sport</a>
                <a class="other" href="/about">About</a>
            </nav>"#
        );
        serve(&server, "/", 200, &home).await;

        let site = test_site(&uri);
        let fetcher = test_fetcher();
        let first = resolve_categories(&fetcher, &site).await;
        let expected: HashSet<String> =
            [format!("{uri}/world"), format!("{uri}/sport")].into_iter().collect();
        assert_eq!(first, expected);

        let second = resolve_categories(&fetcher, &site).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_resolve_categories_home_failure_is_empty() {
        let server = MockServer::start().await;
        serve(&server, "/", 500, "").await;

        let site = test_site(&server.uri());
        let categories = resolve_categories(&test_fetcher(), &site).await;
        assert!(categories.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_article_links_skips_pdf_and_failed_categories() {
        let server = MockServer::start().await;
        let uri = server.uri();
        serve(
            &server,
            "/world",
            200,
            r#"<a class="article" href="/world/1">1</a>
               <a class="article" href="/files/report.pdf">pdf</a>
               <a class="article" href="/shared">shared</a>"#,
        )
        .await;
        serve(
            &server,
            "/sport",
            200,
            r#"<a class="article" href="sport/2">2</a>
               <a class="article" href="/shared">shared</a>"#,
        )
        .await;
        serve(&server, "/gone", 404, "").await;

        let site = test_site(&uri);
        let categories: HashSet<String> = ["/gone", "/world", "/sport"]
            .iter()
            .map(|p| format!("{uri}{p}"))
            .collect();

        let fetcher = test_fetcher();
        let links = resolve_article_links(&fetcher, &site, &categories).await;
        let expected: HashSet<String> = ["/world/1", "/sport/2", "/shared"]
            .iter()
            .map(|p| format!("{uri}{p}"))
            .collect();
        assert_eq!(links, expected);
        assert!(links.iter().all(|l| !l.ends_with(".pdf")));

        let again = resolve_article_links(&fetcher, &site, &categories).await;
        assert_eq!(links, again);
    }

    #[tokio::test]
    async fn test_resolve_article_links_no_categories() {
        let site = test_site("https://unused.example");
        let links = resolve_article_links(&test_fetcher(), &site, &HashSet::new()).await;
        assert!(links.is_empty());
    }
}
