//! Article extraction.
//!
//! Each field is extracted on its own: a page missing the tags markup still
//! yields its title, body and everything else. Only a failed fetch drops the
//! whole article.

use crate::config::{Field, SiteConfig};
use crate::errors::FieldExtractionError;
use crate::fetcher::{PageFetcher, Transport};
use crate::models::ArticleRecord;
use crate::utils::{sanitize, truncate_for_log, upcase};
use scraper::Html;
use tracing::{debug, info, instrument, warn};

/// Evaluate one field query against an article document.
///
/// An empty match is reported as [`FieldExtractionError::NoMatch`].
/// Images and publication dates are returned raw: sanitizing would turn the
/// hyphens in URLs and ISO dates into spaces.
pub fn extract_field(
    document: &Html,
    site: &SiteConfig,
    field: Field,
) -> Result<Vec<String>, FieldExtractionError> {
    let values = site.field_queries.get(field).select(document);
    if values.is_empty() {
        return Err(FieldExtractionError::NoMatch { field: field.name() });
    }
    Ok(match field {
        Field::Images | Field::PublicationDate => values,
        _ => sanitize(&values),
    })
}

/// [`extract_field`] folded into an `Option`, logging the miss.
fn field_or_null(document: &Html, site: &SiteConfig, field: Field) -> Option<Vec<String>> {
    match extract_field(document, site, field) {
        Ok(values) => Some(values),
        Err(e) => {
            warn!(
                field = field.name(),
                query = %site.field_queries.get(field),
                error = %e,
                "Field not extracted; leaving it null"
            );
            None
        }
    }
}

/// Category label for an article: all fragments concatenated, then the
/// leading character uppercased. No categories gives an empty label.
pub fn category_label(categories: Option<&[String]>) -> String {
    upcase(&categories.map(|c| c.concat()).unwrap_or_default())
}

/// Build the record and category label from an already parsed page.
pub fn extract_document(document: &Html, site: &SiteConfig, url: &str) -> (ArticleRecord, String) {
    let categories = field_or_null(document, site, Field::Categories);
    let record = ArticleRecord {
        title: field_or_null(document, site, Field::Title),
        subtitle: field_or_null(document, site, Field::Subtitle),
        body: field_or_null(document, site, Field::Body),
        images: field_or_null(document, site, Field::Images),
        category_long: field_or_null(document, site, Field::CategoryLong),
        tags: field_or_null(document, site, Field::Tags),
        author: field_or_null(document, site, Field::Author),
        publication_date: field_or_null(document, site, Field::PublicationDate),
        news_url: url.to_string(),
        host: site.host.clone(),
    };
    (record, category_label(categories.as_deref()))
}

/// Fetch and extract a single article.
///
/// Returns `None` when the page cannot be fetched; the caller skips it.
#[instrument(level = "info", skip(fetcher, site), fields(site = %site.id))]
pub async fn extract<T: Transport>(
    fetcher: &PageFetcher<T>,
    site: &SiteConfig,
    url: &str,
) -> Option<(ArticleRecord, String)> {
    let document = match fetcher.fetch(url).await {
        Ok(doc) => doc,
        Err(e) => {
            warn!(error = %e, "Error while fetching article; skipping");
            return None;
        }
    };

    let (record, label) = extract_document(&document, site, url);
    let title = record
        .title
        .as_ref()
        .map(|t| truncate_for_log(&t.concat(), 120))
        .unwrap_or_default();
    info!(%title, category = %label, "Extracted article");
    debug!(
        body_fragments = record.body.as_ref().map_or(0, Vec::len),
        images = record.images.as_ref().map_or(0, Vec::len),
        "Article field counts"
    );
    Some((record, label))
}
