//! Link normalization for hrefs scraped off home, category and article pages.
//!
//! Sites publish links in three shapes: absolute (`https://host/path`),
//! root-relative (`/path`) and bare relative (`path`). [`build_link`] turns all
//! three into an absolute URL anchored at the site host.

use once_cell::sync::Lazy;
use regex::Regex;

static WELL_FORMED_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://.+/.+$").expect("valid regex literal"));
static ROOT_PATH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^/.+$").expect("valid regex literal"));
static PDF_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://.+\.pdf$").expect("valid regex literal"));

/// Build an absolute URL for `link` as found on a page of `host`.
///
/// `host` is expected without a trailing slash (site config strips it).
///
/// # Examples
///
/// ```ignore
/// assert_eq!(build_link("https://x.com", "/news/1"), "https://x.com/news/1");
/// assert_eq!(build_link("https://x.com", "news/1"), "https://x.com/news/1");
/// ```
pub fn build_link(host: &str, link: &str) -> String {
    if WELL_FORMED_LINK.is_match(link) {
        link.to_string()
    } else if ROOT_PATH.is_match(link) {
        format!("{host}{link}")
    } else {
        format!("{host}/{link}")
    }
}

/// True when `url` points at a PDF document (literal lowercase `.pdf`).
pub fn is_pdf(url: &str) -> bool {
    PDF_LINK.is_match(url)
}
