//! Markup queries used by the site configuration.
//!
//! A query is a CSS selector with an optional trailing pseudo-element that
//! says what to pull out of every matched element:
//!
//! | Query | Yields |
//! |-------|--------|
//! | `h1.title` | trimmed text of each `h1.title` |
//! | `h1.title::text` | same as above |
//! | `nav a::attr(href)` | `href` of each `nav a` that has one |
//!
//! Queries are parsed once when the configuration is loaded, so evaluation
//! itself cannot fail; an empty result is the only "error" a page can cause.

use scraper::{Html, Selector};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    Text,
    Attr(String),
}

/// A parsed, ready-to-evaluate markup query.
#[derive(Clone)]
pub struct Query {
    source: String,
    selector: Selector,
    target: Target,
}

impl Query {
    /// Parse a query expression.
    ///
    /// Returns a human-readable reason on failure; callers wrap it into a
    /// [`crate::errors::ConfigError`] with the site it belongs to.
    pub fn parse(expr: &str) -> Result<Self, String> {
        let expr = expr.trim();
        let (css, target) = if let Some(css) = expr.strip_suffix("::text") {
            (css, Target::Text)
        } else if let Some(rest) = expr.strip_suffix(')') {
            match rest.rsplit_once("::attr(") {
                Some((css, name)) if !name.trim().is_empty() => {
                    (css, Target::Attr(name.trim().to_string()))
                }
                Some(_) => return Err("empty attribute name".to_string()),
                None => (expr, Target::Text),
            }
        } else {
            (expr, Target::Text)
        };

        let css = css.trim();
        if css.is_empty() {
            return Err("empty selector".to_string());
        }
        let selector = Selector::parse(css).map_err(|e| e.to_string())?;

        Ok(Self {
            source: expr.to_string(),
            selector,
            target,
        })
    }

    /// The expression this query was parsed from.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Evaluate against a parsed document, in document order.
    pub fn select(&self, document: &Html) -> Vec<String> {
        document
            .select(&self.selector)
            .filter_map(|element| match &self.target {
                Target::Text => Some(element.text().collect::<String>().trim().to_string()),
                Target::Attr(name) => element.value().attr(name).map(|v| v.trim().to_string()),
            })
            .collect()
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Query").field(&self.source).finish()
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
