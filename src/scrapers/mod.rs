//! Configuration-driven news scraping.
//!
//! Every site is scraped the same way, driven by its [`crate::config::SiteConfig`]
//! queries, in two phases:
//!
//! 1. **Indexing** ([`index`]): home page → category pages → article URLs
//! 2. **Extraction** ([`article`]): article page → [`crate::models::ArticleRecord`]
//!
//! # Failure Handling
//!
//! | Unit | On fetch failure |
//! |------|------------------|
//! | Home page | site yields no categories |
//! | Category page | skipped, other categories still visited |
//! | Article page | skipped, no record produced |
//! | Single field | field is null, the rest is extracted |

pub mod article;
pub mod index;
