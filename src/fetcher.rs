//! Page fetching with exponential backoff retry logic.
//!
//! Transport concerns stop at this module: the rest of the pipeline only ever
//! sees a parsed [`Html`] document or a [`FetchError`].
//!
//! # Architecture
//!
//! - [`Transport`]: core trait, one HTTP GET returning status and raw body
//! - [`HttpTransport`]: `reqwest`-backed implementation
//! - [`RetryTransport`]: decorator that retries transport failures and 5xx
//!   statuses on any `Transport`
//! - [`PageFetcher`]: classifies the response and parses the body
//!
//! # Retry Strategy
//!
//! - Exponential backoff starting at `base_delay`
//! - Maximum delay capped at 30 seconds
//! - Random jitter (0 to `max_jitter`) added to every delay

use crate::errors::{FetchError, TransportError};
use rand::{Rng, rng};
use reqwest::Client;
use scraper::Html;
use std::fmt;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};

/// Status line and raw body of an HTTP response.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Trait for a single HTTP GET.
///
/// Implementations return `Ok` for any response the server sent, whatever its
/// status, and `Err` when no response could be obtained.
pub trait Transport {
    async fn get(&self, url: &str) -> Result<RawResponse, TransportError>;
}

/// `reqwest`-backed [`Transport`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build a client with the given user agent and request timeout.
    pub fn new(user_agent: &str, timeout: StdDuration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .connect_timeout(timeout.min(StdDuration::from_secs(10)))
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    #[instrument(level = "debug", skip(self))]
    async fn get(&self, url: &str) -> Result<RawResponse, TransportError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TransportError::Request(describe(&e)))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Request(describe(&e)))?;
        Ok(RawResponse {
            status,
            body: body.to_vec(),
        })
    }
}

fn describe(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("timeout: {e}")
    } else if e.is_connect() {
        format!("connection failed: {e}")
    } else {
        e.to_string()
    }
}

/// Wrapper that adds exponential backoff retry logic to any [`Transport`].
///
/// Transport failures and 5xx responses are retried; every other response is
/// returned as-is on the first attempt.
///
/// # Backoff Strategy
///
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..=max_jitter)
/// ```
pub struct RetryTransport<T> {
    inner: T,
    max_retries: usize,
    base_delay: StdDuration,
    max_delay: StdDuration,
    max_jitter: StdDuration,
}

impl<T> RetryTransport<T>
where
    T: Transport,
{
    /// Wrap `inner`, retrying up to `max_retries` times after the first attempt.
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
            max_jitter: StdDuration::from_millis(250),
        }
    }

    /// Override the jitter ceiling (zero disables jitter).
    #[cfg(test)]
    pub fn with_max_jitter(mut self, max_jitter: StdDuration) -> Self {
        self.max_jitter = max_jitter;
        self
    }

    fn delay_for(&self, attempt: usize) -> StdDuration {
        let shift = (attempt - 1).min(16) as u32;
        let delay = self.base_delay.saturating_mul(1 << shift).min(self.max_delay);
        let jitter_ms = self.max_jitter.as_millis() as u64;
        if jitter_ms == 0 {
            delay
        } else {
            delay + StdDuration::from_millis(rng().random_range(0..=jitter_ms))
        }
    }
}

impl<T> fmt::Debug for RetryTransport<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryTransport")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> Transport for RetryTransport<T>
where
    T: Transport,
{
    #[instrument(level = "debug", skip(self))]
    async fn get(&self, url: &str) -> Result<RawResponse, TransportError> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let outcome = match self.inner.get(url).await {
                Ok(resp) if resp.status >= 500 => Err(TransportError::Status(resp.status)),
                other => other,
            };
            let e = match outcome {
                Ok(resp) => return Ok(resp),
                Err(e) => e,
            };

            attempt += 1;
            let total_dt = total_t0.elapsed();
            if attempt > self.max_retries {
                error!(
                    attempt,
                    max = self.max_retries,
                    elapsed_ms_total = total_dt.as_millis() as u64,
                    error = %e,
                    "GET exhausted retries"
                );
                return Err(e);
            }

            let delay = self.delay_for(attempt);
            warn!(
                attempt,
                max = self.max_retries,
                elapsed_ms_total = total_dt.as_millis() as u64,
                ?delay,
                error = %e,
                "GET attempt failed; backing off"
            );
            sleep(delay).await;
        }
    }
}

/// Fetches pages and parses them into documents.
#[derive(Debug)]
pub struct PageFetcher<T> {
    transport: T,
}

impl<T: Transport> PageFetcher<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Fetch `url` and parse it.
    ///
    /// Only a 200 response yields a document; 404 maps to
    /// [`FetchError::NotFound`], any other status to
    /// [`FetchError::ServerError`], and transport failure to
    /// [`FetchError::Network`].
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch(&self, url: &str) -> Result<Html, FetchError> {
        let t0 = Instant::now();
        let response = self.transport.get(url).await?;
        match response.status {
            200 => {
                let text = String::from_utf8_lossy(&response.body);
                debug!(
                    bytes = response.body.len(),
                    elapsed_ms = t0.elapsed().as_millis() as u64,
                    "Fetched page"
                );
                Ok(Html::parse_document(&text))
            }
            404 => Err(FetchError::NotFound),
            status => Err(FetchError::ServerError(status)),
        }
    }
}

/// Assemble the production fetcher: reqwest transport behind retries.
pub fn http_fetcher(
    user_agent: &str,
    timeout: StdDuration,
    max_retries: usize,
) -> Result<PageFetcher<RetryTransport<HttpTransport>>, reqwest::Error> {
    let http = HttpTransport::new(user_agent, timeout)?;
    Ok(PageFetcher::new(RetryTransport::new(
        http,
        max_retries,
        StdDuration::from_secs(1),
    )))
}

#[cfg(test)]
pub fn test_fetcher() -> PageFetcher<RetryTransport<HttpTransport>> {
    let http = HttpTransport::new("news_extract-test", StdDuration::from_secs(5)).unwrap();
    PageFetcher::new(
        RetryTransport::new(http, 1, StdDuration::from_millis(1)).with_max_jitter(StdDuration::ZERO),
    )
}
