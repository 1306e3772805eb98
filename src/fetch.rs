//! Network side of feed loading: fetch, parse, detect, normalize.
//!
//! The normalization core never touches the network. This module is the
//! collaborator that owns timeouts, retries and the response size limit, and
//! hands a parsed [`Document`] to [`normalize`].

use std::time::Duration;

use futures::StreamExt;
use thiserror::Error;

use crate::config::Config;
use crate::feed::{detect, parse_atom, parse_rss, Dialect, UnifiedFeed};
use crate::xml::{Document, XmlError};

/// Errors that can occur while fetching a feed document.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,
    /// Server returned 429 Too Many Requests after max retries
    #[error("Rate limited after {0} retries")]
    RateLimited(u32),
    /// Response body exceeded the configured size limit
    #[error("Response too large")]
    ResponseTooLarge,
    /// Response was incomplete (received fewer bytes than Content-Length)
    #[error("Incomplete response: expected {expected} bytes, received {received}")]
    IncompleteResponse { expected: u64, received: usize },
    /// Body was not a well-formed XML document
    #[error("Parse error: {0}")]
    Parse(#[from] XmlError),
}

/// Knobs for a single fetch.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub timeout: Duration,
    pub max_bytes: usize,
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each further attempt.
    pub backoff_base: Duration,
    pub user_agent: String,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for FetchOptions {
    fn from(config: &Config) -> Self {
        Self {
            timeout: config.timeout(),
            max_bytes: config.max_feed_bytes,
            max_retries: config.max_retries,
            backoff_base: Duration::from_secs(1),
            user_agent: config.user_agent.clone(),
        }
    }
}

impl FetchOptions {
    fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_base.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Builds an HTTP client carrying the configured `User-Agent`.
pub fn build_client(options: &FetchOptions) -> Result<reqwest::Client, FetchError> {
    reqwest::Client::builder()
        .user_agent(options.user_agent.as_str())
        .build()
        .map_err(FetchError::Network)
}

/// Runs dialect detection and the matching normalizer.
///
/// Returns `None` when the document is neither RSS nor Atom.
pub fn normalize(doc: &Document) -> Option<UnifiedFeed> {
    let Some(dialect) = detect(doc) else {
        tracing::warn!(root = %doc.root().name(), "Document is neither RSS nor Atom");
        return None;
    };

    let feed = match dialect {
        Dialect::Rss => parse_rss(doc),
        Dialect::Atom => parse_atom(doc),
    };
    tracing::debug!(dialect = %dialect, items = feed.items.len(), "Normalized feed");
    Some(feed)
}

/// Fetches `url` and normalizes the response.
///
/// `Ok(None)` means the document was fetched and parsed but is not a
/// recognized dialect.
pub async fn fetch_feed(
    client: &reqwest::Client,
    url: &str,
    options: &FetchOptions,
) -> Result<Option<UnifiedFeed>, FetchError> {
    let doc = fetch_document(client, url, options).await?;
    Ok(normalize(&doc))
}

/// Fetches `url` and parses the body as XML.
pub async fn fetch_document(
    client: &reqwest::Client,
    url: &str,
    options: &FetchOptions,
) -> Result<Document, FetchError> {
    let bytes = fetch_bytes(client, url, options).await?;
    Ok(Document::parse_bytes(&bytes)?)
}

/// Fetches the raw body of `url`.
///
/// # Behavior
///
/// - Each attempt, headers and body together, is bounded by `options.timeout`
/// - HTTP 429, 5xx and truncated bodies are retried with exponential backoff
///   up to `options.max_retries` times
/// - Other non-2xx statuses fail immediately
/// - Bodies larger than `options.max_bytes` are rejected
pub async fn fetch_bytes(
    client: &reqwest::Client,
    url: &str,
    options: &FetchOptions,
) -> Result<Vec<u8>, FetchError> {
    let mut retry_count = 0;

    loop {
        let attempt = fetch_once(client, url, options.max_bytes);
        let result = tokio::time::timeout(options.timeout, attempt)
            .await
            .unwrap_or(Err(FetchError::Timeout));

        let error = match result {
            Ok(bytes) => {
                tracing::debug!(url = %url, bytes = bytes.len(), "Fetched feed");
                return Ok(bytes);
            }
            Err(e) if is_retryable(&e) => e,
            Err(e) => return Err(e),
        };

        if retry_count >= options.max_retries {
            return Err(match error {
                FetchError::HttpStatus(429) => FetchError::RateLimited(options.max_retries),
                other => other,
            });
        }

        let delay = options.backoff(retry_count);
        tracing::warn!(
            url = %url,
            error = %error,
            retry = retry_count,
            delay_ms = delay.as_millis() as u64,
            "Fetch failed, retrying after delay"
        );
        tokio::time::sleep(delay).await;
        retry_count += 1;
    }
}

/// 429, 5xx and truncated bodies; everything else is final.
fn is_retryable(error: &FetchError) -> bool {
    match error {
        FetchError::HttpStatus(status) => *status == 429 || (500..=599).contains(status),
        FetchError::IncompleteResponse { .. } => true,
        _ => false,
    }
}

/// One request/response cycle with no retry or timeout of its own.
async fn fetch_once(
    client: &reqwest::Client,
    url: &str,
    max_bytes: usize,
) -> Result<Vec<u8>, FetchError> {
    let response = client.get(url).send().await.map_err(FetchError::Network)?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::HttpStatus(status.as_u16()));
    }

    read_limited_bytes(response, max_bytes).await
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    let expected_length = response.content_length();

    // Fast path: check Content-Length header
    if let Some(len) = expected_length {
        if len > limit as u64 {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    if let Some(expected) = expected_length {
        if (bytes.len() as u64) < expected {
            return Err(FetchError::IncompleteResponse {
                expected,
                received: bytes.len(),
            });
        }
    }

    Ok(bytes)
}
