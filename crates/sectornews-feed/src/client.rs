//! HTTP client for keyword search feeds.

use std::time::Duration;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::{Client, Url};

use crate::error::FeedError;
use crate::parse::{parse_feed, FeedEntry};
use crate::retry::retry_with_backoff;

const DEFAULT_BASE_URL: &str = "https://news.google.com/rss/search";

/// Connection and locale settings for a [`FeedClient`].
#[derive(Debug, Clone)]
pub struct FeedSettings {
    /// Search endpoint; the keyword and locale are appended as query parameters.
    pub base_url: String,
    /// Interface language (`hl`).
    pub language: String,
    /// Edition country (`gl`).
    pub region: String,
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Extra attempts after the first failure for transient errors.
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            language: "ko".to_string(),
            region: "KR".to_string(),
            timeout_secs: 30,
            user_agent: "Mozilla/5.0 (compatible; sectornews/0.1)".to_string(),
            max_retries: 2,
            backoff_base_ms: 500,
        }
    }
}

/// Keyword search client for an RSS news endpoint.
///
/// Holds no per-request state, so one client can serve many concurrent
/// keyword fetches.
pub struct FeedClient {
    client: Client,
    base_url: Url,
    language: String,
    region: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl FeedClient {
    /// Creates a client with the configured timeout, `User-Agent`, and retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::InvalidBaseUrl`] if `settings.base_url` is not an
    /// absolute URL, or [`FeedError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(settings: FeedSettings) -> Result<Self, FeedError> {
        let base_url = Url::parse(&settings.base_url).map_err(|e| FeedError::InvalidBaseUrl {
            base_url: settings.base_url.clone(),
            reason: e.to_string(),
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(settings.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            base_url,
            language: settings.language,
            region: settings.region,
            max_retries: settings.max_retries,
            backoff_base_ms: settings.backoff_base_ms,
        })
    }

    /// Builds the search URL for `keyword`.
    #[must_use]
    pub fn search_url(&self, keyword: &str) -> String {
        let encoded = utf8_percent_encode(keyword, NON_ALPHANUMERIC);
        let lang = &self.language;
        let region = &self.region;
        let mut base = self.base_url.clone();
        base.set_query(None);
        format!("{base}?q={encoded}&hl={lang}&gl={region}&ceid={region}:{lang}")
    }

    /// Fetches the raw feed body for `keyword`, retrying transient failures.
    ///
    /// # Errors
    ///
    /// - [`FeedError::RateLimited`]: HTTP 429 after all retries exhausted.
    /// - [`FeedError::UnexpectedStatus`]: any other non-2xx status (5xx retried, 4xx not).
    /// - [`FeedError::Http`]: network, timeout, or TLS failure after all retries exhausted.
    pub async fn fetch_feed(&self, keyword: &str) -> Result<String, FeedError> {
        let url = self.search_url(keyword);

        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let url = url.clone();
            async move {
                let response = self.client.get(&url).send().await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);
                    return Err(FeedError::RateLimited { retry_after_secs });
                }

                if !status.is_success() {
                    return Err(FeedError::UnexpectedStatus {
                        status: status.as_u16(),
                        url,
                    });
                }

                Ok(response.text().await?)
            }
        })
        .await
    }

    /// Fetches and parses the feed for `keyword`.
    ///
    /// # Errors
    ///
    /// Propagates [`Self::fetch_feed`] errors, and returns [`FeedError::Xml`]
    /// if the body is not well-formed XML.
    pub async fn fetch_entries(&self, keyword: &str) -> Result<Vec<FeedEntry>, FeedError> {
        let body = self.fetch_feed(keyword).await?;
        let entries = parse_feed(&body)?;
        tracing::debug!(keyword, count = entries.len(), "parsed feed entries");
        Ok(entries)
    }
}
