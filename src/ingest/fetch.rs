// src/ingest/fetch.rs
use std::time::Duration;

use async_trait::async_trait;
use metrics::counter;
use reqwest::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use thiserror::Error;

use crate::ingest::types::{FeedSource, RawDocument};

pub const DEFAULT_TIMEOUT_MS: u64 = 8_000;
pub const DEFAULT_USER_AGENT: &str = "JunctaJuvantBot/1.0 (+https://junctajuvant.com)";
/// Bodies above this are refused.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

const ACCEPT_FEEDS: &str = "application/rss+xml, application/atom+xml, application/feed+json, \
                            application/json;q=0.9, application/xml;q=0.9, text/xml;q=0.9, */*;q=0.8";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("timed out after {ms} ms")]
    Timeout { ms: u64 },
    #[error("response body exceeds {limit} bytes")]
    ResponseTooLarge { limit: usize },
}

/// Retrieves the raw body of one feed. One bounded attempt, no retries.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch(&self, source: &FeedSource) -> Result<RawDocument, FetchError>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
    user_agent: String,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, user_agent: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
            user_agent: user_agent.into(),
        }
    }

    pub fn with_client(client: reqwest::Client, timeout: Duration, user_agent: impl Into<String>) -> Self {
        Self {
            client,
            timeout,
            user_agent: user_agent.into(),
        }
    }

    async fn fetch_inner(&self, source: &FeedSource) -> Result<RawDocument, FetchError> {
        let mut resp = self
            .client
            .get(&source.url)
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT, ACCEPT_FEEDS)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }
        if resp.content_length().is_some_and(|n| n > MAX_BODY_BYTES as u64) {
            return Err(FetchError::ResponseTooLarge { limit: MAX_BODY_BYTES });
        }

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let mut body: Vec<u8> = Vec::new();
        while let Some(chunk) = resp.chunk().await? {
            if body.len() + chunk.len() > MAX_BODY_BYTES {
                return Err(FetchError::ResponseTooLarge { limit: MAX_BODY_BYTES });
            }
            body.extend_from_slice(&chunk);
        }

        let text = String::from_utf8_lossy(&body).into_owned();
        let doc = RawDocument::new(source.clone(), text);
        Ok(match content_type {
            Some(ct) => doc.with_content_type(ct),
            None => doc,
        })
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_TIMEOUT_MS), DEFAULT_USER_AGENT)
    }
}

#[async_trait]
impl SourceFetcher for HttpFetcher {
    async fn fetch(&self, source: &FeedSource) -> Result<RawDocument, FetchError> {
        // Dropping the inner future on expiry aborts the connection.
        let res = match tokio::time::timeout(self.timeout, self.fetch_inner(source)).await {
            Ok(res) => res,
            Err(_) => Err(FetchError::Timeout {
                ms: self.timeout.as_millis() as u64,
            }),
        };

        if let Err(e) = &res {
            counter!("news_fetch_errors_total").increment(1);
            tracing::warn!(target: "ingest", source = %source.label, url = %source.url, error = %e, "feed fetch failed");
        }
        res
    }
}
