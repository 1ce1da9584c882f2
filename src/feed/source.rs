// src/feed/source.rs
use std::time::Duration;

use async_trait::async_trait;
use metrics::counter;

use crate::error::{ExportError, Result};
use crate::feed::decode::decode_body;
use crate::feed::parser::parse_feed;
use crate::feed::types::{Feed, FeedSource};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Fetches the feed over HTTP(S) on every `fetch()` call.
pub struct HttpFeedSource {
    url: String,
    client: reqwest::Client,
}

impl HttpFeedSource {
    /// `timeout` of `None` leaves the request unbounded (reqwest's default).
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        Ok(Self {
            url: url.into(),
            client: builder.build()?,
        })
    }

    /// Reuse an existing client (connection pool, proxy settings).
    pub fn with_client(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn get_body(&self) -> Result<String> {
        tracing::debug!("Fetching feed from: {}", self.url);
        let resp = self.client.get(&self.url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ExportError::Status {
                status,
                url: self.url.clone(),
            });
        }
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = resp.bytes().await?;
        Ok(decode_body(&bytes, content_type.as_deref()))
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self) -> Result<Feed> {
        let body = match self.get_body().await {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(error = %e, url = %self.url, "feed fetch failed");
                counter!("feed_fetch_errors_total").increment(1);
                return Err(e);
            }
        };
        parse_feed(&body)
    }

    fn name(&self) -> &str {
        &self.url
    }
}

/// Parses a document held in memory; no network access.
pub struct FixtureFeedSource {
    name: String,
    content: String,
}

impl FixtureFeedSource {
    pub fn from_fixture(content: &str) -> Self {
        Self::named("fixture", content)
    }

    pub fn named(name: &str, content: &str) -> Self {
        Self {
            name: name.to_string(),
            content: content.to_string(),
        }
    }
}

#[async_trait]
impl FeedSource for FixtureFeedSource {
    async fn fetch(&self) -> Result<Feed> {
        parse_feed(&self.content)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
