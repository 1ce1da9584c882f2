// src/feed/types.rs
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Syndication format detected from the document root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedFormat {
    /// `<rss>` (RSS 0.9x / 2.0)
    Rss2,
    /// `<rdf:RDF>` (RSS 1.0)
    Rss1,
    /// `<feed>`
    Atom,
}

impl FeedFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedFormat::Rss2 => "rss2",
            FeedFormat::Rss1 => "rss1",
            FeedFormat::Atom => "atom",
        }
    }
}

/// One `<item>` / `<entry>` with the attributes the exporter reads.
/// Every field is optional at this level; the projection decides which are required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    pub published: Option<String>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feed {
    pub format: FeedFormat,
    pub title: Option<String>,
    /// Document order.
    pub entries: Vec<FeedEntry>,
}

#[async_trait::async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self) -> Result<Feed>;
    fn name(&self) -> &str;
}

