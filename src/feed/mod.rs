// src/feed/mod.rs
pub mod decode;
pub mod parser;
pub mod source;
pub mod types;

pub use parser::parse_feed;
pub use source::{FixtureFeedSource, HttpFeedSource};
pub use types::{Feed, FeedEntry, FeedFormat, FeedSource};
