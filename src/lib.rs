// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod config;
pub mod error;
pub mod export;
pub mod feed;
pub mod persist;
pub mod project;

// ---- Re-exports for stable public API ----
pub use crate::config::{ExportConfig, LabelSet, Labels, MissingFieldPolicy};
pub use crate::error::ExportError;
pub use crate::export::{export, success_message, ExportReport};
pub use crate::feed::{
    Feed, FeedEntry, FeedFormat, FeedSource, FixtureFeedSource, HttpFeedSource,
};
pub use crate::project::{project, Record, Table};
