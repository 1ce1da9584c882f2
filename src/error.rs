// src/error.rs
use std::path::PathBuf;

use thiserror::Error;

/// Failure of one stage of the export pipeline.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {status} when fetching {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("XML parse error at byte {position}: {source}")]
    Xml {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },

    #[error("document is not an RSS or Atom feed (root element <{root}>)")]
    NotAFeed { root: String },

    #[error("entry #{position} has no {field}")]
    MissingField {
        /// 1-based position of the entry in the feed.
        position: usize,
        field: &'static str,
    },

    #[error("creating output directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("writing {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

pub type Result<T> = std::result::Result<T, ExportError>;
