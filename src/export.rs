// src/export.rs
//! Fetch → project → persist, executed once.

use std::path::PathBuf;

use metrics::{counter, describe_counter, describe_histogram};
use once_cell::sync::OnceCell;
use tracing::info;

use crate::config::ExportConfig;
use crate::error::Result;
use crate::feed::{FeedFormat, FeedSource};
use crate::persist::write_csv;
use crate::project::project;

/// One-time metrics registration (so series carry help text once a recorder is installed).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("feed_entries_total", "Entries parsed from fetched feeds.");
        describe_counter!("feed_fetch_errors_total", "Feed fetch failures.");
        describe_histogram!("feed_parse_ms", "Feed parse time in milliseconds.");
        describe_counter!("export_rows_written_total", "CSV data rows written.");
        describe_counter!(
            "export_entries_skipped_total",
            "Entries dropped for missing title/link."
        );
    });
}

/// Outcome of a successful export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub path: PathBuf,
    pub rows: usize,
    pub skipped: usize,
    pub format: FeedFormat,
    pub feed_title: Option<String>,
}

pub async fn export(source: &dyn FeedSource, cfg: &ExportConfig) -> Result<ExportReport> {
    ensure_metrics_described();

    let feed = source.fetch().await?;
    tracing::debug!(
        source = source.name(),
        entries = feed.entries.len(),
        "feed fetched"
    );

    let labels = cfg.labels();
    let table = project(&feed.entries, &labels, cfg.on_missing)?;
    let rows = write_csv(&cfg.output_path, &labels, &table.records)?;

    counter!("export_rows_written_total").increment(rows as u64);
    counter!("export_entries_skipped_total").increment(table.skipped as u64);
    info!(
        rows,
        skipped = table.skipped,
        format = feed.format.as_str(),
        path = %cfg.output_path.display(),
        "feed exported"
    );

    Ok(ExportReport {
        path: cfg.output_path.clone(),
        rows,
        skipped: table.skipped,
        format: feed.format,
        feed_title: feed.title,
    })
}

/// The single console line printed after a successful export.
pub fn success_message(cfg: &ExportConfig, report: &ExportReport) -> String {
    format!("{} {}", cfg.labels().success, report.path.display())
}
