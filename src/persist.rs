// src/persist.rs
use std::fs;
use std::io;
use std::path::Path;

use crate::config::Labels;
use crate::error::{ExportError, Result};
use crate::project::Record;

/// Create the parent directory of `path` if it is missing. No-op for bare file names.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            fs::create_dir_all(dir).map_err(|source| ExportError::CreateDir {
                path: dir.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}

/// Quote only where needed (comma, quote, CR, LF), `\n` line endings.
fn writer_builder() -> csv::WriterBuilder {
    let mut b = csv::WriterBuilder::new();
    b.has_headers(false)
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::Any(b'\n'));
    b
}

/// Header row from `labels`, then one row per record.
pub fn write_records<W: io::Write>(
    wtr: &mut csv::Writer<W>,
    labels: &Labels,
    records: &[Record],
) -> csv::Result<()> {
    wtr.write_record(labels.header())?;
    for rec in records {
        wtr.write_record(rec.as_row())?;
    }
    wtr.flush()?;
    Ok(())
}

/// Create or truncate `path` and write the table to it.
/// Returns the number of data rows written.
pub fn write_csv(path: &Path, labels: &Labels, records: &[Record]) -> Result<usize> {
    ensure_parent_dir(path)?;

    let wrap = |source: csv::Error| ExportError::Write {
        path: path.to_path_buf(),
        source,
    };
    // The writer owns the file handle; it is closed on drop on every path.
    let mut wtr = writer_builder().from_path(path).map_err(wrap)?;
    write_records(&mut wtr, labels, records).map_err(wrap)?;

    tracing::debug!(rows = records.len(), path = %path.display(), "csv written");
    Ok(records.len())
}
