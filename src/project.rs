// src/project.rs
//! Entry → record projection. Pure: no I/O, no global state.

use serde::{Deserialize, Serialize};

use crate::config::{Labels, MissingFieldPolicy};
use crate::error::{ExportError, Result};
use crate::feed::FeedEntry;

/// One CSV row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub title: String,
    pub date: String,
    pub link: String,
    pub description: String,
}

impl Record {
    /// `position` is the 1-based entry index used in error messages.
    pub fn from_entry(entry: &FeedEntry, position: usize, labels: &Labels) -> Result<Self> {
        let title = entry.title.clone().ok_or(ExportError::MissingField {
            position,
            field: "title",
        })?;
        let link = entry.link.clone().ok_or(ExportError::MissingField {
            position,
            field: "link",
        })?;
        Ok(Self {
            title,
            date: entry
                .published
                .clone()
                .unwrap_or_else(|| labels.no_date.to_string()),
            link,
            description: entry
                .summary
                .clone()
                .unwrap_or_else(|| labels.no_description.to_string()),
        })
    }

    pub fn as_row(&self) -> [&str; 4] {
        [&self.title, &self.date, &self.link, &self.description]
    }
}

/// Records in feed order, plus how many entries the skip policy dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub records: Vec<Record>,
    pub skipped: usize,
}

impl Table {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

pub fn project(
    entries: &[FeedEntry],
    labels: &Labels,
    policy: MissingFieldPolicy,
) -> Result<Table> {
    let mut table = Table {
        records: Vec::with_capacity(entries.len()),
        skipped: 0,
    };
    for (i, entry) in entries.iter().enumerate() {
        match Record::from_entry(entry, i + 1, labels) {
            Ok(rec) => table.records.push(rec),
            Err(e @ ExportError::MissingField { .. }) if policy == MissingFieldPolicy::Skip => {
                tracing::warn!(error = %e, "skipping incomplete entry");
                table.skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(
        title: Option<&str>,
        link: Option<&str>,
        published: Option<&str>,
        summary: Option<&str>,
    ) -> FeedEntry {
        FeedEntry {
            title: title.map(str::to_string),
            link: link.map(str::to_string),
            published: published.map(str::to_string),
            summary: summary.map(str::to_string),
        }
    }

    #[test]
    fn missing_optional_fields_get_sentinels() {
        let entries = vec![
            entry(Some("Case 123"), Some("https://x/1"), Some("2024-01-01"), None),
            entry(Some("Case 456"), Some("https://x/2"), None, Some("Ruling text")),
        ];
        let table = project(&entries, &Labels::ENGLISH, MissingFieldPolicy::Fail).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.records[0].date, "2024-01-01");
        assert_eq!(table.records[0].description, "no description");
        assert_eq!(table.records[1].date, "no date");
        assert_eq!(table.records[1].description, "Ruling text");
    }

    #[test]
    fn order_is_preserved_and_duplicates_kept() {
        let entries: Vec<_> = ["c", "a", "b", "a"]
            .into_iter()
            .map(|t| entry(Some(t), Some("https://x"), None, None))
            .collect();
        let table = project(&entries, &Labels::ENGLISH, MissingFieldPolicy::Fail).unwrap();
        let titles: Vec<_> = table.records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["c", "a", "b", "a"]);
    }

    #[test]
    fn missing_title_fails_with_position() {
        let entries = vec![
            entry(Some("ok"), Some("https://x/1"), None, None),
            entry(None, Some("https://x/2"), None, None),
        ];
        let err = project(&entries, &Labels::ENGLISH, MissingFieldPolicy::Fail).unwrap_err();
        match err {
            ExportError::MissingField { position, field } => {
                assert_eq!(position, 2);
                assert_eq!(field, "title");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn skip_policy_drops_only_incomplete_entries() {
        let entries = vec![
            entry(Some("a"), None, None, None),
            entry(Some("b"), Some("https://x/b"), None, None),
            entry(None, None, None, None),
        ];
        let table = project(&entries, &Labels::ENGLISH, MissingFieldPolicy::Skip).unwrap();
        assert_eq!(table.skipped, 2);
        assert_eq!(table.records.len(), 1);
        assert_eq!(table.records[0].title, "b");
    }

    #[test]
    fn portuguese_sentinels() {
        let entries = vec![entry(Some("t"), Some("l"), None, None)];
        let table = project(&entries, &Labels::PORTUGUESE, MissingFieldPolicy::Fail).unwrap();
        assert_eq!(table.records[0].as_row(), ["t", "Sem data", "l", "Sem descrição"]);
    }

    #[test]
    fn empty_feed_projects_to_empty_table() {
        let table = project(&[], &Labels::ENGLISH, MissingFieldPolicy::Fail).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.skipped, 0);
    }
}
