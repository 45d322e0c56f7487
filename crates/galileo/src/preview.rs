//! Tabular preview of a downloaded snapshot.

use log::debug;
use serde::Serialize;

use crate::error::GalileoError;

/// Rows shown when no explicit limit is given.
pub const DEFAULT_PREVIEW_ROWS: usize = 20;

/// Header and leading rows of a CSV snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotPreview {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// True when the snapshot had more rows than were read.
    pub truncated: bool,
}

impl SnapshotPreview {
    /// Reads the header and at most `max_rows` records from CSV bytes.
    ///
    /// Records may have a different field count than the header; the
    /// backend's CSVs are not guaranteed to be rectangular.
    pub fn from_csv(bytes: &[u8], max_rows: usize) -> Result<Self, GalileoError> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(bytes);

        let columns = reader.headers()?.iter().map(str::to_string).collect();

        let mut rows: Vec<Vec<String>> = Vec::new();
        let mut records = reader.records();
        for record in records.by_ref().take(max_rows) {
            rows.push(record?.iter().map(str::to_string).collect());
        }
        let truncated = records.next().is_some();

        debug!(rows = rows.len(), truncated; "Snapshot preview read");
        Ok(Self {
            columns,
            rows,
            truncated,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &[u8] = b"age,city\n31,Lyon\n45,Oslo\n27,Quito\n";

    #[test]
    fn test_reads_header_and_rows() {
        let preview = SnapshotPreview::from_csv(CSV, 10).unwrap();

        assert_eq!(preview.columns, vec!["age", "city"]);
        assert_eq!(preview.rows.len(), 3);
        assert_eq!(preview.rows[1], vec!["45", "Oslo"]);
        assert!(!preview.truncated);
    }

    #[test]
    fn test_truncates_to_limit() {
        let preview = SnapshotPreview::from_csv(CSV, 2).unwrap();

        assert_eq!(preview.rows.len(), 2);
        assert!(preview.truncated);
    }

    #[test]
    fn test_header_only() {
        let preview = SnapshotPreview::from_csv(b"a,b\n", 5).unwrap();

        assert_eq!(preview.columns, vec!["a", "b"]);
        assert!(preview.is_empty());
        assert!(!preview.truncated);
    }

    #[test]
    fn test_invalid_utf8_is_an_error() {
        let err = SnapshotPreview::from_csv(b"a,b\n\xff\xfe,1\n", 5).unwrap_err();
        assert!(matches!(err, GalileoError::Preview(_)));
    }
}
