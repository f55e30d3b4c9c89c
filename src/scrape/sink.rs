//! Append-only CSV output for scraped articles.
//!
//! The header row is written only when the target file does not exist yet;
//! every later append adds exactly one data row. There is no locking, so
//! only one writer may append to a given file at a time.

use crate::error::SinkError;
use crate::models::{ArticleRecord, CSV_HEADER};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Appends [`ArticleRecord`] rows to a CSV file.
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record, writing the header first if the file is new.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if the file cannot be opened or written.
    #[instrument(level = "debug", skip_all, fields(path = %self.path.display()))]
    pub fn append(&self, record: &ArticleRecord) -> Result<(), SinkError> {
        let write_header = !self.path.exists();

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| SinkError::Io {
                path: self.path.clone(),
                source,
            })?;

        let csv_err = |source| SinkError::Csv {
            path: self.path.clone(),
            source,
        };
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if write_header {
            writer.write_record(CSV_HEADER).map_err(csv_err)?;
        }
        writer.serialize(record.to_row()).map_err(csv_err)?;
        writer.flush().map_err(|source| SinkError::Io {
            path: self.path.clone(),
            source,
        })?;

        debug!(write_header, "Appended article row");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ArticleRow;

    fn sample() -> ArticleRecord {
        ArticleRecord::new(
            Some("Test Title".to_string()),
            Some("Test Subtitle".to_string()),
            vec!["test".to_string(), "python".to_string()],
            2,
            5,
        )
    }

    fn read_lines(path: &Path) -> Vec<String> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_fresh_file_gets_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let sink = CsvSink::new(dir.path().join("out.csv"));

        for _ in 0..3 {
            sink.append(&sample()).unwrap();
        }

        let lines = read_lines(sink.path());
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0],
            "title,subtitle,tags,title_character,image_count,duration,success"
        );
        assert_eq!(lines[1], r#"Test Title,Test Subtitle,"test,python",10,2,5,1"#);
    }

    #[test]
    fn test_existing_file_keeps_single_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        CsvSink::new(&path).append(&sample()).unwrap();
        CsvSink::new(&path).append(&sample()).unwrap();

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines.iter().filter(|l| l.starts_with("title,")).count(), 1);
    }

    #[test]
    fn test_rows_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let sink = CsvSink::new(dir.path().join("out.csv"));
        let empty = ArticleRecord::new(None, None, vec![], 0, 0);
        sink.append(&sample()).unwrap();
        sink.append(&empty).unwrap();

        let mut reader = csv::Reader::from_path(sink.path()).unwrap();
        let rows: Vec<ArticleRow> = reader.deserialize().map(Result::unwrap).collect();
        assert_eq!(rows, vec![sample().to_row(), empty.to_row()]);
    }

    #[test]
    fn test_unwritable_path_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let sink = CsvSink::new(dir.path().join("missing").join("out.csv"));
        let err = sink.append(&sample()).unwrap_err();
        assert!(matches!(err, SinkError::Io { .. }));
    }
}
