//! Error types for each pipeline stage.
//!
//! Stages return these instead of logging and swallowing failures, so the
//! caller decides whether a failure skips one URL or halts the run.

use std::path::PathBuf;
use thiserror::Error;

/// A single HTTP fetch failed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unable to fetch {url}: status code {status_code}")]
    Status { url: String, status_code: u16 },

    #[error("transport error fetching {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// HTML could not be turned into an article record.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid selector for {field}: '{selector}'")]
    Selector { field: &'static str, selector: String },
}

/// Appending a record to the output CSV failed.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error writing {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// A batch run could not start.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("the file '{0}' was not found")]
    NotFound(PathBuf),

    #[error("error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Loading or preparing the training data failed.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("the file '{0}' was not found")]
    NotFound(PathBuf),

    #[error("CSV error reading {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("dataset has no rows")]
    Empty,
}

/// Splitting, fitting or scoring failed.
#[derive(Debug, Error)]
pub enum TrainError {
    #[error("need at least 2 rows to split, got {0}")]
    TooSmall(usize),

    #[error("test_size must be in (0, 1), got {0}")]
    InvalidTestSize(f64),

    #[error("feature rows ({rows}) and labels ({labels}) differ in length")]
    LengthMismatch { rows: usize, labels: usize },
}

/// Feed discovery or link-list update failed.
#[derive(Debug, Error)]
pub enum DiscoverError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("malformed feed: {0}")]
    Feed(#[from] quick_xml::Error),

    #[error("CSV error on {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
