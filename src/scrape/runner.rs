//! Batch scraping: URL list → fetch → extract → CSV.
//!
//! URLs are processed strictly one after another. A failed fetch or write
//! is logged and counted, and the batch moves on to the next URL. Only a
//! missing or unreadable URL list stops the run, before anything is
//! fetched.

use crate::error::BatchError;
use crate::models::ArticleRecord;
use crate::scrape::extractor::Extractor;
use crate::scrape::fetcher::Fetch;
use crate::scrape::sink::CsvSink;
use futures::stream::{self, StreamExt};
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

/// Counts for one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Non-empty URL lines processed.
    pub attempted: usize,
    /// Records appended to the CSV.
    pub written: usize,
    /// URLs that produced no row (fetch or write failure).
    pub failed: usize,
}

/// Drives the fetch → extract → sink pipeline over a URL list.
#[derive(Debug)]
pub struct BatchRunner<F> {
    fetcher: F,
    extractor: Extractor,
    sink: CsvSink,
    request_delay: Duration,
}

impl<F: Fetch> BatchRunner<F> {
    pub fn new(fetcher: F, extractor: Extractor, sink: CsvSink) -> Self {
        Self {
            fetcher,
            extractor,
            sink,
            request_delay: Duration::ZERO,
        }
    }

    /// Pause between consecutive requests.
    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    /// Scrape every URL listed in `urls_path`, one per line.
    ///
    /// Blank lines are skipped and surrounding whitespace is trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::NotFound`] if the list does not exist and
    /// [`BatchError::Io`] if it cannot be read. Per-URL failures are not
    /// errors; they show up in [`BatchReport::failed`].
    #[instrument(level = "info", skip_all, fields(urls = %urls_path.display(), output = %self.sink.path().display()))]
    pub async fn run(&self, urls_path: &Path) -> Result<BatchReport, BatchError> {
        let text = tokio::fs::read_to_string(urls_path)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => BatchError::NotFound(urls_path.to_path_buf()),
                _ => BatchError::Io {
                    path: urls_path.to_path_buf(),
                    source: e,
                },
            })?;

        let urls: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        info!(count = urls.len(), "Loaded URL list");

        let outcomes: Vec<bool> = stream::iter(urls.iter().enumerate())
            .then(|(i, url)| async move {
                if i > 0 && !self.request_delay.is_zero() {
                    sleep(self.request_delay).await;
                }
                self.scrape_one(url).await
            })
            .collect()
            .await;

        let written = outcomes.iter().filter(|ok| **ok).count();
        let report = BatchReport {
            attempted: outcomes.len(),
            written,
            failed: outcomes.len() - written,
        };
        info!(
            attempted = report.attempted,
            written = report.written,
            failed = report.failed,
            "Batch complete"
        );
        Ok(report)
    }

    /// Fetch, extract and append a single URL. Returns whether a row was written.
    async fn scrape_one(&self, url: &str) -> bool {
        info!(%url, "Scraping article");
        let record = match self.scrape_record(url).await {
            Some(record) => record,
            None => {
                warn!(%url, "Failed to scrape article");
                return false;
            }
        };

        match self.sink.append(&record) {
            Ok(()) => {
                info!(
                    %url,
                    path = %self.sink.path().display(),
                    title = record.title().unwrap_or_default(),
                    has_subtitle = record.subtitle().is_some(),
                    tags = record.tags().len(),
                    title_character = record.title_character(),
                    image_count = record.image_count(),
                    duration = record.duration(),
                    success = record.success(),
                    "Data written"
                );
                true
            }
            Err(e) => {
                error!(%url, error = %e, "Error writing to CSV");
                false
            }
        }
    }

    async fn scrape_record(&self, url: &str) -> Option<ArticleRecord> {
        match self.fetcher.fetch(url).await {
            Ok(html) => Some(self.extractor.extract(&html)),
            Err(e) => {
                error!(%url, error = %e, "Fetch failed");
                None
            }
        }
    }
}
