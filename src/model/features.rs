//! Training data loading and feature construction.
//!
//! Reads the article CSV back, normalizes the subtitle, derives the numeric
//! features, and concatenates them with the TF-IDF block:
//!
//! ```text
//! | "0" .. "k-1" (TF-IDF of subtitle) | title_length | subtitle_length | num_images | num_tags |
//! ```
//!
//! Title and subtitle lengths are recounted from the text here rather than
//! read from the stored `title_character` column, so both lengths come from
//! the same source.

use crate::error::DatasetError;
use crate::model::tfidf::TfidfVectorizer;
use crate::models::TAG_SEPARATOR;
use ndarray::Array2;
use serde::Deserialize;
use std::path::Path;
use tracing::{info, instrument};

/// Names of the numeric columns appended after the text block.
pub const NUMERIC_COLUMNS: [&str; 4] = ["title_length", "subtitle_length", "num_images", "num_tags"];

/// Columns read from the article CSV. Other columns are ignored.
#[derive(Debug, Deserialize)]
struct TrainingRow {
    title: Option<String>,
    subtitle: Option<String>,
    image_count: usize,
    tags: Option<String>,
    success: u8,
}

/// One preprocessed training example.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub title: String,
    /// Lower-cased; empty when the cell was missing.
    pub subtitle: String,
    pub image_count: usize,
    pub tags: Option<String>,
    pub success: u8,
}

impl From<TrainingRow> for Sample {
    fn from(row: TrainingRow) -> Self {
        Self {
            title: row.title.unwrap_or_default(),
            subtitle: row.subtitle.unwrap_or_default().to_lowercase(),
            image_count: row.image_count,
            tags: row.tags,
            success: row.success,
        }
    }
}

/// Load the article CSV and normalize subtitles.
///
/// # Errors
///
/// [`DatasetError::NotFound`] when the file is missing, [`DatasetError::Csv`]
/// when a row lacks a required column or has a malformed value, and
/// [`DatasetError::Empty`] when there are no data rows.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn load_and_preprocess(path: &Path) -> Result<Vec<Sample>, DatasetError> {
    if !path.exists() {
        return Err(DatasetError::NotFound(path.to_path_buf()));
    }
    let csv_err = |source| DatasetError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::Reader::from_path(path).map_err(csv_err)?;
    let samples = reader
        .deserialize::<TrainingRow>()
        .map(|row| row.map(Sample::from))
        .collect::<Result<Vec<_>, _>>()
        .map_err(csv_err)?;

    if samples.is_empty() {
        return Err(DatasetError::Empty);
    }
    info!(rows = samples.len(), "Loaded training data");
    Ok(samples)
}

/// Number of comma-separated tags in a stored cell; 0 for a missing cell.
pub fn count_tags(tags: Option<&str>) -> usize {
    match tags {
        Some(t) if !t.is_empty() => t.split(TAG_SEPARATOR).count(),
        _ => 0,
    }
}

/// Dense feature matrix with string column names.
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    pub columns: Vec<String>,
    pub values: Array2<f64>,
}

impl FeatureMatrix {
    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    #[cfg(test)]
    pub fn column(&self, name: &str) -> Option<ndarray::ArrayView1<'_, f64>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.values.column(idx))
    }
}

/// Features, labels and the vectorizer fitted while building them.
#[derive(Debug, Clone)]
pub struct FeatureSet {
    pub x: FeatureMatrix,
    pub y: Vec<u8>,
    pub vectorizer: TfidfVectorizer,
}

/// Build the feature matrix and label vector from preprocessed samples.
#[instrument(level = "info", skip(samples), fields(rows = samples.len()))]
pub fn create_features(samples: &[Sample], max_features: usize) -> FeatureSet {
    let subtitles: Vec<&str> = samples.iter().map(|s| s.subtitle.as_str()).collect();
    let mut vectorizer = TfidfVectorizer::new(max_features);
    let text = vectorizer.fit_transform(&subtitles);

    let k = text.ncols();
    let values = Array2::from_shape_fn((samples.len(), k + NUMERIC_COLUMNS.len()), |(i, j)| {
        if j < k {
            return text[[i, j]];
        }
        let s = &samples[i];
        let v = match j - k {
            0 => s.title.chars().count(),
            1 => s.subtitle.chars().count(),
            2 => s.image_count,
            _ => count_tags(s.tags.as_deref()),
        };
        v as f64
    });
    let columns: Vec<String> = (0..k)
        .map(|i| i.to_string())
        .chain(NUMERIC_COLUMNS.iter().map(|c| c.to_string()))
        .collect();

    info!(
        rows = values.nrows(),
        text_columns = k,
        total_columns = columns.len(),
        "Built feature matrix"
    );
    FeatureSet {
        x: FeatureMatrix { columns, values },
        y: samples.iter().map(|s| s.success).collect(),
        vectorizer,
    }
}
