//! Offline success-prediction pipeline over the scraped CSV.
//!
//! 1. [`features`]: load rows, derive numeric columns, vectorize subtitles
//! 2. [`train`]: seeded train/test split, fit, score
//!
//! [`tfidf`], [`forest`] and [`metrics`] hold the vectorizer, the
//! classifier and the scoring used by those steps.

pub mod features;
pub mod forest;
pub mod metrics;
pub mod tfidf;
pub mod train;
