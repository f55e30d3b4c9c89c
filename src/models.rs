//! Data models for scraped articles and their CSV representation.
//!
//! - [`ArticleRecord`]: one scraped article plus its derived success label
//! - [`ArticleRow`]: the flat, serializable row written to the article CSV
//!
//! The CSV column order is fixed by [`CSV_HEADER`].

use serde::{Deserialize, Serialize};

/// Column order of the article CSV.
pub const CSV_HEADER: [&str; 7] = [
    "title",
    "subtitle",
    "tags",
    "title_character",
    "image_count",
    "duration",
    "success",
];

/// Separator used to flatten the tag list into one CSV cell.
pub const TAG_SEPARATOR: &str = ",";

/// A single scraped article.
///
/// Built once through [`ArticleRecord::new`], which derives the title length
/// and the success label from the other fields. The record is immutable
/// afterwards so the label can never drift from its inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRecord {
    title: Option<String>,
    subtitle: Option<String>,
    tags: Vec<String>,
    title_character: usize,
    image_count: usize,
    duration: u32,
    success: u8,
}

impl ArticleRecord {
    pub fn new(
        title: Option<String>,
        subtitle: Option<String>,
        tags: Vec<String>,
        image_count: usize,
        duration: u32,
    ) -> Self {
        let title_character = title.as_deref().map_or(0, |t| t.chars().count());
        let success = success_label(title.as_deref(), subtitle.as_deref(), duration);
        Self {
            title,
            subtitle,
            tags,
            title_character,
            image_count,
            duration,
            success,
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn subtitle(&self) -> Option<&str> {
        self.subtitle.as_deref()
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Character count of the title, 0 when there is none.
    pub fn title_character(&self) -> usize {
        self.title_character
    }

    pub fn image_count(&self) -> usize {
        self.image_count
    }

    /// Read time in minutes, 0 when missing or unparseable.
    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn success(&self) -> u8 {
        self.success
    }

    /// Flatten into the row shape written to CSV.
    pub fn to_row(&self) -> ArticleRow {
        ArticleRow {
            title: self.title.clone(),
            subtitle: self.subtitle.clone(),
            tags: self.tags.join(TAG_SEPARATOR),
            title_character: self.title_character,
            image_count: self.image_count,
            duration: self.duration,
            success: self.success,
        }
    }
}

/// `1` iff a non-empty title, a non-empty subtitle and a positive read time
/// are all present.
pub fn success_label(title: Option<&str>, subtitle: Option<&str>, duration: u32) -> u8 {
    let present = |s: Option<&str>| s.is_some_and(|s| !s.is_empty());
    u8::from(present(title) && present(subtitle) && duration > 0)
}

/// One row of the article CSV. Field order matches [`CSV_HEADER`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ArticleRow {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    /// Tags joined with [`TAG_SEPARATOR`]; empty when there are none.
    pub tags: String,
    pub title_character: usize,
    pub image_count: usize,
    pub duration: u32,
    pub success: u8,
}
