//! Article scraping pipeline.
//!
//! Each URL flows through the same stages, strictly one at a time:
//!
//! | Stage | Module | Failure handling |
//! |-------|--------|------------------|
//! | Fetch | [`fetcher`] | `FetchError`, URL skipped |
//! | Extract | [`extractor`] | never fails; missing fields stay empty |
//! | Append | [`sink`] | `SinkError`, URL counted as failed |
//!
//! [`runner`] drives the stages over a URL list, and [`discover`] builds
//! that list from a tag feed.

pub mod discover;
pub mod extractor;
pub mod fetcher;
pub mod runner;
pub mod sink;
