//! Runtime settings for the scrape, discovery and training pipelines.
//!
//! Every knob that used to be a module-level constant (output path, random
//! seed, feature cap, selectors) lives here and is passed explicitly into
//! the component that needs it. Values are resolved in three layers:
//!
//! 1. Built-in defaults ([`Settings::default`])
//! 2. An optional YAML file (`--config settings.yaml`)
//! 3. Command-line flags, applied by the caller after loading
//!
//! # Example
//!
//! ```yaml
//! scrape:
//!   output_csv: data/articles.csv
//!   request_delay_ms: 500
//! model:
//!   seed: 7
//! ```

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::Path;
use tracing::{info, instrument};

/// Top-level settings, one section per pipeline.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub scrape: ScrapeSettings,
    pub rules: ExtractionRules,
    pub discover: DiscoverSettings,
    pub model: ModelSettings,
}

/// HTTP and output settings for the article scraper.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ScrapeSettings {
    /// CSV file that scraped records are appended to.
    pub output_csv: String,
    /// Pause between consecutive fetches. Zero disables the delay.
    pub request_delay_ms: u64,
    /// Per-request timeout. `None` keeps the HTTP client's default.
    pub timeout_secs: Option<u64>,
    /// Overrides the default `User-Agent` header.
    pub user_agent: Option<String>,
}

impl Default for ScrapeSettings {
    fn default() -> Self {
        Self {
            output_csv: "scraped_articles.csv".to_string(),
            request_delay_ms: 0,
            timeout_secs: None,
            user_agent: None,
        }
    }
}

/// One CSS selector per extracted field.
///
/// These are tied to Medium's current page template. When the template
/// drifts the selectors stop matching and the affected fields come back
/// empty instead of failing.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ExtractionRules {
    pub title: String,
    pub subtitle: String,
    pub tags: String,
    pub images: String,
    pub read_time: String,
}

impl Default for ExtractionRules {
    fn default() -> Self {
        Self {
            title: "h1".to_string(),
            subtitle: "h2".to_string(),
            tags: "div.po.ab".to_string(),
            images: "img".to_string(),
            read_time: r#"span[data-testid="storyReadTime"]"#.to_string(),
        }
    }
}

/// Feed discovery settings used by the `discover` subcommand.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DiscoverSettings {
    pub feed_url: String,
    /// Single-column (`link`) CSV of discovered article URLs.
    pub links_csv: String,
}

impl Default for DiscoverSettings {
    fn default() -> Self {
        Self {
            feed_url: "https://medium.com/feed/tag/android-development".to_string(),
            links_csv: "medium_articles.csv".to_string(),
        }
    }
}

/// Feature and classifier settings for the `train` subcommand.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ModelSettings {
    /// Fraction of rows held out for evaluation.
    pub test_size: f64,
    /// Seed shared by the train/test split and the forest.
    pub seed: u64,
    pub n_estimators: usize,
    /// Cap on the TF-IDF vocabulary.
    pub max_features: usize,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            seed: 42,
            n_estimators: 100,
            max_features: 1000,
        }
    }
}

impl Settings {
    /// Load settings from an optional YAML file.
    ///
    /// With `None` the built-in defaults are returned. Missing keys in the
    /// file fall back to their defaults section by section.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid YAML.
    #[instrument(level = "info")]
    pub fn load(path: Option<&Path>) -> Result<Self, Box<dyn Error>> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)?;
        let settings: Settings = serde_yaml::from_str(&text)?;
        info!(path = %path.display(), "Loaded settings file");
        Ok(settings)
    }
}
