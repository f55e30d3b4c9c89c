//! HTML → [`ArticleRecord`] extraction.
//!
//! Each field is read through its own CSS selector from
//! [`ExtractionRules`]. Selectors are compiled once when the [`Extractor`]
//! is built, so a bad rule fails up front instead of on every page.
//!
//! | Field | Default rule | Result when nothing matches |
//! |-------|--------------|-----------------------------|
//! | title | `h1` (first) | `None` |
//! | subtitle | `h2` (first) | `None` |
//! | tags | `div.po.ab` (all) | empty list |
//! | image count | `img` (all) | 0 |
//! | duration | `span[data-testid="storyReadTime"]` | 0 |

use crate::config::ExtractionRules;
use crate::error::ExtractError;
use crate::models::ArticleRecord;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};

static FIRST_INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("static regex"));

/// Compiled field extraction rules.
#[derive(Debug)]
pub struct Extractor {
    title: Selector,
    subtitle: Selector,
    tags: Selector,
    images: Selector,
    read_time: Selector,
}

impl Extractor {
    pub fn new(rules: &ExtractionRules) -> Result<Self, ExtractError> {
        Ok(Self {
            title: compile("title", &rules.title)?,
            subtitle: compile("subtitle", &rules.subtitle)?,
            tags: compile("tags", &rules.tags)?,
            images: compile("images", &rules.images)?,
            read_time: compile("read_time", &rules.read_time)?,
        })
    }

    /// Extract an article record from a full HTML document.
    ///
    /// HTML parsing is lenient, so malformed markup degrades to missing
    /// fields rather than an error.
    #[instrument(level = "debug", skip_all, fields(bytes = html.len()))]
    pub fn extract(&self, html: &str) -> ArticleRecord {
        let document = Html::parse_document(html);

        let title = first_text(&document, &self.title);
        let subtitle = first_text(&document, &self.subtitle);
        let tags: Vec<String> = document.select(&self.tags).map(element_text).collect();
        let image_count = document.select(&self.images).count();
        let duration = document
            .select(&self.read_time)
            .next()
            .map_or(0, |el| parse_minutes(&element_text(el)));

        debug!(
            ?title,
            ?subtitle,
            tags = tags.len(),
            image_count,
            duration,
            "Extracted article fields"
        );
        ArticleRecord::new(title, subtitle, tags, image_count, duration)
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(&ExtractionRules::default()).expect("default selectors are valid")
    }
}

fn compile(field: &'static str, selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|_| ExtractError::Selector {
        field,
        selector: selector.to_string(),
    })
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document.select(selector).next().map(element_text)
}

/// First run of digits in `text` ("5 min read" → 5), or 0.
pub fn parse_minutes(text: &str) -> u32 {
    FIRST_INTEGER
        .find(text)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE_HTML: &str = r#"
        <html>
            <body>
                <h1>Test Title</h1>
                <h2>Test Subtitle</h2>
                <div class="po ab">test</div>
                <div class="po ab">python</div>
                <img src="test1.jpg">
                <img src="test2.jpg">
                <span data-testid="storyReadTime">5 min read</span>
            </body>
        </html>
    "#;

    #[test]
    fn test_extract_full_article() {
        let rec = Extractor::default().extract(ARTICLE_HTML);
        assert_eq!(rec.title(), Some("Test Title"));
        assert_eq!(rec.subtitle(), Some("Test Subtitle"));
        assert_eq!(rec.tags(), ["test", "python"]);
        assert_eq!(rec.title_character(), 10);
        assert_eq!(rec.image_count(), 2);
        assert_eq!(rec.duration(), 5);
        assert_eq!(rec.success(), 1);
    }

    #[test]
    fn test_missing_subtitle_is_not_success() {
        let html = r#"<h1>Only Title</h1><span data-testid="storyReadTime">3 min read</span>"#;
        let rec = Extractor::default().extract(html);
        assert_eq!(rec.subtitle(), None);
        assert_eq!(rec.duration(), 3);
        assert_eq!(rec.success(), 0);
    }

    #[test]
    fn test_missing_read_time_is_not_success() {
        let rec = Extractor::default().extract("<h1>T</h1><h2>S</h2>");
        assert_eq!(rec.duration(), 0);
        assert_eq!(rec.success(), 0);
    }

    #[test]
    fn test_first_heading_wins_and_is_trimmed() {
        let rec = Extractor::default().extract("<h1>  First \n</h1><h1>Second</h1>");
        assert_eq!(rec.title(), Some("First"));
    }

    #[test]
    fn test_template_drift_yields_no_tags() {
        let html = r#"<div class="tag">a</div><div class="po">b</div>"#;
        assert!(Extractor::default().extract(html).tags().is_empty());
    }

    #[test]
    fn test_custom_tag_rule() {
        let rules = ExtractionRules {
            tags: "a.tag".to_string(),
            ..ExtractionRules::default()
        };
        let extractor = Extractor::new(&rules).unwrap();
        let rec = extractor.extract(r#"<a class="tag">rust</a><a class="tag">web</a>"#);
        assert_eq!(rec.tags(), ["rust", "web"]);
    }

    #[test]
    fn test_invalid_rule_is_rejected() {
        let rules = ExtractionRules {
            read_time: "span[".to_string(),
            ..ExtractionRules::default()
        };
        let err = Extractor::new(&rules).unwrap_err();
        assert!(matches!(err, ExtractError::Selector { field: "read_time", .. }));
    }

    #[test]
    fn test_parse_minutes() {
        assert_eq!(parse_minutes("5 min read"), 5);
        assert_eq!(parse_minutes("Read time: 12 minutes"), 12);
        assert_eq!(parse_minutes("min read"), 0);
        assert_eq!(parse_minutes(""), 0);
        assert_eq!(parse_minutes("99999999999 min"), 0);
    }
}
