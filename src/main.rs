//! # Medium Success
//!
//! Scrapes Medium article pages into a CSV dataset and trains a classifier
//! that predicts whether an article is "successful" from its title, subtitle,
//! image count and tags.
//!
//! ## Usage
//!
//! ```sh
//! medium_success discover --output medium_articles.csv
//! medium_success scrape --urls urls.txt --output scraped_articles.csv
//! medium_success train --input scraped_articles.csv
//! ```
//!
//! ## Architecture
//!
//! 1. **Discovery**: collect article links from a tag feed (optional)
//! 2. **Scraping**: fetch each URL, extract fields, append one CSV row
//! 3. **Training**: load the CSV, build features, fit and score a random forest
//!
//! Settings come from an optional YAML file (`--config`), with command-line
//! flags taking precedence.

use clap::Parser;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod error;
mod model;
mod models;
mod scrape;
mod utils;

use cli::{Cli, Command};
use config::Settings;
use error::BatchError;
use model::features::{create_features, load_and_preprocess};
use model::train::train_and_evaluate;
use scrape::discover::{discover_links, merge_links};
use scrape::extractor::Extractor;
use scrape::fetcher::HttpFetcher;
use scrape::runner::BatchRunner;
use scrape::sink::CsvSink;
use utils::ensure_parent_dir;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("medium_success starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let mut settings = Settings::load(args.config.as_deref())?;
    args.apply_overrides(&mut settings);

    match &args.command {
        Command::Scrape { urls, .. } => scrape(&settings, urls).await?,
        Command::Discover { .. } => discover(&settings).await?,
        Command::Train { .. } => train(&settings)?,
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}

#[instrument(level = "info", skip_all, fields(urls = %urls.display()))]
async fn scrape(settings: &Settings, urls: &Path) -> Result<(), Box<dyn Error>> {
    let output = PathBuf::from(&settings.scrape.output_csv);
    ensure_parent_dir(&output)?;

    let fetcher = HttpFetcher::new(&settings.scrape)?;
    let extractor = Extractor::new(&settings.rules)?;
    let runner = BatchRunner::new(fetcher, extractor, CsvSink::new(output.clone()))
        .with_request_delay(Duration::from_millis(settings.scrape.request_delay_ms));

    match runner.run(urls).await {
        Ok(report) => {
            info!(
                attempted = report.attempted,
                written = report.written,
                failed = report.failed,
                output = %output.display(),
                "Scrape finished"
            );
            Ok(())
        }
        Err(BatchError::NotFound(path)) => {
            error!(path = %path.display(), "URL list not found");
            Err(BatchError::NotFound(path).into())
        }
        Err(e) => Err(e.into()),
    }
}

#[instrument(level = "info", skip_all, fields(feed = %settings.discover.feed_url))]
async fn discover(settings: &Settings) -> Result<(), Box<dyn Error>> {
    let fetcher = HttpFetcher::new(&settings.scrape)?;
    let links = discover_links(&fetcher, &settings.discover.feed_url).await?;
    if links.is_empty() {
        println!("No new articles found.");
        return Ok(());
    }

    let path = PathBuf::from(&settings.discover.links_csv);
    ensure_parent_dir(&path)?;
    let total = merge_links(&path, &links)?;
    println!("Saved {} articles to {}", total, path.display());
    Ok(())
}

#[instrument(level = "info", skip_all, fields(input = %settings.scrape.output_csv))]
fn train(settings: &Settings) -> Result<(), Box<dyn Error>> {
    let samples = load_and_preprocess(Path::new(&settings.scrape.output_csv))?;
    let features = create_features(&samples, settings.model.max_features);
    let evaluation = train_and_evaluate(&features.x, &features.y, &settings.model)?;

    let forest = &evaluation.model;
    info!(
        vocabulary = features.vectorizer.vocabulary().len(),
        trees = forest.trees().len(),
        nodes = forest.trees().iter().map(|t| t.n_nodes()).sum::<usize>(),
        classes = ?forest.classes(),
        "Trained model"
    );

    println!("{}", accuracy_line(evaluation.accuracy));
    println!("Classification Report:\n{}", evaluation.report);
    Ok(())
}

/// Accuracy always reads as a float, `1.0` rather than `1`.
fn accuracy_line(accuracy: f64) -> String {
    format!("Accuracy: {accuracy:?}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy_line_keeps_decimal_point() {
        assert_eq!(accuracy_line(1.0), "Accuracy: 1.0");
        assert_eq!(accuracy_line(0.0), "Accuracy: 0.0");
        assert_eq!(accuracy_line(0.75), "Accuracy: 0.75");
    }
}
