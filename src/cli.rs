//! Command-line interface definitions.
//!
//! Three subcommands map onto the three pipelines: `discover` builds a link
//! list from a tag feed, `scrape` turns a URL list into the article CSV, and
//! `train` fits and scores the classifier on that CSV. Flags given here
//! override values from the settings file.

use crate::config::Settings;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// medium_success discover --output medium_articles.csv
/// medium_success scrape --urls urls.txt --output scraped_articles.csv
/// medium_success train --input scraped_articles.csv --seed 42
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a settings YAML file
    #[arg(short, long, global = true, env = "MEDIUM_SUCCESS_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Scrape each URL of a newline-delimited list into the article CSV
    Scrape {
        /// File with one article URL per line
        #[arg(short, long)]
        urls: PathBuf,

        /// Article CSV to append to
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Milliseconds to wait between requests
        #[arg(long)]
        delay_ms: Option<u64>,
    },

    /// Collect article links from a tag feed into the links CSV
    Discover {
        /// RSS or Atom feed URL
        #[arg(short, long)]
        feed: Option<String>,

        /// Links CSV to merge into
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Train and evaluate the success classifier on the article CSV
    Train {
        /// Article CSV to read
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Seed for the split and the forest
        #[arg(long)]
        seed: Option<u64>,

        /// Number of trees
        #[arg(long)]
        trees: Option<usize>,
    },
}

impl Cli {
    /// Copy flag values over the loaded settings.
    pub fn apply_overrides(&self, settings: &mut Settings) {
        match &self.command {
            Command::Scrape {
                output, delay_ms, ..
            } => {
                if let Some(output) = output {
                    settings.scrape.output_csv = output.display().to_string();
                }
                if let Some(ms) = delay_ms {
                    settings.scrape.request_delay_ms = *ms;
                }
            }
            Command::Discover { feed, output } => {
                if let Some(feed) = feed {
                    settings.discover.feed_url = feed.clone();
                }
                if let Some(output) = output {
                    settings.discover.links_csv = output.display().to_string();
                }
            }
            Command::Train { input, seed, trees } => {
                if let Some(input) = input {
                    settings.scrape.output_csv = input.display().to_string();
                }
                if let Some(seed) = seed {
                    settings.model.seed = *seed;
                }
                if let Some(trees) = trees {
                    settings.model.n_estimators = *trees;
                }
            }
        }
    }
}
