use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

use crate::canonical::HostEncoding;
use crate::listing::ListingSource;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "app-ads-locator",
    about = "Derive the app-ads.txt locations to crawl for an app store listing",
    version,
    long_about = None
)]
pub struct Args {
    /// App store listing URL to fetch
    #[arg(short = 'u', long)]
    pub app_store_url: Option<String>,

    /// Local HTML file containing an app store listing
    #[arg(long)]
    pub html_file: Option<PathBuf>,

    /// Developer URL to translate directly, without a listing
    #[arg(short, long)]
    pub developer_url: Option<String>,

    /// File of developer URLs to translate, one per line
    #[arg(short, long)]
    pub batch: Option<PathBuf>,

    /// Public suffix list (.dat) to use instead of the built-in list
    #[arg(short, long)]
    pub suffix_list: Option<PathBuf>,

    /// Write derived hostnames in Punycode
    #[arg(long)]
    pub punycode: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Number of worker threads for batch mode
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Timeout in seconds for fetching the listing
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// What a run does, derived from the input flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Listing(ListingSource),
    DeveloperUrl(String),
    Batch(PathBuf),
}

impl Args {
    pub fn host_encoding(&self) -> HostEncoding {
        if self.punycode {
            HostEncoding::Punycode
        } else {
            HostEncoding::Preserve
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Listing from stdin unless another input is named.
    pub fn mode(&self) -> Mode {
        if let Some(url) = &self.developer_url {
            Mode::DeveloperUrl(url.clone())
        } else if let Some(path) = &self.batch {
            Mode::Batch(path.clone())
        } else if let Some(url) = &self.app_store_url {
            Mode::Listing(ListingSource::Url(url.clone()))
        } else if let Some(path) = &self.html_file {
            Mode::Listing(ListingSource::File(path.clone()))
        } else {
            Mode::Listing(ListingSource::Stdin)
        }
    }

    pub(crate) fn input_count(&self) -> usize {
        [
            self.app_store_url.is_some(),
            self.html_file.is_some(),
            self.developer_url.is_some(),
            self.batch.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count()
    }
}
