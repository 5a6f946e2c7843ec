use anyhow::{Context, Result};
use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::info;

use crate::canonical::{canonicalize_with, HostEncoding};
use crate::error::CanonicalizeError;
use crate::meta::extract_app_store_meta;
use crate::stats::ListingReport;
use crate::suffix::SuffixList;

/// Where the listing HTML comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingSource {
    Url(String),
    File(PathBuf),
    Stdin,
}

pub fn load_listing_html(source: &ListingSource, timeout: Duration) -> Result<String> {
    let start_time = Instant::now();
    let html = match source {
        ListingSource::Url(url) => fetch_listing(url, timeout)?,
        ListingSource::File(path) => {
            if !path.exists() {
                anyhow::bail!("Listing file not found: {:?}", path);
            }
            fs::read_to_string(path)
                .with_context(|| format!("Error reading app store listing {:?}", path))?
        }
        ListingSource::Stdin => {
            let mut html = String::new();
            std::io::stdin()
                .read_to_string(&mut html)
                .context("Error reading app store listing from stdin")?;
            html
        }
    };

    info!(
        action = "loaded",
        component = "listing_html",
        source = ?source,
        bytes = html.len(),
        duration_ms = start_time.elapsed().as_millis(),
        "Loaded app store listing"
    );
    Ok(html)
}

fn fetch_listing(url: &str, timeout: Duration) -> Result<String> {
    info!(action = "fetch", component = "listing_html", url = url, timeout_secs = timeout.as_secs(), "Fetching app store listing");

    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")?;
    let response = client
        .get(url)
        .send()
        .with_context(|| format!("Error fetching app store listing {}", url))?;

    if response.status() != reqwest::StatusCode::OK {
        anyhow::bail!(
            "Did not receive HTTP 200 response, instead was {}.",
            response.status()
        );
    }

    response
        .text()
        .context("Error reading app store listing body")
}

/// Extracts the listing metadata and, when a developer URL is present,
/// derives its app-ads.txt locations.
pub fn build_listing_report<S>(
    html: &str,
    suffixes: &S,
    encoding: HostEncoding,
) -> Result<ListingReport, CanonicalizeError>
where
    S: SuffixList + ?Sized,
{
    let metadata = extract_app_store_meta(html);
    let app_ads_txt = if metadata.developer_url.is_empty() {
        None
    } else {
        Some(canonicalize_with(suffixes, &metadata.developer_url, encoding)?)
    };

    Ok(ListingReport {
        metadata,
        app_ads_txt,
    })
}

pub fn render_listing_text(report: &ListingReport) -> String {
    let metadata = &report.metadata;
    let mut out = format!(
        "Parsed metadata:\n  Developer URL: {}\n  Bundle ID:     {}\n  Store ID:      {}\n\n",
        metadata.developer_url, metadata.bundle_id, metadata.store_id
    );

    match &report.app_ads_txt {
        Some(result) => out.push_str(&format!(
            "Derived app-ads.txt URLs:\n  Registerable Domain URL: {}\n  Subdomain URL:           {}\n",
            result.registrable_domain_url,
            result.subdomain_url_or_empty()
        )),
        None => out.push_str("No developer URL found to parse.\n"),
    }
    out
}
