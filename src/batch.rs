use anyhow::{Context, Result};
use rayon::prelude::*;
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

use crate::canonical::{canonicalize_with, HostEncoding};
use crate::stats::{BatchEntry, BatchReport, BatchStats};
use crate::suffix::SuffixList;
use crate::utils::format_number;

/// Reads developer URLs from a file, one per line, skipping blank lines and
/// `#` comments.
pub fn read_url_file(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        anyhow::bail!("URL file not found: {:?}", path);
    }

    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read URL file {:?}", path))?;
    let urls: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect();

    info!(action = "loaded", component = "url_file", url_count = urls.len(), file_path = ?path, "Loaded developer URLs");
    Ok(urls)
}

/// Canonicalizes every URL on a bounded worker pool.
///
/// Entries come back in input order; a failing URL is recorded and does not
/// affect the others.
pub fn canonicalize_batch<S>(
    suffixes: &S,
    urls: &[String],
    encoding: HostEncoding,
    max_workers: Option<usize>,
) -> Result<BatchReport>
where
    S: SuffixList + Sync + ?Sized,
{
    let start_time = Instant::now();
    info!(
        action = "start",
        component = "batch_canonicalize",
        url_count = urls.len(),
        "Starting batch canonicalization"
    );

    let max_workers = max_workers.unwrap_or_else(|| {
        let cpu_count = num_cpus::get();
        std::cmp::min(cpu_count, 8)
    });
    info!(
        action = "configure",
        component = "worker_pool",
        workers = max_workers,
        "Using worker threads"
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(max_workers)
        .build()
        .context("Failed to build worker pool")?;

    let entries: Vec<BatchEntry> = pool.install(|| {
        urls.par_iter()
            .map(|url| BatchEntry::new(url.clone(), canonicalize_with(suffixes, url, encoding)))
            .collect()
    });

    let mut stats = BatchStats::default();
    for entry in &entries {
        if let Some(error) = &entry.error {
            warn!(action = "canonicalize", component = "developer_url", input = %entry.input, error = %error, "Failed to translate developer URL");
        }
        stats.record(entry);
    }

    info!(
        action = "complete",
        component = "batch_canonicalize",
        succeeded = stats.succeeded,
        failed = stats.failed,
        duration_ms = start_time.elapsed().as_millis(),
        "Batch canonicalization completed"
    );

    Ok(BatchReport { entries, stats })
}

pub fn render_batch_text(report: &BatchReport) -> String {
    let mut out = String::new();
    for entry in &report.entries {
        match (&entry.registrable_domain_url, &entry.error) {
            (Some(registrable), _) => {
                out.push_str(&format!("{}\n  {}\n", entry.input, registrable));
                if let Some(subdomain) = &entry.subdomain_url {
                    out.push_str(&format!("  {}\n", subdomain));
                }
            }
            (None, Some(error)) => out.push_str(&format!("{}\n  error: {}\n", entry.input, error)),
            (None, None) => {}
        }
    }

    let stats = &report.stats;
    out.push_str(&format!(
        "\nTranslated: {}, failed: {}, with subdomain: {}\n",
        format_number(stats.succeeded),
        format_number(stats.failed),
        format_number(stats.with_subdomain)
    ));
    for (kind, count) in &stats.failures_by_kind {
        out.push_str(&format!("- {}: {}\n", kind, format_number(*count)));
    }
    out
}
