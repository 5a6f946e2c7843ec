use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::error;

use app_ads_locator::batch::render_batch_text;
use app_ads_locator::listing::render_listing_text;
use app_ads_locator::utils::{describe_failure, setup_logging, validate_args};
use app_ads_locator::{
    build_listing_report, canonicalize_batch, canonicalize_with, load_listing_html,
    load_suffix_list, read_url_file, Args, Mode, OutputFormat,
};

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let suffixes = load_suffix_list(args.suffix_list.as_deref())?;
    let encoding = args.host_encoding();

    match args.mode() {
        Mode::Listing(source) => {
            let html = load_listing_html(&source, args.timeout())?;
            let report = build_listing_report(&html, &suffixes, encoding)
                .context("Error translating developer URLs")?;
            match args.format {
                OutputFormat::Text => print!("{}", render_listing_text(&report)),
                OutputFormat::Json => print_json(&report)?,
            }
        }
        Mode::DeveloperUrl(url) => {
            let result = canonicalize_with(&suffixes, &url, encoding)
                .context("Error translating developer URL")?;
            match args.format {
                OutputFormat::Text => {
                    println!("Registerable Domain URL: {}", result.registrable_domain_url);
                    println!("Subdomain URL:           {}", result.subdomain_url_or_empty());
                }
                OutputFormat::Json => print_json(&result)?,
            }
        }
        Mode::Batch(path) => {
            let urls = read_url_file(&path)?;
            let report = canonicalize_batch(&suffixes, &urls, encoding, args.workers)?;
            match args.format {
                OutputFormat::Text => print!("{}", render_batch_text(&report)),
                OutputFormat::Json => print_json(&report)?,
            }
        }
    }

    Ok(())
}

fn main() {
    let args = Args::parse();
    setup_logging(args.verbose);

    match validate_args(&args).and_then(|()| run(&args)) {
        Ok(()) => {}
        Err(e) => {
            let message = describe_failure(&e);
            error!(action = "run", component = "main", error = %message, "Run failed");
            eprintln!("{message}");
            std::process::exit(1);
        }
    }
}
