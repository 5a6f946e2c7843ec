use time::macros::format_description;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::EnvFilter;

/// Structured logs go to stderr so stdout carries only results.
/// `RUST_LOG` overrides the level picked by `verbose`.
pub fn setup_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "error" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let timer = LocalTime::new(format_description!(
        "[hour]:[minute]:[second].[subsecond digits:3]"
    ));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_timer(timer)
        .with_writer(std::io::stderr)
        .init();
}

pub fn format_number(num: u32) -> String {
    let digits = num.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// One-line message for a failed run, including the context chain.
pub fn describe_failure(err: &anyhow::Error) -> String {
    format!("Error: {err:#}")
}

pub fn validate_args(args: &crate::args::Args) -> anyhow::Result<()> {
    if args.input_count() > 1 {
        anyhow::bail!(
            "--app-store-url, --html-file, --developer-url and --batch are mutually exclusive"
        );
    }

    if let Some(workers) = args.workers {
        if workers == 0 {
            anyhow::bail!("--workers must be greater than 0");
        }
    }

    if args.timeout_secs == 0 {
        anyhow::bail!("--timeout-secs must be greater than 0");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::Args;
    use clap::Parser;

    #[test]
    fn format_number_groups_thousands() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn validate_args_rejects_conflicts_and_zeroes() {
        let args = Args::parse_from(["app-ads-locator", "-d", "https://example.com", "--html-file", "x.html"]);
        assert!(validate_args(&args).is_err());

        let args = Args::parse_from(["app-ads-locator", "-b", "urls.txt", "-w", "0"]);
        assert!(validate_args(&args).is_err());

        let args = Args::parse_from(["app-ads-locator", "--timeout-secs", "0"]);
        assert!(validate_args(&args).is_err());

        let args = Args::parse_from(["app-ads-locator", "-b", "urls.txt", "-w", "4"]);
        assert!(validate_args(&args).is_ok());
    }

    #[test]
    fn validation_failures_render_like_run_failures() {
        let args = Args::parse_from(["app-ads-locator", "-b", "urls.txt", "-w", "0"]);
        let err = validate_args(&args).unwrap_err();
        assert_eq!(describe_failure(&err), "Error: --workers must be greater than 0");

        let err = anyhow::anyhow!("URL does not start with https/http: ftp://x")
            .context("Error translating developer URL");
        assert_eq!(
            describe_failure(&err),
            "Error: Error translating developer URL: URL does not start with https/http: ftp://x"
        );
    }
}
