//! Developer URL to app-ads.txt location translation.
//!
//! A developer URL maps to the app-ads.txt file at the root of its
//! registrable domain and, when the URL names a subdomain, to the file at
//! that subdomain as well. Only the label immediately in front of the
//! registrable domain is kept, and the `www`/`m` aliases do not count as a
//! subdomain:
//!
//! | developer URL | registrable domain URL | subdomain URL |
//! |---|---|---|
//! | `https://example.com/test` | `https://example.com/app-ads.txt` | none |
//! | `https://www.example.com/test` | `https://example.com/app-ads.txt` | none |
//! | `https://a.b.example.co.uk/test` | `https://example.co.uk/app-ads.txt` | `https://b.example.co.uk/app-ads.txt` |

use serde::Serialize;
use tracing::debug;
use url::{Host, ParseError, Url};

use crate::error::{CanonicalizeError, LookupError};
use crate::suffix::SuffixList;

pub const APP_ADS_TXT_PATH: &str = "/app-ads.txt";

/// Subdomain labels that alias the bare domain.
const IGNORED_SUBDOMAINS: [&str; 2] = ["www", "m"];

/// How hostnames are written in the derived URLs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HostEncoding {
    /// Keep the form of the input: a Unicode hostname produces Unicode URLs,
    /// a Punycode hostname produces Punycode URLs.
    #[default]
    Preserve,
    /// Always write hostnames in Punycode.
    Punycode,
}

/// The app-ads.txt locations derived from one developer URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalResult {
    pub registrable_domain_url: String,
    pub subdomain_url: Option<String>,
}

impl CanonicalResult {
    /// Subdomain URL, or the empty string when there is none.
    pub fn subdomain_url_or_empty(&self) -> &str {
        self.subdomain_url.as_deref().unwrap_or_default()
    }
}

/// Translates a developer URL into app-ads.txt URLs, preserving the
/// hostname encoding of the input.
pub fn canonicalize<S>(suffixes: &S, input: &str) -> Result<CanonicalResult, CanonicalizeError>
where
    S: SuffixList + ?Sized,
{
    canonicalize_with(suffixes, input, HostEncoding::default())
}

pub fn canonicalize_with<S>(
    suffixes: &S,
    input: &str,
    encoding: HostEncoding,
) -> Result<CanonicalResult, CanonicalizeError>
where
    S: SuffixList + ?Sized,
{
    let input = input.trim().to_lowercase();
    let url = parse_developer_url(&input)?;
    let hostname = extract_hostname(&url, &input)?;

    let registrable = suffixes.registrable_domain(&hostname)?;
    let label = subdomain_label(&hostname, &registrable);

    let unicode_output =
        encoding == HostEncoding::Preserve && input_host_is_unicode(&input, &hostname);
    let (registrable, label) = if unicode_output {
        (
            idna::domain_to_unicode(&registrable).0,
            label.map(|label| idna::domain_to_unicode(label).0),
        )
    } else {
        (registrable, label.map(str::to_string))
    };

    let scheme = url.scheme();
    let result = CanonicalResult {
        registrable_domain_url: format!("{scheme}://{registrable}{APP_ADS_TXT_PATH}"),
        subdomain_url: label
            .map(|label| format!("{scheme}://{label}.{registrable}{APP_ADS_TXT_PATH}")),
    };

    debug!(
        action = "canonicalize",
        component = "developer_url",
        input = %input,
        registrable_domain_url = %result.registrable_domain_url,
        subdomain_url = ?result.subdomain_url,
        "Derived app-ads.txt locations"
    );
    Ok(result)
}

fn is_supported_scheme(scheme: &str) -> bool {
    scheme == "http" || scheme == "https"
}

/// Parses the trimmed, lower-cased input and checks its scheme.
///
/// A string without a scheme (`malformed`, `example.com/test`, the empty
/// string) is reported as an unsupported scheme rather than a parse error.
///
/// The host must come from an explicit `//authority`: `https:example.com`,
/// `https:/example.com` and `http:///example.com` have no hostname even
/// though URL parsing would recover one.
fn parse_developer_url(input: &str) -> Result<Url, CanonicalizeError> {
    match Url::parse(input) {
        Ok(url) if is_supported_scheme(url.scheme()) => {
            if raw_authority(input).is_some_and(|authority| !authority.is_empty()) {
                Ok(url)
            } else {
                Err(CanonicalizeError::MissingHostname(input.to_string()))
            }
        }
        Ok(_) | Err(ParseError::RelativeUrlWithoutBase) => {
            Err(CanonicalizeError::UnsupportedScheme(input.to_string()))
        }
        Err(ParseError::EmptyHost) => {
            let scheme = input.split_once(':').map(|(scheme, _)| scheme).unwrap_or_default();
            if is_supported_scheme(scheme) {
                Err(CanonicalizeError::MissingHostname(input.to_string()))
            } else {
                Err(CanonicalizeError::UnsupportedScheme(input.to_string()))
            }
        }
        Err(source) => Err(CanonicalizeError::InvalidUrl {
            input: input.to_string(),
            source,
        }),
    }
}

/// Hostname without port, credentials or trailing root dot.
fn extract_hostname(url: &Url, input: &str) -> Result<String, CanonicalizeError> {
    match url.host() {
        Some(Host::Domain(domain)) => {
            let domain = domain.trim_end_matches('.');
            if domain.is_empty() {
                Err(CanonicalizeError::MissingHostname(input.to_string()))
            } else {
                Ok(domain.to_string())
            }
        }
        Some(Host::Ipv4(_) | Host::Ipv6(_)) => Err(LookupError::IpAddress(
            url.host_str().unwrap_or_default().to_string(),
        )
        .into()),
        None => Err(CanonicalizeError::MissingHostname(input.to_string())),
    }
}

/// The label directly in front of `registrable`, unless it is missing or an
/// alias of the bare domain.
fn subdomain_label<'a>(hostname: &'a str, registrable: &str) -> Option<&'a str> {
    let portion = hostname.strip_suffix(registrable)?.strip_suffix('.')?;
    let label = match portion.rfind('.') {
        Some(last_dot) => &portion[last_dot + 1..],
        None => portion,
    };

    if label.is_empty() || IGNORED_SUBDOMAINS.contains(&label) {
        None
    } else {
        Some(label)
    }
}

/// Host and port as written in the input, without `userinfo@`.
///
/// `None` when the text after `scheme:` does not start with `//`.
fn raw_authority(input: &str) -> Option<&str> {
    let (_, rest) = input.split_once(':')?;
    let rest = rest.strip_prefix("//")?;
    let end = rest.find(['/', '\\', '?', '#']).unwrap_or(rest.len());
    let authority = &rest[..end];
    Some(match authority.rfind('@') {
        Some(at) => &authority[at + 1..],
        None => authority,
    })
}

/// Whether the input spelled `hostname` (always ASCII after parsing) in its
/// Unicode form.
fn input_host_is_unicode(input: &str, hostname: &str) -> bool {
    let (unicode, _) = idna::domain_to_unicode(hostname);
    unicode != hostname
        && raw_authority(input).is_some_and(|authority| authority.contains(unicode.as_str()))
}
