use std::path::PathBuf;
use thiserror::Error;

/// Failure to derive a registrable domain from a hostname.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("IP addresses do not have registrable domains: {0}")]
    IpAddress(String),

    #[error("{0} has no registrable domain under the public suffix list")]
    IsSuffix(String),

    #[error("invalid domain name {host}: {reason}")]
    InvalidHost { host: String, reason: String },
}

/// Failure to translate a developer URL into app-ads.txt locations.
///
/// Every variant is terminal for the input that produced it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CanonicalizeError {
    #[error("Unable to parse URL [{input}]: {source}")]
    InvalidUrl {
        input: String,
        #[source]
        source: url::ParseError,
    },

    #[error("URL does not start with https/http: {0}")]
    UnsupportedScheme(String),

    #[error("Hostname not found in URL: {0}")]
    MissingHostname(String),

    #[error("Unable to extract registerable domain from URL: {0}")]
    DomainExtraction(#[from] LookupError),
}

impl CanonicalizeError {
    /// Short, stable name of the error kind, used as a statistics key.
    pub fn kind(&self) -> &'static str {
        match self {
            CanonicalizeError::InvalidUrl { .. } => "invalid_url",
            CanonicalizeError::UnsupportedScheme(_) => "unsupported_scheme",
            CanonicalizeError::MissingHostname(_) => "missing_hostname",
            CanonicalizeError::DomainExtraction(_) => "domain_extraction",
        }
    }
}

#[derive(Error, Debug)]
pub enum RuleListError {
    #[error("failed to read suffix list {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("suffix list {0:?} contains no rules")]
    Empty(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_offending_input() {
        let err = CanonicalizeError::UnsupportedScheme("ftp://example.com/test".to_string());
        assert_eq!(
            err.to_string(),
            "URL does not start with https/http: ftp://example.com/test"
        );

        let err = CanonicalizeError::InvalidUrl {
            input: "https://exa mple.com".to_string(),
            source: url::ParseError::InvalidDomainCharacter,
        };
        assert!(err.to_string().starts_with("Unable to parse URL [https://exa mple.com]: "));
    }

    #[test]
    fn lookup_error_converts_into_domain_extraction() {
        let err: CanonicalizeError = LookupError::IsSuffix("co.uk".to_string()).into();
        assert_eq!(err.kind(), "domain_extraction");
        assert!(err
            .to_string()
            .starts_with("Unable to extract registerable domain from URL:"));
        assert!(err.to_string().contains("co.uk"));
    }
}
