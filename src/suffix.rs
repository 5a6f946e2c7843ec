//! Public-suffix lookup.
//!
//! Registrable-domain derivation is modelled as a capability with a single
//! method so callers can swap the compiled-in list for a pinned snapshot or
//! a small fixed rule set.
//!
//! - [`PublicSuffixList`] uses the list compiled into the `psl` crate.
//! - [`RuleList`] is built from `public_suffix_list.dat` text.

use psl::{List, Psl};
use std::collections::HashSet;
use std::fs;
use std::net::IpAddr;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::error::{LookupError, RuleListError};

/// Resolves a hostname to its registrable domain (eTLD+1).
pub trait SuffixList {
    /// Returns the registrable domain for `host`.
    ///
    /// The result is written in the same form as `host`: Unicode hosts yield
    /// Unicode domains, ASCII (including Punycode) hosts yield ASCII.
    fn registrable_domain(&self, host: &str) -> Result<String, LookupError>;
}

impl<T: SuffixList + ?Sized> SuffixList for Box<T> {
    fn registrable_domain(&self, host: &str) -> Result<String, LookupError> {
        (**self).registrable_domain(host)
    }
}

/// The public suffix list compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct PublicSuffixList;

impl SuffixList for PublicSuffixList {
    fn registrable_domain(&self, host: &str) -> Result<String, LookupError> {
        lookup_in_input_form(host, |ascii| {
            List.domain(ascii.as_bytes())
                .map(|domain| String::from_utf8_lossy(domain.as_bytes()).into_owned())
        })
    }
}

/// Suffix rules parsed from the `public_suffix_list.dat` format.
///
/// Rules are stored in Punycode. Matching follows the published algorithm:
/// an exception rule beats any other match, otherwise the rule with the most
/// labels wins, and an unlisted TLD falls back to the implicit `*` rule.
#[derive(Debug, Clone, Default)]
pub struct RuleList {
    rules: HashSet<String>,
    // Parents of `*.` rules, e.g. `ck` for `*.ck`.
    wildcards: HashSet<String>,
    // Exception rules without their leading `!`.
    exceptions: HashSet<String>,
}

impl RuleList {
    /// Parses list text: one rule per line, `//` comments, blank lines ignored,
    /// and anything after the first whitespace on a line discarded.
    pub fn parse(text: &str) -> Self {
        Self::from_rules(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with("//"))
                .filter_map(|line| line.split_whitespace().next()),
        )
    }

    pub fn from_rules<'a, I>(rules: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut list = RuleList::default();
        for rule in rules {
            list.insert(rule);
        }
        list
    }

    /// Loads a list snapshot from disk.
    pub fn from_file(path: &Path) -> Result<Self, RuleListError> {
        let content = fs::read_to_string(path).map_err(|source| RuleListError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let list = Self::parse(&content);
        if list.is_empty() {
            return Err(RuleListError::Empty(path.to_path_buf()));
        }
        Ok(list)
    }

    pub fn len(&self) -> usize {
        self.rules.len() + self.wildcards.len() + self.exceptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&mut self, rule: &str) {
        let rule = rule.to_lowercase();
        let (set, body) = if let Some(body) = rule.strip_prefix('!') {
            (&mut self.exceptions, body)
        } else if let Some(body) = rule.strip_prefix("*.") {
            (&mut self.wildcards, body)
        } else {
            (&mut self.rules, rule.as_str())
        };

        match idna::domain_to_ascii(body) {
            Ok(ascii) if !ascii.is_empty() => {
                set.insert(ascii);
            }
            Ok(_) => {}
            Err(e) => {
                warn!(action = "parse", component = "suffix_rule", rule = %rule, error = %e, "Skipping invalid suffix rule")
            }
        }
    }

    /// Number of trailing labels of `labels` that form the public suffix.
    fn suffix_len(&self, labels: &[&str]) -> usize {
        let candidate = |start: usize| labels[start..].join(".");

        if let Some(start) = (0..labels.len()).find(|&i| self.exceptions.contains(&candidate(i))) {
            return labels.len() - start - 1;
        }

        (0..labels.len())
            .find(|&i| {
                self.rules.contains(&candidate(i))
                    || (i + 1 < labels.len() && self.wildcards.contains(&candidate(i + 1)))
            })
            .map(|start| labels.len() - start)
            .unwrap_or(1)
    }
}

impl SuffixList for RuleList {
    fn registrable_domain(&self, host: &str) -> Result<String, LookupError> {
        lookup_in_input_form(host, |ascii| {
            let labels: Vec<&str> = ascii.split('.').collect();
            let suffix_len = self.suffix_len(&labels);
            (labels.len() > suffix_len).then(|| labels[labels.len() - suffix_len - 1..].join("."))
        })
    }
}

/// Loads the suffix list to use for a run: a snapshot file when given,
/// otherwise the compiled-in list.
pub fn load_suffix_list(path: Option<&Path>) -> anyhow::Result<Box<dyn SuffixList + Send + Sync>> {
    let start_time = Instant::now();

    let Some(path) = path else {
        info!(
            action = "load",
            component = "suffix_list",
            source = "builtin",
            "Using compiled-in public suffix list"
        );
        return Ok(Box::new(PublicSuffixList));
    };

    info!(action = "load", component = "suffix_list", file_path = ?path, "Loading public suffix list from file");
    let list = RuleList::from_file(path)?;
    info!(
        action = "loaded",
        component = "suffix_list",
        rule_count = list.len(),
        duration_ms = start_time.elapsed().as_millis(),
        "Loaded public suffix list"
    );
    Ok(Box::new(list))
}

fn is_ip_literal(host: &str) -> bool {
    host.trim_start_matches('[')
        .trim_end_matches(']')
        .parse::<IpAddr>()
        .is_ok()
}

/// Runs `lookup` on the ASCII form of `host` and returns the match in the
/// form the caller supplied.
fn lookup_in_input_form<F>(host: &str, lookup: F) -> Result<String, LookupError>
where
    F: FnOnce(&str) -> Option<String>,
{
    let host = host.trim_end_matches('.');
    if is_ip_literal(host) {
        return Err(LookupError::IpAddress(host.to_string()));
    }
    if host.is_empty() || host.split('.').any(str::is_empty) {
        return Err(LookupError::InvalidHost {
            host: host.to_string(),
            reason: "empty label".to_string(),
        });
    }

    if host.is_ascii() {
        return lookup(host).ok_or_else(|| LookupError::IsSuffix(host.to_string()));
    }

    let ascii = idna::domain_to_ascii(host).map_err(|e| LookupError::InvalidHost {
        host: host.to_string(),
        reason: e.to_string(),
    })?;
    let domain = lookup(&ascii).ok_or_else(|| LookupError::IsSuffix(host.to_string()))?;
    let (unicode, _) = idna::domain_to_unicode(&domain);
    debug!(host = host, ascii = %ascii, domain = %unicode, "Resolved Unicode host");
    Ok(unicode)
}
