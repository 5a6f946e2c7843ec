use serde::Serialize;
use std::collections::BTreeMap;

use crate::canonical::CanonicalResult;
use crate::error::CanonicalizeError;
use crate::meta::AppStoreMetadata;

#[derive(Debug, Clone, Serialize)]
pub struct ListingReport {
    pub metadata: AppStoreMetadata,
    /// `None` when the listing carries no developer URL.
    pub app_ads_txt: Option<CanonicalResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchEntry {
    pub input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registrable_domain_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subdomain_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchEntry {
    pub fn new(input: String, outcome: Result<CanonicalResult, CanonicalizeError>) -> Self {
        match outcome {
            Ok(result) => BatchEntry {
                input,
                registrable_domain_url: Some(result.registrable_domain_url),
                subdomain_url: result.subdomain_url,
                error_kind: None,
                error: None,
            },
            Err(e) => BatchEntry {
                input,
                registrable_domain_url: None,
                subdomain_url: None,
                error_kind: Some(e.kind()),
                error: Some(e.to_string()),
            },
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Default, Serialize)]
pub struct BatchStats {
    pub succeeded: u32,
    pub failed: u32,
    pub with_subdomain: u32,
    pub failures_by_kind: BTreeMap<&'static str, u32>,
}

impl BatchStats {
    pub fn record(&mut self, entry: &BatchEntry) {
        match entry.error_kind {
            None => {
                self.succeeded += 1;
                if entry.subdomain_url.is_some() {
                    self.with_subdomain += 1;
                }
            }
            Some(kind) => {
                self.failed += 1;
                *self.failures_by_kind.entry(kind).or_insert(0) += 1;
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub entries: Vec<BatchEntry>,
    pub stats: BatchStats,
}
