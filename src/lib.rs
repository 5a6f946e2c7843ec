pub mod args;
pub mod batch;
pub mod canonical;
pub mod error;
pub mod listing;
pub mod meta;
pub mod stats;
pub mod suffix;
pub mod utils;

pub use args::{Args, Mode, OutputFormat};
pub use batch::{canonicalize_batch, read_url_file};
pub use canonical::{canonicalize, canonicalize_with, CanonicalResult, HostEncoding};
pub use error::{CanonicalizeError, LookupError};
pub use listing::{build_listing_report, load_listing_html, ListingSource};
pub use meta::{extract_app_store_meta, AppStoreMetadata};
pub use stats::{BatchReport, ListingReport};
pub use suffix::{load_suffix_list, PublicSuffixList, RuleList, SuffixList};
