//! Crunchbase organization extraction
//!
//! Two strategies resolve target company names to full organization records:
//! - [`TargetedExtractor`]: autocomplete search per name, then lookup
//! - [`CatalogExtractor`]: scan the ranked catalog, lookup on name match
//!
//! [`RecordNormalizer`] turns each record into a [`NormalizedRow`].

mod catalog;
mod extractor;
mod normalizer;
mod targeted;
mod types;

pub use catalog::CatalogExtractor;
pub use extractor::OrganizationExtractor;
pub use normalizer::{RecordNormalizer, join_locations, truncate_to_hour};
pub use targeted::{TargetedExtractor, entity_key, find_candidate};
pub use types::*;

/// Case-insensitive company name comparison
pub fn names_match(name: &str, target: &str) -> bool {
    name.to_lowercase() == target.to_lowercase()
}
