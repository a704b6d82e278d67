//! Raw organization → output row

use super::{NormalizedRow, RawOrganization};
use crate::error::ConnectorError;
use crate::etl::Transformer;
use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use eyre::{Context, Result};

/// Transformer that maps a [`RawOrganization`] onto a [`NormalizedRow`]
///
/// Every field except `elt_timestamp` is copied from the record. A missing
/// field fails with [`ConnectorError::MissingField`], which aborts the run.
///
/// # Example
/// ```
/// use crunchbase_connector::crunchbase::{RawOrganization, RecordNormalizer};
/// use crunchbase_connector::etl::Transformer;
/// use serde_json::json;
///
/// let raw: RawOrganization = serde_json::from_value(json!({
///     "identifier": {"value": "Acme", "permalink": "acme"},
///     "created_at": "2020-01-01T00:00:00Z",
///     "updated_at": "2024-01-01T00:00:00Z",
///     "website_url": "https://acme.io",
///     "linkedin": {"value": "https://linkedin.com/company/acme"},
///     "location_identifiers": [],
///     "short_description": "Anvils"
/// })).unwrap();
///
/// let row = RecordNormalizer::new().transform(raw).unwrap();
/// assert_eq!(row.permalink, "acme");
/// assert_eq!(row.location_identifiers, "");
/// ```
pub struct RecordNormalizer {
    clock: fn() -> DateTime<Utc>,
}

impl Default for RecordNormalizer {
    fn default() -> Self {
        Self { clock: Utc::now }
    }
}

impl RecordNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `clock` instead of wall-clock time for `elt_timestamp`
    pub fn with_clock(clock: fn() -> DateTime<Utc>) -> Self {
        Self { clock }
    }

    /// Normalize one record
    ///
    /// # Errors
    /// Returns [`ConnectorError::MissingField`] naming the first absent field
    pub fn normalize(&self, raw: RawOrganization) -> Result<NormalizedRow> {
        let identifier = raw.identifier.unwrap_or_default();

        Ok(NormalizedRow {
            name: require(identifier.value, "identifier.value")?,
            created_at: require(raw.created_at, "created_at")?,
            permalink: require(identifier.permalink, "identifier.permalink")?,
            website: require(raw.website_url, "website_url")?.as_str().to_string(),
            updated_at: require(raw.updated_at, "updated_at")?,
            linkedin: require(raw.linkedin, "linkedin")?.as_str().to_string(),
            location_identifiers: join_locations(require(
                raw.location_identifiers,
                "location_identifiers",
            )?)?,
            short_description: require(raw.short_description, "short_description")?,
            elt_timestamp: truncate_to_hour((self.clock)())?,
        })
    }
}

impl Transformer for RecordNormalizer {
    type Input = RawOrganization;
    type Output = NormalizedRow;

    fn transform(&self, input: Self::Input) -> Result<Self::Output> {
        self.normalize(input)
    }
}

fn require<T>(value: Option<T>, field: &'static str) -> Result<T, ConnectorError> {
    value.ok_or(ConnectorError::MissingField { field })
}

/// Render locations as `"{type}: {value}"` joined by `", "`, keeping source order
pub fn join_locations(locations: Vec<super::LocationIdentifier>) -> Result<String> {
    let parts = locations
        .into_iter()
        .map(|location| -> Result<String, ConnectorError> {
            let kind = require(location.location_type, "location_identifiers.location_type")?;
            let value = require(location.value, "location_identifiers.value")?;
            Ok(format!("{}: {}", kind, value))
        })
        .collect::<Result<Vec<_>, ConnectorError>>()?;
    Ok(parts.join(", "))
}

/// Floor `instant` to the start of its UTC hour
pub fn truncate_to_hour(instant: DateTime<Utc>) -> Result<DateTime<Utc>> {
    instant
        .duration_trunc(TimeDelta::hours(1))
        .with_context(|| format!("Failed to truncate {} to the hour", instant))
}
