//! Request and response shapes for the Crunchbase v4 API
//!
//! Response fields are optional; presence is checked once, when a record is
//! normalized.

use crate::error::ConnectorError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fields projected by the bulk organization search
pub const SEARCH_FIELD_IDS: &[&str] = &[
    "name",
    "identifier",
    "permalink",
    "linkedin",
    "entity_def_id",
    "updated_at",
    "location_identifiers",
    "created_at",
    "short_description",
];

/// Catalog sort key; rank 1 is the most prominent organization
pub const RANK_FIELD_ID: &str = "rank_org";

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Identifier {
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub permalink: Option<String>,
    #[serde(default)]
    pub uuid: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AutocompleteResponse {
    #[serde(default)]
    pub entities: Vec<AutocompleteEntity>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AutocompleteEntity {
    #[serde(default)]
    pub identifier: Option<Identifier>,
}

impl AutocompleteEntity {
    /// Display name of the candidate, if the API returned one
    pub fn name(&self) -> Option<&str> {
        self.identifier.as_ref()?.value.as_deref()
    }
}

/// Body of a lookup call: `{cards: {fields: ..}}` or `{fields: ..}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LookupResponse {
    #[serde(default)]
    pub cards: Option<LookupCards>,
    #[serde(default)]
    pub fields: Option<RawOrganization>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LookupCards {
    #[serde(default)]
    pub fields: Option<RawOrganization>,
}

impl LookupResponse {
    /// Take the record from `cards.fields`, falling back to `fields`
    pub fn into_record(self) -> Result<RawOrganization, ConnectorError> {
        self.cards
            .and_then(|cards| cards.fields)
            .or(self.fields)
            .ok_or(ConnectorError::MissingField { field: "fields" })
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SortOrder {
    pub field_id: String,
    pub sort: String,
}

/// Body of a bulk organization search
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchRequest {
    pub field_ids: Vec<String>,
    pub order: Vec<SortOrder>,
    pub limit: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after_id: Option<String>,
}

impl SearchRequest {
    /// First page of the catalog in ascending rank order
    pub fn ranked(limit: usize) -> Self {
        Self {
            field_ids: SEARCH_FIELD_IDS.iter().map(|s| s.to_string()).collect(),
            order: vec![SortOrder {
                field_id: RANK_FIELD_ID.to_string(),
                sort: "asc".to_string(),
            }],
            limit,
            after_id: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    /// Total size of the catalog, not of this page
    pub count: u64,
    #[serde(default)]
    pub entities: Vec<SearchEntity>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchEntity {
    pub uuid: String,
    #[serde(default)]
    pub properties: SearchProperties,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchProperties {
    #[serde(default)]
    pub name: Option<String>,
}

/// URL fields arrive either bare or wrapped as `{"value": "..."}`
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum UrlField {
    Plain(String),
    Wrapped { value: String },
}

impl UrlField {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Plain(url) => url,
            Self::Wrapped { value } => value,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct LocationIdentifier {
    #[serde(default)]
    pub location_type: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

/// One organization as returned by the lookup endpoint
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RawOrganization {
    #[serde(default)]
    pub identifier: Option<Identifier>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub website_url: Option<UrlField>,
    #[serde(default)]
    pub linkedin: Option<UrlField>,
    #[serde(default)]
    pub location_identifiers: Option<Vec<LocationIdentifier>>,
    #[serde(default)]
    pub short_description: Option<String>,
}

/// Fixed-shape output row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRow {
    pub name: String,
    pub created_at: String,
    pub permalink: String,
    pub website: String,
    pub updated_at: String,
    pub linkedin: String,
    /// `"{type}: {value}"` entries joined with `", "`
    pub location_identifiers: String,
    pub short_description: String,
    /// Capture time truncated to the hour; also the partition key
    pub elt_timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_search_request_omits_cursor_until_set() {
        let mut request = SearchRequest::ranked(1000);
        let body = serde_json::to_value(&request).unwrap();
        assert!(body.get("after_id").is_none());
        assert_eq!(body["order"], json!([{"field_id": "rank_org", "sort": "asc"}]));
        assert_eq!(body["limit"], 1000);

        request.after_id = Some("u-9".to_string());
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["after_id"], "u-9");
    }

    #[test]
    fn test_url_field_shapes() {
        let plain: UrlField = serde_json::from_value(json!("https://a.io")).unwrap();
        let wrapped: UrlField = serde_json::from_value(json!({"value": "https://b.io"})).unwrap();
        assert_eq!(plain.as_str(), "https://a.io");
        assert_eq!(wrapped.as_str(), "https://b.io");
    }

    #[test]
    fn test_lookup_precedence() {
        let both: LookupResponse = serde_json::from_value(json!({
            "cards": {"fields": {"created_at": "cards"}},
            "fields": {"created_at": "top"}
        }))
        .unwrap();
        assert_eq!(both.into_record().unwrap().created_at.as_deref(), Some("cards"));

        let empty_cards: LookupResponse = serde_json::from_value(json!({
            "cards": {},
            "fields": {"created_at": "top"}
        }))
        .unwrap();
        assert_eq!(empty_cards.into_record().unwrap().created_at.as_deref(), Some("top"));
    }

    #[test]
    fn test_raw_organization_ignores_extra_fields() {
        let raw: RawOrganization = serde_json::from_value(json!({
            "identifier": {"value": "Acme", "permalink": "acme", "uuid": "u-1", "entity_def_id": "organization"},
            "categories": [{"value": "Software"}],
            "location_identifiers": [{"location_type": "city", "value": "Oslo", "permalink": "oslo"}]
        }))
        .unwrap();
        assert_eq!(raw.identifier.unwrap().permalink.as_deref(), Some("acme"));
        assert_eq!(raw.location_identifiers.unwrap().len(), 1);
    }
}
