//! Targeted resolution: autocomplete search, then full lookup
//!
//! Each configured company is searched by name; the first candidate whose
//! name matches case-insensitively is fetched in full.

use super::{AutocompleteEntity, Identifier, RawOrganization, names_match};
use crate::client::CrunchbaseClient;
use crate::config::{ConnectorConfig, DEFAULT_COLLECTION_IDS, DEFAULT_SEARCH_LIMIT};
use crate::error::ConnectorError;
use crate::etl::Extractor;
use eyre::{Context, Result};

/// Extractor resolving a short list of company names one by one
///
/// Records come back in target-list order, one per target. A target without
/// a matching candidate fails the run with [`ConnectorError::UnresolvedTarget`].
pub struct TargetedExtractor {
    client: CrunchbaseClient,
    targets: Vec<String>,
    collection_ids: String,
    search_limit: usize,
}

impl TargetedExtractor {
    pub fn new(client: CrunchbaseClient, targets: Vec<String>) -> Self {
        Self {
            client,
            targets,
            collection_ids: DEFAULT_COLLECTION_IDS.to_string(),
            search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }

    pub fn from_config(client: CrunchbaseClient, config: &ConnectorConfig) -> Self {
        Self {
            client,
            targets: config.targets.clone(),
            collection_ids: config.collection_ids.clone(),
            search_limit: config.search_limit,
        }
    }

    /// Search for `company` and return the key to look it up by
    ///
    /// Returns `None` when no candidate matches.
    pub async fn resolve_entity_key(&self, company: &str) -> Result<Option<String>> {
        let response = self
            .client
            .autocomplete(company, &self.collection_ids, self.search_limit)
            .await
            .with_context(|| format!("Failed to search for '{}'", company))?;

        log::debug!(
            "Search for '{}' returned {} candidate(s)",
            company,
            response.entities.len()
        );

        Ok(find_candidate(&response.entities, company)
            .and_then(entity_key)
            .map(String::from))
    }

    async fn fetch_company(&self, company: &str) -> Result<RawOrganization> {
        let key = self
            .resolve_entity_key(company)
            .await?
            .ok_or_else(|| ConnectorError::UnresolvedTarget(company.to_string()))?;

        log::debug!("Resolved '{}' to '{}'", company, key);

        self.client
            .lookup_organization(&key)
            .await
            .with_context(|| format!("Failed to fetch organization '{}'", key))
    }
}

/// First candidate, in response order, whose name matches `company`
pub fn find_candidate<'a>(
    entities: &'a [AutocompleteEntity],
    company: &str,
) -> Option<&'a Identifier> {
    entities
        .iter()
        .find(|entity| entity.name().is_some_and(|name| names_match(name, company)))
        .and_then(|entity| entity.identifier.as_ref())
}

/// Lookup key for an identifier: permalink, falling back to UUID
pub fn entity_key(identifier: &Identifier) -> Option<&str> {
    identifier
        .permalink
        .as_deref()
        .filter(|p| !p.is_empty())
        .or_else(|| identifier.uuid.as_deref().filter(|u| !u.is_empty()))
}

impl Extractor for TargetedExtractor {
    type Item = RawOrganization;

    async fn extract(&self) -> Result<Vec<Self::Item>> {
        let mut records = Vec::with_capacity(self.targets.len());

        for company in &self.targets {
            records.push(self.fetch_company(company).await?);
        }

        log::info!("Extracted {} organization(s) by name", records.len());

        Ok(records)
    }
}
