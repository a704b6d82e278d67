//! Full-catalog resolution
//!
//! Pages through the bulk organization search in ascending rank order and
//! fetches every entity whose name matches a target. Paging stops once every
//! target has matched at least one entity, or the catalog is exhausted.

use super::{RawOrganization, SearchEntity, SearchRequest, names_match};
use crate::client::CrunchbaseClient;
use crate::config::{ConnectorConfig, DEFAULT_PAGE_SIZE};
use crate::etl::Extractor;
use eyre::{Context, Result};
use std::collections::HashSet;
use std::time::Duration;

/// Extractor scanning the ranked catalog for the target names
///
/// Records come back in catalog rank order. An organization name that appears
/// twice in the catalog is fetched twice.
pub struct CatalogExtractor {
    client: CrunchbaseClient,
    targets: Vec<String>,
    page_size: usize,
    page_delay: Duration,
}

impl CatalogExtractor {
    pub fn new(client: CrunchbaseClient, targets: Vec<String>) -> Self {
        Self {
            client,
            targets,
            page_size: DEFAULT_PAGE_SIZE,
            page_delay: Duration::from_secs(1),
        }
    }

    pub fn from_config(client: CrunchbaseClient, config: &ConnectorConfig) -> Self {
        Self {
            client,
            targets: config.targets.clone(),
            page_size: config.page_size,
            page_delay: config.page_delay,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_page_delay(mut self, page_delay: Duration) -> Self {
        self.page_delay = page_delay;
        self
    }

    /// Targets matching this entity, with their position in the target list
    fn matching_targets<'a>(
        &'a self,
        entity: &'a SearchEntity,
    ) -> impl Iterator<Item = (usize, &'a str)> {
        let name = entity.properties.name.as_deref();
        self.targets
            .iter()
            .map(String::as_str)
            .enumerate()
            .filter(move |(_, target)| name.is_some_and(|name| names_match(name, target)))
    }
}

impl Extractor for CatalogExtractor {
    type Item = RawOrganization;

    async fn extract(&self) -> Result<Vec<Self::Item>> {
        let mut request = SearchRequest::ranked(self.page_size);
        let mut records = Vec::new();
        let mut found: HashSet<usize> = HashSet::new();
        let mut offset: u64 = 0;

        loop {
            let page = self
                .client
                .search_organizations(&request)
                .await
                .with_context(|| format!("Failed to fetch catalog page at offset {}", offset))?;

            tokio::time::sleep(self.page_delay).await;

            for entity in &page.entities {
                for (index, target) in self.matching_targets(entity) {
                    log::info!("Found '{}' as organization {}", target, entity.uuid);
                    let record = self
                        .client
                        .lookup_organization(&entity.uuid)
                        .await
                        .with_context(|| {
                            format!("Failed to fetch organization '{}'", entity.uuid)
                        })?;
                    records.push(record);
                    found.insert(index);
                }
            }

            if let Some(last) = page.entities.last() {
                request.after_id = Some(last.uuid.clone());
            }
            offset += self.page_size as u64;

            log::info!(
                "Scanned {}/{} organizations, {}/{} target(s) found",
                offset.min(page.count),
                page.count,
                found.len(),
                self.targets.len()
            );

            if found.len() == self.targets.len() || offset >= page.count {
                break;
            }
            if page.entities.is_empty() {
                log::warn!("Catalog returned an empty page before offset {}", page.count);
                break;
            }
        }

        log::info!("Extracted {} organization(s) from the catalog", records.len());

        Ok(records)
    }
}
