//! Mode-selected organization extractor

use super::{CatalogExtractor, RawOrganization, TargetedExtractor};
use crate::client::CrunchbaseClient;
use crate::config::{ConnectorConfig, Mode};
use crate::etl::Extractor;
use eyre::Result;

/// The resolution strategy chosen for a run
pub enum OrganizationExtractor {
    Targeted(TargetedExtractor),
    Catalog(CatalogExtractor),
}

impl OrganizationExtractor {
    /// `specific` resolves names one by one; `full` scans the catalog
    pub fn for_mode(mode: Mode, client: CrunchbaseClient, config: &ConnectorConfig) -> Self {
        match mode {
            Mode::Specific => Self::Targeted(TargetedExtractor::from_config(client, config)),
            Mode::Full => Self::Catalog(CatalogExtractor::from_config(client, config)),
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            Self::Targeted(_) => Mode::Specific,
            Self::Catalog(_) => Mode::Full,
        }
    }
}

impl Extractor for OrganizationExtractor {
    type Item = RawOrganization;

    async fn extract(&self) -> Result<Vec<Self::Item>> {
        match self {
            Self::Targeted(extractor) => extractor.extract().await,
            Self::Catalog(extractor) => extractor.extract().await,
        }
    }
}
