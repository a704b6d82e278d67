//! Crunchbase Connector
//!
//! Extracts a fixed set of organization fields from the Crunchbase API and
//! writes them as Parquet files partitioned by capture hour.

pub mod client;
pub mod config;
pub mod connector;
pub mod crunchbase;
pub mod error;
pub mod etl;
pub mod storage;

// Re-exports for convenience
pub use client::{Auth, CrunchbaseClient};
pub use config::{ConnectorConfig, Mode, TargetsManifest};
pub use connector::Connector;
pub use crunchbase::{
    CatalogExtractor, NormalizedRow, OrganizationExtractor, RawOrganization, RecordNormalizer,
    TargetedExtractor,
};
pub use error::ConnectorError;
pub use etl::{Extractor, Loader, Pipeline, Transformer};
pub use storage::{OrganizationTable, PartitionedParquetWriter};
