//! Ingestion run: resolve → normalize → write

use crate::client::CrunchbaseClient;
use crate::config::{ConnectorConfig, Mode};
use crate::crunchbase::{NormalizedRow, OrganizationExtractor, RecordNormalizer};
use crate::etl::{Loader, Pipeline};
use crate::storage::PartitionedParquetWriter;
use eyre::Result;

/// One extraction run against the Crunchbase API
///
/// The run is all-or-nothing: every record is resolved and normalized before
/// the loader is called, and any failure is logged and returned.
///
/// # Example
/// ```no_run
/// use crunchbase_connector::{Connector, ConnectorConfig, Mode};
///
/// # async fn example() -> eyre::Result<()> {
/// let config = ConnectorConfig::from_env()?;
/// let rows = Connector::try_new(config)?.run(Mode::Specific).await?;
/// println!("Wrote {} rows", rows);
/// # Ok(())
/// # }
/// ```
pub struct Connector<L = PartitionedParquetWriter> {
    config: ConnectorConfig,
    client: CrunchbaseClient,
    loader: L,
}

impl Connector {
    /// Create a connector writing Parquet to `config.destination`
    ///
    /// # Errors
    /// Returns [`crate::ConnectorError::Configuration`] for an invalid config
    pub fn try_new(config: ConnectorConfig) -> Result<Self> {
        let loader = PartitionedParquetWriter::new(&config.destination);
        Self::with_loader(config, loader)
    }
}

impl<L> Connector<L>
where
    L: Loader<Item = NormalizedRow>,
{
    /// Create a connector that hands its rows to `loader`
    pub fn with_loader(config: ConnectorConfig, loader: L) -> Result<Self> {
        config.validate()?;
        let client = CrunchbaseClient::from_config(&config)?;
        Ok(Self {
            config,
            client,
            loader,
        })
    }

    /// Run the extraction in `mode`, returning the number of rows written
    pub async fn run(self, mode: Mode) -> Result<usize> {
        log::info!("Starting fetching data in the '{}' mode...", mode);
        log::debug!(
            "Targets: {} against {}",
            self.config.targets.join(", "),
            self.client
        );

        let extractor = OrganizationExtractor::for_mode(mode, self.client, &self.config);
        let pipeline = Pipeline::new(extractor, RecordNormalizer::new(), self.loader);

        match pipeline.run().await {
            Ok(count) => {
                log::info!(
                    "Successfully unloaded {} row(s) to '{}'",
                    count,
                    self.config.destination.display()
                );
                Ok(count)
            }
            Err(e) => {
                log::error!("Error: {:#}", e);
                Err(e)
            }
        }
    }
}
