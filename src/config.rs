//! Connector configuration
//!
//! [`ConnectorConfig`] is built once at startup (usually from the environment)
//! and handed to each component. The target company list can be overridden by
//! a YAML [`TargetsManifest`]:
//!
//! ```yaml
//! companies:
//!   - Superside
//!   - Acme
//! ```

use crate::error::ConnectorError;
use clap::ValueEnum;
use eyre::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use url::Url;

pub const DEFAULT_API_URL: &str = "https://api.crunchbase.com/api/v4/";
pub const DEFAULT_DESTINATION: &str = "destination/";
pub const DEFAULT_COMPANIES: &[&str] = &["Superside"];
pub const DEFAULT_PAGE_SIZE: usize = 1000;
pub const DEFAULT_SEARCH_LIMIT: usize = 10;
pub const DEFAULT_COLLECTION_IDS: &str = "organization.companies";

/// Which resolution strategy a run uses
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Page through the ranked catalog looking for the target names
    Full,
    /// Resolve each target name through the autocomplete endpoint
    #[default]
    Specific,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::Specific => write!(f, "specific"),
        }
    }
}

impl FromStr for Mode {
    type Err = ConnectorError;

    // Exact tokens only; "Specific" is not "specific".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(Self::Full),
            "specific" => Ok(Self::Specific),
            other => Err(ConnectorError::Configuration(format!(
                "Mode ({}) must be one of 'full', 'specific'",
                other
            ))),
        }
    }
}

/// Runtime settings shared by the client, the extractors and the sink
#[derive(Clone, Debug)]
pub struct ConnectorConfig {
    /// Base URL the endpoint paths are joined onto
    pub api_url: Url,
    /// Value of the `X-cb-user-key` header
    pub api_key: String,
    /// Company names to resolve, matched case-insensitively
    pub targets: Vec<String>,
    /// Root directory of the partitioned output
    pub destination: PathBuf,
    /// Entities requested per bulk search page
    pub page_size: usize,
    /// Pause after every bulk search page
    pub page_delay: Duration,
    /// Candidates requested per autocomplete query
    pub search_limit: usize,
    /// Autocomplete collection filter
    pub collection_ids: String,
}

impl ConnectorConfig {
    /// Create a config with default targets, destination and paging
    pub fn new(api_url: Url, api_key: impl Into<String>) -> Self {
        Self {
            api_url,
            api_key: api_key.into(),
            targets: DEFAULT_COMPANIES.iter().map(|s| s.to_string()).collect(),
            destination: PathBuf::from(DEFAULT_DESTINATION),
            page_size: DEFAULT_PAGE_SIZE,
            page_delay: Duration::from_secs(1),
            search_limit: DEFAULT_SEARCH_LIMIT,
            collection_ids: DEFAULT_COLLECTION_IDS.to_string(),
        }
    }

    /// Load the config from environment variables
    ///
    /// Expected environment variables:
    /// - CRUNCHBASE_API_KEY: API key (required)
    /// - CRUNCHBASE_API_URL: API base URL (optional)
    /// - CRUNCHBASE_COMPANIES: comma-separated target companies (optional)
    /// - CRUNCHBASE_OUTPUT_DIR: output directory (optional)
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("CRUNCHBASE_API_KEY").map_err(|_| {
            ConnectorError::Configuration(
                "CRUNCHBASE_API_KEY environment variable not set".to_string(),
            )
        })?;

        let url_str =
            std::env::var("CRUNCHBASE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let api_url = parse_api_url(&url_str)?;

        let mut config = Self::new(api_url, api_key);

        if let Ok(companies) = std::env::var("CRUNCHBASE_COMPANIES") {
            config.targets = split_companies(&companies);
        }
        if let Ok(dir) = std::env::var("CRUNCHBASE_OUTPUT_DIR") {
            config.destination = PathBuf::from(dir);
        }

        Ok(config)
    }

    pub fn with_targets(mut self, targets: Vec<String>) -> Self {
        self.targets = targets;
        self
    }

    pub fn with_destination(mut self, destination: impl AsRef<Path>) -> Self {
        self.destination = destination.as_ref().to_path_buf();
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_page_delay(mut self, page_delay: Duration) -> Self {
        self.page_delay = page_delay;
        self
    }

    /// Check the settings a run depends on
    ///
    /// # Errors
    /// Returns [`ConnectorError::Configuration`] for an empty API key,
    /// an empty target list or a zero page size
    pub fn validate(&self) -> Result<(), ConnectorError> {
        if self.api_key.trim().is_empty() {
            return Err(ConnectorError::Configuration(
                "API key must not be empty".to_string(),
            ));
        }
        if self.targets.is_empty() {
            return Err(ConnectorError::Configuration(
                "At least one target company is required".to_string(),
            ));
        }
        if self.page_size == 0 {
            return Err(ConnectorError::Configuration(
                "Page size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parse the API base URL, making sure it ends with a slash so
/// `Url::join` appends endpoint paths instead of replacing the last segment
pub fn parse_api_url(url_str: &str) -> Result<Url, ConnectorError> {
    let normalized = if url_str.ends_with('/') {
        url_str.to_string()
    } else {
        format!("{}/", url_str)
    };
    Url::parse(&normalized).map_err(|e| {
        ConnectorError::Configuration(format!("Invalid API URL '{}': {}", url_str, e))
    })
}

fn split_companies(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// YAML list of target companies
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct TargetsManifest {
    #[serde(default)]
    pub companies: Vec<String>,
}

impl TargetsManifest {
    pub fn count(&self) -> usize {
        self.companies.len()
    }

    /// Read manifest from YAML file
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!(
                "Failed to read targets manifest: {}",
                path.as_ref().display()
            )
        })?;

        let manifest: Self = serde_yaml::from_str(&content)
            .with_context(|| "Failed to parse targets manifest YAML")?;

        Ok(manifest)
    }
}
