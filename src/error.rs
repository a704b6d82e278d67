//! Typed failures raised by the connector
//!
//! Plumbing code returns [`eyre::Result`]; the variants here are raised into
//! the report so the CLI can map them to exit codes.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConnectorError {
    /// Bad mode, URL, credential or target list. Raised before any request.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Network failure, non-success status or undecodable body
    #[error("Request to {endpoint} failed: {message}")]
    Transport { endpoint: String, message: String },

    /// A raw organization record lacks a field the output schema requires
    #[error("Organization record is missing required field '{field}'")]
    MissingField { field: &'static str },

    /// Targeted mode found no search candidate matching the company name
    #[error("No organization matching '{0}' was found")]
    UnresolvedTarget(String),
}

impl ConnectorError {
    pub fn transport(endpoint: impl Into<String>, message: impl ToString) -> Self {
        Self::Transport {
            endpoint: endpoint.into(),
            message: message.to_string(),
        }
    }

    /// Process exit code for this failure
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration(_) => 2,
            Self::Transport { .. } => 3,
            Self::MissingField { .. } => 4,
            Self::UnresolvedTarget(_) => 5,
        }
    }

    /// Find the first `ConnectorError` in a report's cause chain
    pub fn find(report: &eyre::Report) -> Option<&ConnectorError> {
        report
            .chain()
            .find_map(|cause| cause.downcast_ref::<ConnectorError>())
    }
}
