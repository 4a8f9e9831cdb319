//! Crate-level error aggregating every failure category.

use thiserror::Error;

use crate::broker::BrokerError;
use crate::config::ConfigError;
use crate::filter::ValidationError;
use crate::source::{DatasetError, SourceError};

#[derive(Debug, Error)]
pub enum Error {
    /// Predicate or path rejected against the schema
    #[error("Invalid filter: {0}")]
    Validation(#[from] ValidationError),

    /// Remote fetch failed; the list window was left untouched
    #[error("Fetch failed: {0}")]
    FetchFailed(#[from] SourceError),

    #[error("Change broker error: {0}")]
    Broker(#[from] BrokerError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    #[error("Failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),

    /// Command-line input that could not be interpreted
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, Error>;
