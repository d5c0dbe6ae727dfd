//! Error types for candidate granule search.

use thiserror::Error;

use crate::criteria::{DataType, Sensor};

/// Result type alias using SearchError.
pub type SearchResult<T> = Result<T, SearchError>;

/// Errors raised while narrowing the remote catalog.
#[derive(Debug, Error)]
pub enum SearchError {
    /// No catalog collection exists for this sensor/data-type pair
    #[error("Unsupported search criteria: {sensor:?} {dtype:?}")]
    UnsupportedCriteria { sensor: Sensor, dtype: DataType },

    /// Transport-level failure talking to the catalog
    #[error("Catalog request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Catalog answered with a non-success status; fatal, never retried here
    #[error("Catalog returned HTTP {0}")]
    Status(reqwest::StatusCode),

    /// Catalog payload did not have the expected UMM-JSON shape
    #[error("Malformed catalog response: {0}")]
    MalformedResponse(String),

    /// Granule identifier does not follow the ocean-color naming convention
    #[error("Unparsable granule name: {0}")]
    GranuleName(String),
}
