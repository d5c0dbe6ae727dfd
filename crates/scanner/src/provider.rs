//! Source of loaded granules for the scan pipeline.

use async_trait::async_trait;
use matchup::SatelliteDataset;
use thiserror::Error;

/// Errors raised while materializing a granule.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The catalog announced a granule the archive does not serve
    #[error("Granule not found in archive: {0}")]
    NotFound(String),

    /// Download or decode failure
    #[error("Failed to fetch granule {granule}: {message}")]
    Fetch { granule: String, message: String },
}

/// Resolves a granule name into a loaded dataset.
///
/// Implementations typically check a local store first and fall back to the
/// remote archive, but the pipeline only cares about the final dataset.
#[async_trait]
pub trait DatasetProvider: Send + Sync {
    async fn get(&self, granule: &str) -> Result<SatelliteDataset, ProviderError>;
}
