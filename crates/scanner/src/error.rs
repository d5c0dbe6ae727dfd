//! Error types for the scan pipeline.

use thiserror::Error;

use crate::provider::ProviderError;

/// Result type alias using ScanError.
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors surfaced through a scan handle.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Catalog narrowing failed
    #[error(transparent)]
    Search(#[from] granule_search::SearchError),

    /// A candidate granule could not be fetched
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Extraction failed on a fetched granule
    #[error(transparent)]
    Matchup(#[from] matchup::MatchupError),

    /// A worker exceeded the per-granule deadline
    #[error("Matchup worker timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// A worker panicked or was aborted
    #[error("Matchup worker failed: {0}")]
    Worker(String),
}
