//! Error types for matchup extraction.

use matchup_common::TimeParseError;
use thiserror::Error;

/// Result type alias using MatchupError.
pub type MatchupResult<T> = Result<T, MatchupError>;

/// Errors raised while building datasets or extracting matchups.
#[derive(Debug, Error)]
pub enum MatchupError {
    /// Dataset declares a processing level this engine does not handle
    #[error("Unsupported processing level: {0}")]
    UnsupportedLevel(String),

    /// Coverage attributes could not be parsed
    #[error("Invalid coverage attribute: {0}")]
    Coverage(#[from] TimeParseError),

    /// Coordinate/variable arrays disagree on shape
    #[error("Dimension mismatch: {0}")]
    Shape(String),
}
