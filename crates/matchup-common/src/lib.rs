//! Common types shared across the ocean-matchup workspace.

pub mod time;
pub mod track;

pub use time::{parse_coverage_time, CoverageWindow, TimeParseError};
pub use track::{Track, Waypoint};
