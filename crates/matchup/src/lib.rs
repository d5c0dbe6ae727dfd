//! Pixel-level matchup extraction between a track and a satellite granule.
//!
//! Given one loaded [`SatelliteDataset`] and a [`Track`] of waypoints, find
//! every pixel within a distance tolerance (meters) and a time tolerance of
//! any waypoint. Swath (L2) and gridded (L3 mapped) layouts are handled by
//! separate procedures since their coordinates are structured differently;
//! [`matchup`] dispatches on the layout tag.
//!
//! Zero matches is a normal outcome and yields an empty table, never an
//! error.

pub mod dataset;
pub mod error;
mod gridded;
mod swath;
pub mod table;

pub use dataset::{Grid2, Layout, ProcessingLevel, SatelliteDataset};
pub use error::{MatchupError, MatchupResult};
pub use table::{MatchupRecord, MatchupTable};

use chrono::Duration;
use matchup_common::Track;
use tracing::debug;

/// All pixels of `ds` within `dl_tol` meters and `dt_tol` of any waypoint.
///
/// Distance comparison uses the full float geodesic distance; the stored
/// `distance_m` is truncated to whole meters afterwards.
pub fn matchup(
    track: &Track,
    ds: &SatelliteDataset,
    dl_tol: f64,
    dt_tol: Duration,
) -> MatchupResult<MatchupTable> {
    match ds.layout() {
        Layout::Swath { .. } => {
            debug!(product = ?ds.product_name(), "swath layout, using swath matchup");
            swath::matchup_swath(track, ds, dl_tol, dt_tol)
        }
        Layout::Gridded { .. } => {
            debug!(product = ?ds.product_name(), "gridded layout, using gridded matchup");
            gridded::matchup_gridded(track, ds, dl_tol, dt_tol)
        }
    }
}
