//! Matchup extraction for gridded (L3 mapped) granules.

use chrono::Duration;
use matchup_common::Track;
use tracing::debug;

use crate::dataset::{Layout, SatelliteDataset};
use crate::error::{MatchupError, MatchupResult};
use crate::table::{MatchupRecord, MatchupTable};

/// Meters-per-degree used for the latitude crop, slightly loose.
const LAT_METERS_PER_DEG: f64 = 110e3;

/// All grid cells within `dl_tol` meters and `dt_tol` of any track waypoint.
///
/// A composite shares one coverage window; every matched cell gets the same
/// time offset, measured against the window midpoint.
pub(crate) fn matchup_gridded(
    track: &Track,
    ds: &SatelliteDataset,
    dl_tol: f64,
    dt_tol: Duration,
) -> MatchupResult<MatchupTable> {
    let Layout::Gridded { lat, lon } = ds.layout() else {
        return Err(MatchupError::UnsupportedLevel(
            ds.processing_level().as_attr().to_string(),
        ));
    };

    let variables = ds.spatial_variables();
    let names: Vec<String> = variables.iter().map(|(n, _)| n.to_string()).collect();
    let empty = || {
        MatchupTable::new(names.clone()).with_product_name(ds.product_name().map(String::from))
    };

    let coverage = ds.coverage()?;
    let time_reference = coverage.midpoint();
    let subset = track.within_window(coverage.start, coverage.end, dt_tol);
    if subset.is_empty() {
        debug!("no waypoints inside the granule coverage window");
        return Ok(empty());
    }

    // Latitude crop only; the full longitude range is scanned.
    let deg_tol = dl_tol / LAT_METERS_PER_DEG;
    let (lat_lo, lat_hi) = (
        subset.lat_min().unwrap_or(0.0) - deg_tol,
        subset.lat_max().unwrap_or(0.0) + deg_tol,
    );
    let lat_idx: Vec<usize> = lat
        .iter()
        .enumerate()
        .filter(|(_, &v)| v >= lat_lo && v <= lat_hi)
        .map(|(i, _)| i)
        .collect();
    if lat_idx.is_empty() {
        debug!("no grid rows inside the latitude band");
        return Ok(empty());
    }

    let mut table = empty();
    for wp in subset.iter() {
        let time_offset = time_reference - wp.time;
        for &li in &lat_idx {
            let row_lats = vec![lat[li]; lon.len()];
            let dists = geodesic::distances(wp.lon, wp.lat, lon, &row_lats);
            for (j, &d) in dists.iter().enumerate() {
                if d <= dl_tol {
                    table.push(MatchupRecord {
                        waypoint_id: wp.id,
                        lat: lat[li],
                        lon: lon[j],
                        distance_m: d.trunc() as i64,
                        time_offset,
                        values: variables.iter().map(|(_, v)| v.get(li, j)).collect(),
                    });
                }
            }
        }
    }

    debug!(rows = table.len(), "gridded matchup complete");
    Ok(table)
}
