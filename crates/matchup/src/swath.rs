//! Matchup extraction for swath (L2) granules.

use chrono::Duration;
use matchup_common::Track;
use tracing::debug;

use crate::dataset::{Layout, SatelliteDataset};
use crate::error::{MatchupError, MatchupResult};
use crate::table::{MatchupRecord, MatchupTable};

/// Coarse meters-per-degree used for the latitude admission band.
/// 1 degree of latitude is ~111 km; 100 km over-admits on purpose.
const LAT_METERS_PER_DEG: f64 = 100e3;

/// All swath pixels within `dl_tol` meters and `dt_tol` of any track waypoint.
pub(crate) fn matchup_swath(
    track: &Track,
    ds: &SatelliteDataset,
    dl_tol: f64,
    dt_tol: Duration,
) -> MatchupResult<MatchupTable> {
    let Layout::Swath { lat, lon, time } = ds.layout() else {
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
    let subset = track.within_window(coverage.start, coverage.end, dt_tol);
    if subset.is_empty() {
        debug!("no waypoints inside the granule coverage window");
        return Ok(empty());
    }

    // Coarse admission bands around the waypoint subset. Latitude always
    // applies; longitude only when the corrected window stays clear of the
    // antimeridian, otherwise the per-pixel geodesic check is the sole
    // longitude authority.
    let deg_tol = dl_tol / LAT_METERS_PER_DEG;
    let (lat_lo, lat_hi) = (
        subset.lat_min().unwrap_or(0.0) - deg_tol,
        subset.lat_max().unwrap_or(0.0) + deg_tol,
    );
    let max_abs_lat = subset
        .iter()
        .map(|w| w.lat.abs())
        .fold(0.0_f64, f64::max);
    let lon_tol = deg_tol / max_abs_lat.to_radians().cos();
    let (lon_lo, lon_hi) = (
        subset.lon_min().unwrap_or(0.0) - lon_tol,
        subset.lon_max().unwrap_or(0.0) + lon_tol,
    );
    let apply_lon_band = lon_lo > -180.0 && lon_hi < 180.0;

    let (nrows, ncols) = lat.shape();
    let mut row_any = vec![false; nrows];
    let mut col_any = vec![false; ncols];
    for r in 0..nrows {
        for c in 0..ncols {
            let p_lat = lat.get(r, c);
            let in_band = p_lat >= lat_lo && p_lat <= lat_hi;
            let in_band = in_band
                && (!apply_lon_band || {
                    let p_lon = lon.get(r, c);
                    p_lon >= lon_lo && p_lon <= lon_hi
                });
            if in_band {
                row_any[r] = true;
                col_any[c] = true;
            }
        }
    }

    let Some(bounds) = bounding_box(&row_any, &col_any) else {
        debug!("no swath pixels inside the admission bands");
        return Ok(empty());
    };
    let (rows, cols) = bounds;

    let lat = lat.crop(rows, cols);
    let lon = lon.crop(rows, cols);
    let time = &time[rows.0..=rows.1];
    let variables: Vec<(String, crate::dataset::Grid2)> = variables
        .into_iter()
        .map(|(n, v)| (n.to_string(), v.crop(rows, cols)))
        .collect();

    let mut table = empty();
    for wp in subset.iter() {
        for (r, line_time) in time.iter().enumerate() {
            let dists = geodesic::distances(wp.lon, wp.lat, lon.row(r), lat.row(r));
            for (c, &d) in dists.iter().enumerate() {
                if d <= dl_tol {
                    table.push(MatchupRecord {
                        waypoint_id: wp.id,
                        lat: lat.get(r, c),
                        lon: lon.get(r, c),
                        distance_m: d.trunc() as i64,
                        time_offset: *line_time - wp.time,
                        values: variables.iter().map(|(_, v)| v.get(r, c)).collect(),
                    });
                }
            }
        }
    }

    debug!(rows = table.len(), "swath matchup complete");
    Ok(table)
}

/// Inclusive bounding box of admitted rows and columns, if any.
fn bounding_box(
    row_any: &[bool],
    col_any: &[bool],
) -> Option<((usize, usize), (usize, usize))> {
    let r0 = row_any.iter().position(|&b| b)?;
    let r1 = row_any.iter().rposition(|&b| b)?;
    let c0 = col_any.iter().position(|&b| b)?;
    let c1 = col_any.iter().rposition(|&b| b)?;
    Some(((r0, r1), (c0, c1)))
}
