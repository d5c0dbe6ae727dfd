//! Synthetic granule fixtures with hand-checked geometry.
//!
//! Distances quoted in the comments use ~110.9 km per degree of latitude and
//! ~92.3 km (at 34N) / ~55.8 km (at 60N) per degree of longitude; the
//! geodesic distances differ from these by a few meters at most, and every
//! fixture keeps a margin of several hundred meters around its tolerance.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use matchup::{Grid2, Layout, SatelliteDataset};
use matchup_common::Track;

/// Parse `YYYY-mm-dd HH:MM:SS` as UTC.
pub fn utc(s: &str) -> DateTime<Utc> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .unwrap_or_else(|_| panic!("bad fixture time: {s}"))
        .and_utc()
}

/// A track with one waypoint, id 0.
pub fn single_waypoint_track(time: &str, lat: f64, lon: f64) -> Track {
    Track::from_points([(utc(time), lat, lon)])
}

/// Daily chlorophyll composite around (34N, 126W).
///
/// For a waypoint at (34, -126) and dL_tol = 12 km, exactly 7 cells match:
/// the center cell, the four cells one lat step (0.05 deg, ~5.5 km) and two
/// lat steps (~11.1 km) away along the meridian, and the two cells one lon
/// step (0.12 deg, ~11.1 km) away along the parallel. The diagonal
/// neighbors sit at ~12.4 km and the remaining cells farther out.
pub fn gridded_chl_dataset() -> SatelliteDataset {
    // Descending latitude axis, as mapped products ship it.
    let lat: Vec<f64> = vec![34.15, 34.10, 34.05, 34.00, 33.95, 33.90, 33.85];
    let lon: Vec<f64> = vec![-126.24, -126.12, -126.00, -125.88, -125.76];

    let mut ds = SatelliteDataset::new(
        Some("A2017012.L3m_DAY_CHL_chlor_a_4km.nc".to_string()),
        "2017-01-12T00:00:00.000Z",
        "2017-01-12T23:59:59.000Z",
        Layout::Gridded {
            lat: lat.clone(),
            lon: lon.clone(),
        },
    )
    .expect("valid gridded fixture");

    let chlor_a = Grid2::from_fn(lat.len(), lon.len(), |r, c| {
        if (r, c) == (0, 4) {
            // One cloud-masked cell, outside the 12 km radius
            f64::NAN
        } else {
            0.1 + 0.01 * (r * lon.len() + c) as f64
        }
    });
    ds.insert_variable("chlor_a", chlor_a);
    ds
}

/// Small L2 swath around (34N, 126W), four scan lines of five pixels.
///
/// For a waypoint at (34, -126) and dL_tol = 12 km, 18 pixels lie within
/// tolerance; the chlor_a value at the swath center (line at 34.00, pixel
/// at -126.00) is NaN, so a matchup against the single `chlor_a` variable
/// yields 17 rows.
pub fn swath_oc_dataset() -> SatelliteDataset {
    let line_lats = [33.92, 33.96, 34.00, 34.04];
    let pixel_lons = [-126.10, -126.05, -126.00, -125.95, -125.90];

    let lat = Grid2::from_fn(line_lats.len(), pixel_lons.len(), |r, _| line_lats[r]);
    let lon = Grid2::from_fn(line_lats.len(), pixel_lons.len(), |_, c| pixel_lons[c]);
    let t0 = utc("2017-01-12 21:35:00");
    let time: Vec<DateTime<Utc>> = (0..line_lats.len())
        .map(|r| t0 + Duration::seconds(r as i64))
        .collect();

    let mut ds = SatelliteDataset::new(
        Some("A2017012213500.L2_LAC_OC.nc".to_string()),
        "2017-01-12T21:35:00.000Z",
        "2017-01-12T21:40:00.000Z",
        Layout::Swath { lat, lon, time },
    )
    .expect("valid swath fixture");

    let chlor_a = Grid2::from_fn(line_lats.len(), pixel_lons.len(), |r, c| {
        if (r, c) == (2, 2) {
            f64::NAN
        } else {
            0.05 * (r + 1) as f64 + 0.01 * c as f64
        }
    });
    ds.insert_variable("chlor_a", chlor_a);
    ds
}

/// L2 swath straddling the antimeridian at 60N, three lines of six pixels.
///
/// Pixel longitudes run 179.86E through 179.86W. For a waypoint at
/// lon 179.99 or -179.99 (lat 60) and dL_tol = 6 km, the four central
/// columns match on every line (12 rows), spanning both longitude sign
/// conventions; the outermost columns sit ~7.3 km and ~8.4 km away.
pub fn swath_dayline_dataset() -> SatelliteDataset {
    let line_lats = [59.99, 60.00, 60.01];
    let pixel_lons = [179.86, 179.92, 179.97, -179.97, -179.92, -179.86];

    let lat = Grid2::from_fn(line_lats.len(), pixel_lons.len(), |r, _| line_lats[r]);
    let lon = Grid2::from_fn(line_lats.len(), pixel_lons.len(), |_, c| pixel_lons[c]);
    let t0 = utc("2017-01-13 00:24:00");
    let time: Vec<DateTime<Utc>> = (0..line_lats.len())
        .map(|r| t0 + Duration::seconds(r as i64))
        .collect();

    let mut ds = SatelliteDataset::new(
        Some("V2017013002400.L2_SNPP_OC.nc".to_string()),
        "2017-01-13T00:24:00.000Z",
        "2017-01-13T00:29:00.000Z",
        Layout::Swath { lat, lon, time },
    )
    .expect("valid dayline fixture");

    let chlor_a = Grid2::from_fn(line_lats.len(), pixel_lons.len(), |r, c| {
        0.2 + 0.01 * (r * pixel_lons.len() + c) as f64
    });
    ds.insert_variable("chlor_a", chlor_a);
    ds
}
