//! Coarse candidate narrowing against the granule catalog.
//!
//! This stage is a bloom filter in spirit: it must never miss a granule that
//! could contain a matchup, while false positives only cost the pipeline a
//! wasted download. Precision comes later from the extraction stage.

use std::collections::HashSet;

use chrono::Duration;
use matchup_common::Waypoint;
use tracing::{debug, info, instrument};

use crate::cmr::{CatalogClient, Circle};
use crate::criteria::{search_criteria, DataType, Sensor};
use crate::error::SearchResult;

/// Candidate granule names that could hold matchups for `track`.
///
/// The track is split into segments wherever consecutive waypoints are more
/// than `2 * dt_tol` apart, so sparse tracks do not turn into one huge
/// temporal window. Each waypoint then becomes a circle query of radius
/// `dl_tol` over the segment's window widened by `dt_tol` on both ends.
///
/// Names are deduplicated per sensor and returned in discovery order.
#[instrument(skip(track, catalog), fields(waypoints = track.len()))]
pub async fn bloom_filter(
    track: &matchup_common::Track,
    sensors: &[Sensor],
    dtype: DataType,
    dl_tol: f64,
    dt_tol: Duration,
    catalog: &dyn CatalogClient,
) -> SearchResult<Vec<String>> {
    let mut candidates = Vec::new();
    if track.is_empty() {
        return Ok(candidates);
    }

    let track = track.sorted_by_time();
    let segments = split_segments(track.waypoints(), dt_tol);
    debug!(segments = segments.len(), "Split track into temporal segments");

    for sensor in sensors {
        let criteria = search_criteria(*sensor, dtype)?;
        let mut seen: HashSet<String> = HashSet::new();
        let mut sensor_candidates = Vec::new();

        for segment in &segments {
            // Bounds exist, segments are never empty.
            let start = segment.iter().map(|w| w.time).min().unwrap_or_default() - dt_tol;
            let end = segment.iter().map(|w| w.time).max().unwrap_or_default() + dt_tol;

            for wp in segment.iter() {
                let circle = Circle {
                    lon: wp.lon,
                    lat: wp.lat,
                    radius_m: dl_tol,
                };
                let names = catalog
                    .granules(criteria.short_name, criteria.provider, start, end, circle)
                    .await?;

                for name in names {
                    if let Some(pattern) = criteria.pattern {
                        if !name.contains(pattern) {
                            continue;
                        }
                    }
                    if seen.insert(name.clone()) {
                        sensor_candidates.push(name);
                    }
                }
            }
        }

        info!(
            sensor = sensor.as_str(),
            candidates = sensor_candidates.len(),
            "Finished catalog narrowing for sensor"
        );
        candidates.extend(sensor_candidates);
    }

    Ok(candidates)
}

/// Split a time-sorted waypoint run at every gap larger than `2 * dt_tol`.
///
/// Splitting is recursive at the widest gap first, expressed as an explicit
/// stack; pushing the later half before the earlier one keeps the output in
/// chronological order.
fn split_segments(waypoints: &[Waypoint], dt_tol: Duration) -> Vec<&[Waypoint]> {
    let mut segments = Vec::new();
    if waypoints.is_empty() {
        return segments;
    }

    let mut stack = vec![waypoints];
    while let Some(run) = stack.pop() {
        match widest_gap(run) {
            Some((idx, gap)) if gap > dt_tol * 2 => {
                let (head, tail) = run.split_at(idx + 1);
                stack.push(tail);
                stack.push(head);
            }
            _ => segments.push(run),
        }
    }
    segments
}

/// Index and width of the largest gap between consecutive waypoints.
fn widest_gap(run: &[Waypoint]) -> Option<(usize, Duration)> {
    run.windows(2)
        .enumerate()
        .map(|(i, w)| (i, w[1].time - w[0].time))
        .max_by_key(|(_, gap)| *gap)
}
