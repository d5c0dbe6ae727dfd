//! Waypoints and tracks: the in-situ side of a matchup.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A single space-time observation point.
///
/// The `id` is the position of the waypoint in the caller's original input
/// and is carried unchanged into every output row that matches it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub id: usize,
    pub time: DateTime<Utc>,
    /// Latitude in degrees, [-90, 90]
    pub lat: f64,
    /// Longitude in degrees, [-180, 180]
    pub lon: f64,
}

/// An ordered collection of waypoints.
///
/// Never mutated by the core; filtered subsets are derived copies that keep
/// the original waypoint ids.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
    waypoints: Vec<Waypoint>,
}

impl Track {
    /// Build a track from (time, lat, lon) triples, assigning sequential ids.
    pub fn from_points(points: impl IntoIterator<Item = (DateTime<Utc>, f64, f64)>) -> Self {
        let waypoints = points
            .into_iter()
            .enumerate()
            .map(|(id, (time, lat, lon))| Waypoint { id, time, lat, lon })
            .collect();
        Self { waypoints }
    }

    /// Build a track from waypoints that already carry their ids.
    pub fn from_waypoints(waypoints: Vec<Waypoint>) -> Self {
        Self { waypoints }
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Waypoint> {
        self.waypoints.iter()
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn time_min(&self) -> Option<DateTime<Utc>> {
        self.waypoints.iter().map(|w| w.time).min()
    }

    pub fn time_max(&self) -> Option<DateTime<Utc>> {
        self.waypoints.iter().map(|w| w.time).max()
    }

    pub fn lat_min(&self) -> Option<f64> {
        self.waypoints.iter().map(|w| w.lat).reduce(f64::min)
    }

    pub fn lat_max(&self) -> Option<f64> {
        self.waypoints.iter().map(|w| w.lat).reduce(f64::max)
    }

    pub fn lon_min(&self) -> Option<f64> {
        self.waypoints.iter().map(|w| w.lon).reduce(f64::min)
    }

    pub fn lon_max(&self) -> Option<f64> {
        self.waypoints.iter().map(|w| w.lon).reduce(f64::max)
    }

    /// Copy of this track sorted by waypoint time (ids preserved).
    pub fn sorted_by_time(&self) -> Track {
        let mut waypoints = self.waypoints.clone();
        waypoints.sort_by_key(|w| w.time);
        Track { waypoints }
    }

    /// Subset of waypoints whose time falls inside `[start - dt_tol, end + dt_tol]`.
    pub fn within_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        dt_tol: Duration,
    ) -> Track {
        let waypoints = self
            .waypoints
            .iter()
            .filter(|w| w.time >= start - dt_tol && w.time <= end + dt_tol)
            .copied()
            .collect();
        Track { waypoints }
    }
}

impl<'a> IntoIterator for &'a Track {
    type Item = &'a Waypoint;
    type IntoIter = std::slice::Iter<'a, Waypoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.waypoints.iter()
    }
}
