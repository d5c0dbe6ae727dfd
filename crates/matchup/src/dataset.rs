//! In-memory model of one loaded satellite granule.
//!
//! The dataset parsing itself (NetCDF groups, scan-line time decoding) is an
//! external collaborator; this module only defines the structure the matchup
//! engine consumes: coverage attributes, spatial coordinates in one of two
//! layouts, and named 2-D data variables sharing the spatial dimensions.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use matchup_common::CoverageWindow;

use crate::error::{MatchupError, MatchupResult};

/// Dense row-major 2-D array of f64 values.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid2 {
    nrows: usize,
    ncols: usize,
    values: Vec<f64>,
}

impl Grid2 {
    pub fn new(nrows: usize, ncols: usize, values: Vec<f64>) -> MatchupResult<Self> {
        if values.len() != nrows * ncols {
            return Err(MatchupError::Shape(format!(
                "expected {} values for a {}x{} grid, got {}",
                nrows * ncols,
                nrows,
                ncols,
                values.len()
            )));
        }
        Ok(Self {
            nrows,
            ncols,
            values,
        })
    }

    /// Build from a closure over (row, col).
    pub fn from_fn(nrows: usize, ncols: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut values = Vec::with_capacity(nrows * ncols);
        for r in 0..nrows {
            for c in 0..ncols {
                values.push(f(r, c));
            }
        }
        Self {
            nrows,
            ncols,
            values,
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.ncols + col]
    }

    /// One full row as a slice.
    pub fn row(&self, row: usize) -> &[f64] {
        &self.values[row * self.ncols..(row + 1) * self.ncols]
    }

    pub fn min(&self) -> Option<f64> {
        self.values.iter().copied().filter(|v| !v.is_nan()).reduce(f64::min)
    }

    pub fn max(&self) -> Option<f64> {
        self.values.iter().copied().filter(|v| !v.is_nan()).reduce(f64::max)
    }

    /// Copy of the sub-grid covering `rows` x `cols` (inclusive bounds).
    pub fn crop(&self, rows: (usize, usize), cols: (usize, usize)) -> Grid2 {
        let (r0, r1) = rows;
        let (c0, c1) = cols;
        Grid2::from_fn(r1 - r0 + 1, c1 - c0 + 1, |r, c| self.get(r0 + r, c0 + c))
    }
}

/// Processing level declared by a granule.
///
/// Only the two layouts the matchup engine understands are representable;
/// anything else is rejected at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingLevel {
    /// L2: per-orbit swath, per-pixel coordinates
    Swath,
    /// L3 mapped: regular lat/lon grid composite
    Gridded,
}

impl ProcessingLevel {
    /// Parse the `processing_level` dataset attribute.
    pub fn from_attr(attr: &str) -> MatchupResult<Self> {
        match attr {
            "L2" => Ok(ProcessingLevel::Swath),
            "L3 Mapped" => Ok(ProcessingLevel::Gridded),
            other => Err(MatchupError::UnsupportedLevel(other.to_string())),
        }
    }

    pub fn as_attr(&self) -> &'static str {
        match self {
            ProcessingLevel::Swath => "L2",
            ProcessingLevel::Gridded => "L3 Mapped",
        }
    }
}

/// Spatial layout of a granule, tagged by processing level.
#[derive(Debug, Clone, PartialEq)]
pub enum Layout {
    /// Per-pixel 2-D coordinates indexed by (scan line, pixel in line),
    /// with one timestamp per scan line.
    Swath {
        lat: Grid2,
        lon: Grid2,
        time: Vec<DateTime<Utc>>,
    },
    /// 1-D coordinate axes; variables indexed by (lat, lon).
    Gridded { lat: Vec<f64>, lon: Vec<f64> },
}

impl Layout {
    pub fn level(&self) -> ProcessingLevel {
        match self {
            Layout::Swath { .. } => ProcessingLevel::Swath,
            Layout::Gridded { .. } => ProcessingLevel::Gridded,
        }
    }

    /// Shape a data variable must have to share the spatial dimensions.
    pub fn spatial_shape(&self) -> (usize, usize) {
        match self {
            Layout::Swath { lat, .. } => lat.shape(),
            Layout::Gridded { lat, lon } => (lat.len(), lon.len()),
        }
    }
}

/// One loaded granule, read-only input to the matchup engine.
#[derive(Debug, Clone, PartialEq)]
pub struct SatelliteDataset {
    product_name: Option<String>,
    time_coverage_start: String,
    time_coverage_end: String,
    layout: Layout,
    variables: BTreeMap<String, Grid2>,
}

impl SatelliteDataset {
    /// Build a dataset, validating internal shape agreement.
    pub fn new(
        product_name: Option<String>,
        time_coverage_start: impl Into<String>,
        time_coverage_end: impl Into<String>,
        layout: Layout,
    ) -> MatchupResult<Self> {
        if let Layout::Swath { lat, lon, time } = &layout {
            if lat.shape() != lon.shape() {
                return Err(MatchupError::Shape(format!(
                    "swath lat {:?} and lon {:?} shapes differ",
                    lat.shape(),
                    lon.shape()
                )));
            }
            if time.len() != lat.nrows() {
                return Err(MatchupError::Shape(format!(
                    "swath has {} scan lines but {} line timestamps",
                    lat.nrows(),
                    time.len()
                )));
            }
        }
        Ok(Self {
            product_name,
            time_coverage_start: time_coverage_start.into(),
            time_coverage_end: time_coverage_end.into(),
            layout,
            variables: BTreeMap::new(),
        })
    }

    /// Attach a named data variable. Variables whose shape does not match
    /// the spatial dimensions are kept but ignored by extraction.
    pub fn insert_variable(&mut self, name: impl Into<String>, data: Grid2) {
        self.variables.insert(name.into(), data);
    }

    pub fn product_name(&self) -> Option<&str> {
        self.product_name.as_deref()
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn processing_level(&self) -> ProcessingLevel {
        self.layout.level()
    }

    /// Parse the declared coverage window from the granule attributes.
    pub fn coverage(&self) -> MatchupResult<CoverageWindow> {
        Ok(CoverageWindow::parse(
            &self.time_coverage_start,
            &self.time_coverage_end,
        )?)
    }

    /// Data variables sharing exactly the spatial dimensions, in name order.
    pub fn spatial_variables(&self) -> Vec<(&str, &Grid2)> {
        let shape = self.layout.spatial_shape();
        self.variables
            .iter()
            .filter(|(_, v)| v.shape() == shape)
            .map(|(k, v)| (k.as_str(), v))
            .collect()
    }
}
