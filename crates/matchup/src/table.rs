//! Matchup result rows and tables.

use chrono::Duration;

/// One matched pixel: the satellite side of a waypoint/pixel pair.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchupRecord {
    /// Id of the waypoint this pixel matched, from the caller's track
    pub waypoint_id: usize,
    /// Pixel latitude in degrees
    pub lat: f64,
    /// Pixel longitude in degrees
    pub lon: f64,
    /// Geodesic distance to the waypoint, meters, truncated toward zero
    pub distance_m: i64,
    /// Satellite time minus waypoint time
    pub time_offset: Duration,
    /// Data variable values, aligned with the table's variable names
    pub values: Vec<f64>,
}

/// All matchups found in one granule, ordered by waypoint then scan order.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchupTable {
    product_name: Option<String>,
    variables: Vec<String>,
    rows: Vec<MatchupRecord>,
}

impl MatchupTable {
    pub fn new(variables: Vec<String>) -> Self {
        Self {
            product_name: None,
            variables,
            rows: Vec::new(),
        }
    }

    pub fn with_product_name(mut self, product_name: Option<String>) -> Self {
        self.product_name = product_name;
        self
    }

    /// Append a row unless every data variable value is missing.
    ///
    /// A table with no data variables keeps no rows at all: there is nothing
    /// a matchup could contribute beyond coordinates.
    pub fn push(&mut self, record: MatchupRecord) {
        debug_assert_eq!(record.values.len(), self.variables.len());
        if record.values.iter().all(|v| v.is_nan()) {
            return;
        }
        self.rows.push(record);
    }

    pub fn product_name(&self) -> Option<&str> {
        self.product_name.as_deref()
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn rows(&self) -> &[MatchupRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
