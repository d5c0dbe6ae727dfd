//! Coverage-window time handling for satellite granule attributes.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimeParseError {
    #[error("Invalid coverage time: {0}")]
    InvalidFormat(String),
}

/// Parse a granule coverage attribute such as `2017-01-12T21:35:00.000Z`.
///
/// Granule attributes carry a trailing `Z` UTC marker which is stripped
/// before parsing; values without the marker are accepted too.
pub fn parse_coverage_time(attr: &str) -> Result<DateTime<Utc>, TimeParseError> {
    let s = attr.strip_suffix('Z').unwrap_or(attr);

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(ndt.and_utc());
        }
    }

    Err(TimeParseError::InvalidFormat(attr.to_string()))
}

/// The time span declared by one granule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl CoverageWindow {
    /// Parse the pair of coverage attributes carried by a granule.
    pub fn parse(start_attr: &str, end_attr: &str) -> Result<Self, TimeParseError> {
        Ok(Self {
            start: parse_coverage_time(start_attr)?,
            end: parse_coverage_time(end_attr)?,
        })
    }

    /// Midpoint of the window, the nominal time of a composite product.
    pub fn midpoint(&self) -> DateTime<Utc> {
        self.start + (self.end - self.start) / 2
    }

    /// Whether `t` falls inside the window widened by `dt_tol` on both ends.
    pub fn contains_with_tolerance(&self, t: DateTime<Utc>, dt_tol: Duration) -> bool {
        t >= self.start - dt_tol && t <= self.end + dt_tol
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_with_zulu_marker() {
        let dt = parse_coverage_time("2017-01-12T21:35:00.000Z").unwrap();
        assert_eq!(dt.year(), 2017);
        assert_eq!(dt.day(), 12);
        assert_eq!(dt.hour(), 21);
        assert_eq!(dt.minute(), 35);
    }

    #[test]
    fn test_parse_without_marker() {
        let dt = parse_coverage_time("2017-01-12T21:35:07").unwrap();
        assert_eq!(dt.second(), 7);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_coverage_time("not-a-time").is_err());
        assert!(parse_coverage_time("2017-01-12").is_err());
    }

    #[test]
    fn test_midpoint() {
        let w = CoverageWindow::parse("2017-01-12T00:00:00Z", "2017-01-13T00:00:00Z").unwrap();
        assert_eq!(w.midpoint(), parse_coverage_time("2017-01-12T12:00:00").unwrap());
    }

    #[test]
    fn test_contains_with_tolerance() {
        let w = CoverageWindow::parse("2017-01-12T00:00:00Z", "2017-01-12T23:59:59Z").unwrap();
        let before = parse_coverage_time("2017-01-11T19:00:00").unwrap();
        assert!(!w.contains_with_tolerance(before, Duration::hours(3)));
        assert!(w.contains_with_tolerance(before, Duration::hours(6)));
    }
}
