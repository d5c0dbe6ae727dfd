//! Ocean-color granule naming convention.
//!
//! Granule names encode platform, date and processing mode, for example
//! `A2017012.L3m_DAY_CHL_chlor_a_4km.nc` or `V2018007000000.L2_SNPP_OC.nc`.
//! Parsing them gives enough structure to route a granule into the standard
//! `mission/mode/year/doy` directory layout without opening the file.

use std::path::PathBuf;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::{SearchError, SearchResult};

fn name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?x)
            ^
            (?P<platform>[SATV])
            (?P<year>\d{4})
            (?P<doy>\d{3})
            (?P<time>\d+)?
            \.
            (?P<mode>L2|L3m)
            (?:_DAY)?
            _(?P<instrument>SNPP|JPSS1)?
            .*?
            \.nc
            ",
        )
        .unwrap_or_else(|e| panic!("invalid granule name pattern: {e}"))
    })
}

/// The fields encoded in one granule name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GranuleName {
    filename: String,
    platform: char,
    year: i32,
    doy: u32,
    time: Option<String>,
    mode: String,
    instrument: Option<String>,
}

impl GranuleName {
    /// Parse a granule name, rejecting anything outside the convention.
    pub fn parse(filename: &str) -> SearchResult<Self> {
        let caps = name_regex()
            .captures(filename)
            .ok_or_else(|| SearchError::GranuleName(filename.to_string()))?;

        let field = |name: &str| {
            caps.name(name)
                .map(|m| m.as_str())
                .ok_or_else(|| SearchError::GranuleName(filename.to_string()))
        };

        let year: i32 = field("year")?
            .parse()
            .map_err(|_| SearchError::GranuleName(filename.to_string()))?;
        let doy: u32 = field("doy")?
            .parse()
            .map_err(|_| SearchError::GranuleName(filename.to_string()))?;
        // Reject impossible day-of-year values up front.
        if NaiveDate::from_yo_opt(year, doy).is_none() {
            return Err(SearchError::GranuleName(filename.to_string()));
        }

        Ok(Self {
            filename: filename.to_string(),
            platform: field("platform")?.chars().next().unwrap_or_default(),
            year,
            doy,
            time: caps.name("time").map(|m| m.as_str().to_string()),
            mode: field("mode")?.to_string(),
            instrument: caps.name("instrument").map(|m| m.as_str().to_string()),
        })
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Processing mode as named in the file, `L2` or `L3m`.
    pub fn mode(&self) -> &str {
        &self.mode
    }

    /// The calendar date encoded by the year/day-of-year fields.
    pub fn date(&self) -> NaiveDate {
        // Validated during parse.
        NaiveDate::from_yo_opt(self.year, self.doy).unwrap_or_default()
    }

    /// Mission name, when the platform letter (plus instrument for the V
    /// platforms) identifies one.
    pub fn mission(&self) -> Option<&'static str> {
        match self.platform {
            'S' => Some("SeaWIFS"),
            'A' => Some("MODIS-Aqua"),
            'T' => Some("MODIS-Terra"),
            'V' => match self.instrument.as_deref() {
                Some("SNPP") => Some("VIIRS-SNPP"),
                Some("JPSS1") => Some("VIIRS-JPSS1"),
                _ => None,
            },
            _ => None,
        }
    }

    /// Standard storage path, `mission/mode/year/doy/filename`.
    pub fn relative_path(&self) -> Option<PathBuf> {
        let mission = self.mission()?;
        Some(
            PathBuf::from(mission)
                .join(&self.mode)
                .join(self.year.to_string())
                .join(format!("{:03}", self.doy))
                .join(&self.filename),
        )
    }
}
