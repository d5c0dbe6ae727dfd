//! Static mapping from sensor/data-type to catalog collections.

use crate::error::{SearchError, SearchResult};

/// Ocean-color sensors this engine can search for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sensor {
    Seawifs,
    Aqua,
    Terra,
    Snpp,
}

impl Sensor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sensor::Seawifs => "seawifs",
            Sensor::Aqua => "aqua",
            Sensor::Terra => "terra",
            Sensor::Snpp => "snpp",
        }
    }
}

/// Processing level requested from the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Swath products
    L2,
    /// Mapped composites
    L3m,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::L2 => "L2",
            DataType::L3m => "L3m",
        }
    }
}

/// One catalog collection to query, plus an optional client-side name filter.
///
/// L3m collections mix daily, 8-day and monthly composites at several
/// resolutions under one short name; the pattern narrows those down to the
/// single product of interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchCriteria {
    pub short_name: &'static str,
    pub provider: &'static str,
    pub pattern: Option<&'static str>,
}

/// Resolve the catalog collection for a sensor/data-type pair.
///
/// Unsupported combinations are a configuration error, surfaced immediately.
pub fn search_criteria(sensor: Sensor, dtype: DataType) -> SearchResult<SearchCriteria> {
    let criteria = match (sensor, dtype) {
        (Sensor::Seawifs, DataType::L2) => SearchCriteria {
            short_name: "SEAWIFS_L2_OC",
            provider: "OB_DAAC",
            pattern: None,
        },
        (Sensor::Aqua, DataType::L2) => SearchCriteria {
            short_name: "MODISA_L2_OC",
            provider: "OB_DAAC",
            pattern: None,
        },
        (Sensor::Aqua, DataType::L3m) => SearchCriteria {
            short_name: "MODISA_L3m_CHL",
            provider: "OB_DAAC",
            pattern: Some("DAY_CHL_chlor_a_4km"),
        },
        (Sensor::Terra, DataType::L2) => SearchCriteria {
            short_name: "MODIST_L2_OC",
            provider: "OB_DAAC",
            pattern: None,
        },
        (Sensor::Terra, DataType::L3m) => SearchCriteria {
            short_name: "MODIST_L3m_CHL",
            provider: "OB_DAAC",
            pattern: Some("DAY_CHL_chlor_a_4km"),
        },
        (Sensor::Snpp, DataType::L2) => SearchCriteria {
            short_name: "VIIRSN_L2_OC",
            provider: "OB_DAAC",
            pattern: None,
        },
        (sensor, dtype) => return Err(SearchError::UnsupportedCriteria { sensor, dtype }),
    };
    Ok(criteria)
}
