//! Candidate granule search against the CMR catalog.
//!
//! Finds the granule names that could contain matchups for a track, without
//! ever missing one: temporal segmentation, per-waypoint circle queries and
//! client-side name filtering all widen rather than narrow beyond the stated
//! tolerances. Downstream extraction pays for the false positives.

pub mod bloom;
pub mod cmr;
pub mod criteria;
mod error;
pub mod filename;

pub use bloom::bloom_filter;
pub use cmr::{CatalogClient, Circle, CmrClient, CmrConfig};
pub use criteria::{search_criteria, DataType, SearchCriteria, Sensor};
pub use error::{SearchError, SearchResult};
pub use filename::GranuleName;
