//! Concurrent scan pipeline tying catalog search, granule fetching, and
//! matchup extraction together.
//!
//! The consumer-facing surface is [`InRange`]: configure it with a catalog
//! client and a dataset provider, call [`InRange::search`], and pull tables
//! from the returned [`ScanHandle`] as they are produced.

pub mod config;
pub mod error;
pub mod provider;
pub mod rate_limit;
mod scan;

pub use config::{RateLimitConfig, ScanConfig};
pub use error::{ScanError, ScanResult};
pub use provider::{DatasetProvider, ProviderError};
pub use rate_limit::RateLimiter;
pub use scan::{InRange, ScanHandle};
