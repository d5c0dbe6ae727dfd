//! Configuration for the scan pipeline.

use std::time::Duration;

/// Configuration for a scan.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Number of concurrent extraction workers
    pub npes: usize,
    /// Deadline for a single granule extraction
    pub matchup_timeout: Duration,
    /// Pacing of granule fetches against the remote archive
    pub rate_limit: RateLimitConfig,
}

impl ScanConfig {
    /// Capacity of the result queue, sized so a slow consumer stalls the
    /// scan instead of letting extracted tables pile up in memory.
    pub fn queue_capacity(&self) -> usize {
        3 * self.npes.max(1)
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            npes: 3,
            matchup_timeout: Duration::from_secs(900), // 15 minutes
            rate_limit: RateLimitConfig::default(),
        }
    }
}

/// Pacing for requests against the granule archive.
///
/// Each fetch waits at least `min_delay` after the previous one, plus a
/// uniform random share of `max_jitter` so that parallel scans do not fall
/// into lockstep.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub min_delay: Duration,
    pub max_jitter: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_secs(4),
            max_jitter: Duration::from_secs(4),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_capacity_tracks_worker_count() {
        assert_eq!(ScanConfig::default().queue_capacity(), 9);

        let config = ScanConfig {
            npes: 5,
            ..Default::default()
        };
        assert_eq!(config.queue_capacity(), 15);
    }

    #[test]
    fn test_queue_capacity_never_zero() {
        let config = ScanConfig {
            npes: 0,
            ..Default::default()
        };
        assert!(config.queue_capacity() > 0);
    }
}
