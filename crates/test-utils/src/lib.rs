//! Shared test utilities for the ocean-matchup workspace.
//!
//! Provides synthetic satellite dataset fixtures with hand-checked matchup
//! counts, track builders, and a test logging helper.

pub mod fixtures;

pub use fixtures::*;

use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize tracing for tests, honoring `RUST_LOG`. Safe to call from
/// every test; only the first call installs the subscriber.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
