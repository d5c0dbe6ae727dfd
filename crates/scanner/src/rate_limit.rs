//! Request pacing against the granule archive.

use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

use crate::config::RateLimitConfig;

/// Serializes archive requests and enforces a minimum spacing between them.
///
/// The lock is held across the sleep, so concurrent callers queue up and
/// each gets its own full delay. The first caller passes through untouched.
pub struct RateLimiter {
    config: RateLimitConfig,
    last_request: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            last_request: Mutex::new(None),
        }
    }

    /// Wait until the next request is allowed to go out.
    pub async fn acquire(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(previous) = *last {
            let wait = self.config.min_delay
                + self.config.max_jitter.mul_f64(rand::random::<f64>());
            let elapsed = previous.elapsed();
            if elapsed < wait {
                sleep(wait - elapsed).await;
            }
        }

        *last = Some(Instant::now());
    }
}
