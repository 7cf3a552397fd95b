//! Client-side request pacing.

use std::time::Duration;
use tokio::time::Instant;

/// Enforces a minimum spacing between the starts of consecutive requests.
///
/// The wait is measured from when a file's processing began, so a slow call
/// eats into the interval and a call slower than the interval adds no wait.
#[derive(Debug, Clone, Copy)]
pub struct Throttle {
    min_interval: Duration,
}

impl Throttle {
    pub fn new(min_interval: Duration) -> Self {
        Self { min_interval }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Time still to wait after `elapsed` has passed; never negative.
    pub fn remaining(&self, elapsed: Duration) -> Duration {
        self.min_interval.saturating_sub(elapsed)
    }

    /// Sleep until `min_interval` has passed since `started`.
    pub async fn pace(&self, started: Instant) {
        let wait = self.remaining(started.elapsed());
        if !wait.is_zero() {
            tracing::debug!("Throttling for {:.2}s", wait.as_secs_f64());
            tokio::time::sleep(wait).await;
        }
    }
}
