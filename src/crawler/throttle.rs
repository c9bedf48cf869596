//! Request throttling
//!
//! The harvester talks to a single site and keeps at most one request in
//! flight. [`Throttle`] enforces a minimum interval between the *start* of
//! consecutive requests, across every gallery and artwork fetch of the
//! process. It is owned by the [`Fetcher`](crate::crawler::Fetcher), so tests
//! can hand it an unthrottled instance.

use crate::config::ScraperConfig;
use std::time::{Duration, Instant};

/// Minimum-interval limiter for outbound requests
#[derive(Debug, Clone)]
pub struct Throttle {
    /// Minimum time between request starts
    interval: Duration,

    /// When the previous request started
    last_request_time: Option<Instant>,
}

impl Throttle {
    /// Creates a throttle with the given minimum interval
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_request_time: None,
        }
    }

    /// Creates a throttle from the scraper configuration
    pub fn from_config(config: &ScraperConfig) -> Self {
        Self::new(Duration::from_millis(config.request_interval_ms))
    }

    /// A throttle that never waits
    pub fn unthrottled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Time left before the next request may start, if any
    pub fn time_until_next_request(&self, now: Instant) -> Option<Duration> {
        let last = self.last_request_time?;
        let elapsed = now.saturating_duration_since(last);
        if elapsed < self.interval {
            Some(self.interval - elapsed)
        } else {
            None
        }
    }

    /// Records that a request started at `now`
    pub fn record_request(&mut self, now: Instant) {
        self.last_request_time = Some(now);
    }

    /// Sleeps until a request may start, then records its start
    pub async fn wait(&mut self) {
        if let Some(remaining) = self.time_until_next_request(Instant::now()) {
            tracing::debug!("Throttling for {:?} before next request", remaining);
            tokio::time::sleep(remaining).await;
        }
        self.record_request(Instant::now());
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::from_config(&ScraperConfig::default())
    }
}
