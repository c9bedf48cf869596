//! Crawler module for throttled fetching and run coordination
//!
//! This module contains the core harvesting logic, including:
//! - Request throttling (one request start per interval, process-wide)
//! - HTTP fetching with outcome classification
//! - Overall run coordination over the pending gallery list

mod coordinator;
mod fetcher;
mod throttle;

pub use coordinator::{run_crawl, Coordinator};
pub use fetcher::{build_http_client, classify_status, FetchOutcome, Fetcher, Page, StatusClass};
pub use throttle::Throttle;
