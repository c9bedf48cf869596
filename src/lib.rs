//! Artsweep: an incremental artist gallery harvester
//!
//! This crate walks a list of artist gallery pages, discovers the artwork pages
//! each gallery links to, filters them by content rating, and records direct
//! image links in a persisted session store so repeated runs only do new work.

pub mod config;
pub mod crawler;
pub mod page;
pub mod report;
pub mod session;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for a harvest run
///
/// Anything surfacing as a `SweepError` aborts the run before the session
/// store is persisted.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Page error for {url}: {source}")]
    Page { url: String, source: page::PageError },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Missing scheme in URL: {0}")]
    MissingScheme(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),
}

/// Result type alias for harvest operations
pub type Result<T> = std::result::Result<T, SweepError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_crawl, Coordinator, FetchOutcome};
pub use report::{ReportLine, RunReport};
pub use session::{ArtistRecord, SessionStore};
