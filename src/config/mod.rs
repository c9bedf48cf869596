//! Configuration module for Artsweep
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use artsweep::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("artsweep.toml")).unwrap();
//! println!("Session store: {}", config.storage.session_path);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, RatingConfig, ScraperConfig, StorageConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
