//! Storage module for persisting the session store
//!
//! A run touches storage exactly twice: one load before crawling and one save
//! after every gallery has been processed. Nothing is written mid-run.

mod json;
mod traits;

pub use json::{JsonFileStorage, PENDING_URLS_KEY};
pub use traits::{MemoryStorage, SessionStorage, StorageError, StorageResult};

use crate::config::Config;

/// Opens the configured JSON session store
///
/// # Example
///
/// ```no_run
/// use artsweep::config::load_config;
/// use artsweep::storage::{open_storage, SessionStorage};
/// use std::path::Path;
///
/// let config = load_config(Path::new("artsweep.toml")).unwrap();
/// let store = open_storage(&config).load().unwrap();
/// println!("{} galleries pending", store.pending_gallery_urls.len());
/// ```
pub fn open_storage(config: &Config) -> JsonFileStorage {
    JsonFileStorage::new(&config.storage.session_path)
}
