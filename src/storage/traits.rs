//! Storage traits and error types
//!
//! This module defines the trait interface for session store backends and
//! associated error types.

use crate::session::SessionStore;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed session store {path}: {message}")]
    Malformed { path: PathBuf, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Artist name '{0}' collides with a reserved store key")]
    ReservedName(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for session store backends
///
/// A run calls [`load`](SessionStorage::load) once before crawling and
/// [`save`](SessionStorage::save) once after the last gallery is processed.
/// Implementations never see partial state.
pub trait SessionStorage {
    /// Reads the full session store
    fn load(&self) -> StorageResult<SessionStore>;

    /// Replaces the persisted session store with `store`
    fn save(&mut self, store: &SessionStore) -> StorageResult<()>;

    /// Whether `name` can be stored as an artist by this backend
    fn accepts_artist_name(&self, name: &str) -> bool {
        let _ = name;
        true
    }
}

/// Volatile backend, used by tests and by callers embedding the crawler
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    store: SessionStore,
    saves: usize,
}

impl MemoryStorage {
    pub fn new(store: SessionStore) -> Self {
        Self { store, saves: 0 }
    }

    /// The last saved (or initial) store
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Number of times `save` has been called
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self) -> StorageResult<SessionStore> {
        Ok(self.store.clone())
    }

    fn save(&mut self, store: &SessionStore) -> StorageResult<()> {
        self.store = store.clone();
        self.saves += 1;
        Ok(())
    }
}
