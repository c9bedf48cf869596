//! JSON file backend
//!
//! The on-disk layout is shared with the chat front end, which reads it
//! directly:
//!
//! ```json
//! {
//!     "Alice": {
//!         "deep_links": ["https://img.example.com/a.png"],
//!         "to_links": ["alice.example.com/art/view/1"]
//!     },
//!     "artist_urls": ["https://alice.example.com/art"]
//! }
//! ```
//!
//! Keys are sorted and indented by four spaces so the file diffs cleanly.

use crate::session::{ArtistRecord, SessionStore};
use crate::storage::traits::{SessionStorage, StorageError, StorageResult};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Top-level key holding the pending gallery list
pub const PENDING_URLS_KEY: &str = "artist_urls";

/// Session store persisted as a single JSON document
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn malformed(&self, message: impl Into<String>) -> StorageError {
        StorageError::Malformed {
            path: self.path.clone(),
            message: message.into(),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SessionStorage for JsonFileStorage {
    fn load(&self) -> StorageResult<SessionStore> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    "Session store {} does not exist yet, starting empty",
                    self.path.display()
                );
                return Ok(SessionStore::new());
            }
            Err(e) => return Err(self.io_error(e)),
        };

        let value: Value =
            serde_json::from_str(&content).map_err(|e| self.malformed(e.to_string()))?;
        let store = decode_store(value).map_err(|message| self.malformed(message))?;

        tracing::debug!(
            "Loaded session store: {} pending URLs, {} artists",
            store.pending_gallery_urls.len(),
            store.artists.len()
        );

        Ok(store)
    }

    fn save(&mut self, store: &SessionStore) -> StorageResult<()> {
        let encoded = encode_store(store)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }

        // Write beside the target and rename over it so a crash mid-write
        // leaves the previously committed store intact.
        let temp = self.temp_path();
        std::fs::write(&temp, encoded).map_err(|e| self.io_error(e))?;
        std::fs::rename(&temp, &self.path).map_err(|e| self.io_error(e))?;

        tracing::debug!("Saved session store to {}", self.path.display());
        Ok(())
    }

    fn accepts_artist_name(&self, name: &str) -> bool {
        name != PENDING_URLS_KEY
    }
}

/// Builds a [`SessionStore`] from the parsed JSON document
fn decode_store(value: Value) -> Result<SessionStore, String> {
    let Value::Object(map) = value else {
        return Err("top-level value must be an object".to_string());
    };

    let mut store = SessionStore::new();

    for (key, entry) in map {
        if key == PENDING_URLS_KEY {
            store.pending_gallery_urls = serde_json::from_value(entry)
                .map_err(|e| format!("'{}' must be a list of strings: {}", PENDING_URLS_KEY, e))?;
        } else {
            let record: ArtistRecord = serde_json::from_value(entry)
                .map_err(|e| format!("artist '{}': {}", key, e))?;
            store.artists.insert(key, record);
        }
    }

    Ok(store)
}

/// Serializes a [`SessionStore`] with sorted keys and four-space indentation
fn encode_store(store: &SessionStore) -> StorageResult<Vec<u8>> {
    let mut document: BTreeMap<&str, Value> = BTreeMap::new();
    document.insert(
        PENDING_URLS_KEY,
        serde_json::to_value(&store.pending_gallery_urls)?,
    );

    for (name, record) in &store.artists {
        if name == PENDING_URLS_KEY {
            return Err(StorageError::ReservedName(name.clone()));
        }
        document.insert(name.as_str(), serde_json::to_value(record)?);
    }

    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    document.serialize(&mut serializer)?;
    buffer.push(b'\n');

    Ok(buffer)
}
