//! In-memory session model
//!
//! A [`SessionStore`] is loaded once at the start of a run, mutated in memory
//! by the coordinator, and handed back to storage once at the end.

mod link_set;

pub use link_set::LinkSet;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything known about one artist
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRecord {
    /// Direct image links accepted for this artist
    ///
    /// Only links that passed the rating filter when discovered end up here;
    /// they are never re-evaluated.
    #[serde(rename = "deep_links", default)]
    pub deep_links: LinkSet,

    /// Artwork page links already processed for this artist
    #[serde(rename = "to_links", default)]
    pub seen_source_links: LinkSet,
}

impl ArtistRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks an artwork page as seen, returning `false` if it already was
    pub fn mark_seen(&mut self, source_link: &str) -> bool {
        self.seen_source_links.insert(source_link)
    }

    pub fn has_seen(&self, source_link: &str) -> bool {
        self.seen_source_links.contains(source_link)
    }

    /// Adds deep link candidates, returning how many were genuinely new
    pub fn add_deep_links<I, S>(&mut self, candidates: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.deep_links.extend_new(candidates)
    }
}

/// The durable state of the harvester
///
/// The pending gallery list and the artist map are separate fields, so no
/// artist name can ever be confused with the pending list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStore {
    /// Gallery URLs still being tracked, in crawl order
    pub pending_gallery_urls: Vec<String>,

    /// Artist display name to record
    pub artists: BTreeMap<String, ArtistRecord>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a gallery URL for the next run
    ///
    /// Returns `false` (and leaves the list alone) if the URL is already pending.
    pub fn add_pending_url(&mut self, url: &str) -> bool {
        let url = url.trim();
        if self.pending_gallery_urls.iter().any(|u| u == url) {
            return false;
        }
        self.pending_gallery_urls.push(url.to_string());
        true
    }

    /// Returns the record for `name`, creating it if needed
    ///
    /// The boolean is `true` when the record was created by this call.
    pub fn ensure_artist(&mut self, name: &str) -> (&mut ArtistRecord, bool) {
        let created = !self.artists.contains_key(name);
        let record = self.artists.entry(name.to_string()).or_default();
        (record, created)
    }

    pub fn artist(&self, name: &str) -> Option<&ArtistRecord> {
        self.artists.get(name)
    }

    pub fn artist_mut(&mut self, name: &str) -> Option<&mut ArtistRecord> {
        self.artists.get_mut(name)
    }

    /// Artist names in sorted order
    pub fn artist_names(&self) -> impl Iterator<Item = &str> {
        self.artists.keys().map(String::as_str)
    }

    /// Total number of deep links across all artists
    pub fn total_deep_links(&self) -> usize {
        self.artists.values().map(|a| a.deep_links.len()).sum()
    }
}
