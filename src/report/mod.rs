//! Run reporting
//!
//! This module handles:
//! - The human-readable lines a run hands back to its caller
//! - Per-run counters and timestamps
//! - The artist listing the front end shows from the persisted store

mod listing;

pub use listing::{artist_listing, format_artist_listing, ArtistSummary};

use chrono::{DateTime, Utc};
use std::fmt;

/// One line of a run report
///
/// Callers treat the rendered text as opaque; the variants exist so the
/// coordinator and tests do not have to match on strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportLine {
    /// The gallery fetch hit a transient failure; it stays pending
    RetryLater { url: String },

    /// The gallery URL is malformed or the site rejected it; it was dropped
    InvalidUrl { url: String },

    /// No artist name or no artwork links on the gallery; it was dropped
    NoArtLinks { url: String },

    /// A new artist record was created
    ArtistAdded { artist: String },

    /// New deep links were accepted for an artist
    ImagesAdded { artist: String, count: usize },
}

impl fmt::Display for ReportLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RetryLater { url } => {
                write!(f, "Couldn't add {} this time. Will try again later.", url)
            }
            Self::InvalidUrl { url } => write!(f, "Couldn't add {}: Invalid URL", url),
            Self::NoArtLinks { url } => write!(
                f,
                "Couldn't add {}: Couldn't find any art links (Invalid URL?)",
                url
            ),
            Self::ArtistAdded { artist } => write!(f, "Added {} to the database.", artist),
            Self::ImagesAdded { artist, count } => {
                write!(f, "Added {} new images for {}", count, artist)
            }
        }
    }
}

/// Outcome of one harvest run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the run finished (set once the store has been saved)
    pub finished_at: Option<DateTime<Utc>>,

    /// Report lines in the order they were produced
    pub lines: Vec<ReportLine>,

    /// Gallery URLs taken from the pending list
    pub galleries_processed: usize,

    /// Artist records created
    pub artists_added: usize,

    /// Deep links accepted across all artists
    pub images_added: usize,

    /// Gallery URLs removed from the pending list
    pub urls_dropped: usize,

    /// Gallery URLs kept for a later run after a transient failure
    pub urls_deferred: usize,
}

impl RunReport {
    /// Starts an empty report stamped with the current time
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            lines: Vec::new(),
            galleries_processed: 0,
            artists_added: 0,
            images_added: 0,
            urls_dropped: 0,
            urls_deferred: 0,
        }
    }

    /// Appends a line and updates the matching counter
    pub fn push(&mut self, line: ReportLine) {
        match &line {
            ReportLine::RetryLater { .. } => self.urls_deferred += 1,
            ReportLine::InvalidUrl { .. } | ReportLine::NoArtLinks { .. } => {
                self.urls_dropped += 1
            }
            ReportLine::ArtistAdded { .. } => self.artists_added += 1,
            ReportLine::ImagesAdded { count, .. } => self.images_added += count,
        }
        self.lines.push(line);
    }

    pub fn record_gallery(&mut self) {
        self.galleries_processed += 1;
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Run duration in whole seconds, once finished
    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }

    /// The rendered report lines handed back to the caller
    pub fn messages(&self) -> Vec<String> {
        self.lines.iter().map(ToString::to_string).collect()
    }

    /// One-line summary of the counters
    pub fn summary(&self) -> String {
        format!(
            "{} galleries processed, {} artists added, {} images added, {} dropped, {} deferred",
            self.galleries_processed,
            self.artists_added,
            self.images_added,
            self.urls_dropped,
            self.urls_deferred
        )
    }
}

impl Default for RunReport {
    fn default() -> Self {
        Self::start()
    }
}
