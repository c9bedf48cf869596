//! Page extraction for gallery and artwork pages
//!
//! This module turns fetched documents into the data the coordinator needs:
//! - the artist's display name and the artwork manifest from a gallery page
//! - the candidate artwork links mined from that manifest
//! - the content rating of an artwork page
//! - the direct image links on an accepted artwork page

mod artwork;
mod gallery;
mod manifest;
mod rating;
mod script;

pub use artwork::extract_deep_links;
pub use gallery::{extract_artist_name, extract_candidate_links, extract_manifest};
pub use manifest::{collect_arrays, extract_anchor_target, mine_link_lists};
pub use rating::{detect_ratings, Rating, RatingFilter};
pub use script::find_property;

use thiserror::Error;

/// Errors raised when a page breaks the structure the extractors rely on
///
/// These are not "element missing" cases (those are `None`); they mean the
/// page layout has changed underneath us and the run should stop.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("Manifest is not valid JSON: {0}")]
    ManifestSyntax(String),

    #[error("Manifest entry does not match the anchor pattern: {0}")]
    ContractViolation(String),
}

/// Result type for page extraction
pub type PageResult<T> = Result<T, PageError>;
