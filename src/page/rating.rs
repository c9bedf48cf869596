//! Content rating filter
//!
//! Artwork pages declare their rating with an `<h2>` carrying one of four
//! marker classes. A page is accepted only if a marker it carries belongs to
//! an enabled tier; pages with no recognized marker are always rejected.

use crate::config::RatingConfig;
use scraper::{Html, Selector};
use std::fmt;

/// The four content rating tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rating {
    Everyone,
    Teen,
    Mature,
    Adult,
}

impl Rating {
    pub const ALL: [Rating; 4] = [Rating::Everyone, Rating::Teen, Rating::Mature, Rating::Adult];

    /// CSS class of the page's rating marker
    pub fn marker_class(&self) -> &'static str {
        match self {
            Self::Everyone => "rated-e",
            Self::Teen => "rated-t",
            Self::Mature => "rated-m",
            Self::Adult => "rated-a",
        }
    }

    fn marker_selector(&self) -> &'static str {
        match self {
            Self::Everyone => "h2.rated-e",
            Self::Teen => "h2.rated-t",
            Self::Mature => "h2.rated-m",
            Self::Adult => "h2.rated-a",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker_class())
    }
}

/// Returns every rating marker present on the page, in tier order
pub fn detect_ratings(document: &Html) -> Vec<Rating> {
    Rating::ALL
        .into_iter()
        .filter(|rating| {
            Selector::parse(rating.marker_selector())
                .map(|selector| document.select(&selector).next().is_some())
                .unwrap_or(false)
        })
        .collect()
}

/// Decides whether an artwork page's rating is currently wanted
#[derive(Debug, Clone, Copy)]
pub struct RatingFilter {
    config: RatingConfig,
}

impl RatingFilter {
    pub fn new(config: RatingConfig) -> Self {
        Self { config }
    }

    /// Whether the tier's toggle is enabled
    pub fn allows(&self, rating: Rating) -> bool {
        match rating {
            Rating::Everyone => self.config.everyone,
            Rating::Teen => self.config.teen,
            Rating::Mature => self.config.mature,
            Rating::Adult => self.config.adult,
        }
    }

    /// Whether the page carries a marker for an enabled tier
    pub fn is_accepted(&self, document: &Html) -> bool {
        detect_ratings(document)
            .into_iter()
            .any(|rating| self.allows(rating))
    }
}

impl From<RatingConfig> for RatingFilter {
    fn from(config: RatingConfig) -> Self {
        Self::new(config)
    }
}
