use crate::session::SessionStore;

/// One artist as shown in the front end's listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistSummary {
    pub name: String,

    /// Deep links collected so far
    pub image_count: usize,

    /// Artwork pages already visited
    pub artwork_count: usize,
}

/// Lists every artist in the store, sorted by name
pub fn artist_listing(store: &SessionStore) -> Vec<ArtistSummary> {
    store
        .artists
        .iter()
        .map(|(name, record)| ArtistSummary {
            name: name.clone(),
            image_count: record.deep_links.len(),
            artwork_count: record.seen_source_links.len(),
        })
        .collect()
}

/// Renders the listing as `name (N images)`, one artist per line
pub fn format_artist_listing(listing: &[ArtistSummary]) -> String {
    listing
        .iter()
        .map(|artist| format!("{} ({} images)", artist.name, artist.image_count))
        .collect::<Vec<_>>()
        .join("\n")
}
