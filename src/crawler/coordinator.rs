//! Crawler coordinator - main harvest orchestration logic
//!
//! This module contains the run loop that coordinates all aspects of a
//! harvest, including:
//! - Loading the session store once at the start of the run
//! - Walking the pending gallery list in order
//! - Coordinating gallery fetches, manifest mining, and artwork fetches
//! - Reconciling the pending list (dropping dead URLs, keeping deferred ones)
//! - Saving the store once at the end and returning the run report

use crate::config::Config;
use crate::crawler::fetcher::{FetchOutcome, Fetcher, Page};
use crate::page::{extract_artist_name, extract_candidate_links, extract_deep_links, RatingFilter};
use crate::report::{ReportLine, RunReport};
use crate::session::{ArtistRecord, SessionStore};
use crate::storage::{open_storage, JsonFileStorage, SessionStorage};
use crate::url::artwork_page_url;
use crate::SweepError;
use url::Url;

/// What happens to a gallery URL after it has been processed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Disposition {
    /// Stays in the pending list
    Keep,
    /// Removed from the pending list
    Drop,
}

/// Main harvest coordinator
///
/// Owns the fetcher (and with it the throttle), the rating filter, and the
/// storage backend. One coordinator can run any number of times; each run
/// loads and saves the store exactly once.
pub struct Coordinator<S: SessionStorage> {
    fetcher: Fetcher,
    filter: RatingFilter,
    storage: S,
}

impl Coordinator<JsonFileStorage> {
    /// Creates a coordinator backed by the configured JSON session file
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(SweepError)` - The HTTP client could not be built
    pub fn new(config: &Config) -> Result<Self, SweepError> {
        let fetcher = Fetcher::from_config(config)?;
        Ok(Self::with_parts(
            fetcher,
            RatingFilter::new(config.ratings),
            open_storage(config),
        ))
    }
}

impl<S: SessionStorage> Coordinator<S> {
    /// Assembles a coordinator from explicit parts
    pub fn with_parts(fetcher: Fetcher, filter: RatingFilter, storage: S) -> Self {
        Self {
            fetcher,
            filter,
            storage,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Runs one harvest over the pending gallery list
    ///
    /// # Errors
    ///
    /// Storage failures, manifest parse failures and unclassified transport
    /// faults abort the run. The store is then left exactly as the previous
    /// successful run saved it.
    pub async fn run(&mut self) -> Result<RunReport, SweepError> {
        let mut store = self.storage.load()?;
        let mut report = RunReport::start();

        tracing::info!(
            "Starting run with {} pending galleries and {} known artists",
            store.pending_gallery_urls.len(),
            store.artists.len()
        );

        let pending = std::mem::take(&mut store.pending_gallery_urls);
        let mut retained = Vec::with_capacity(pending.len());

        for gallery_url in pending {
            report.record_gallery();
            let disposition = self
                .process_gallery(&gallery_url, &mut store, &mut report)
                .await?;

            if disposition == Disposition::Keep {
                retained.push(gallery_url);
            }
        }

        store.pending_gallery_urls = retained;
        self.storage.save(&store)?;
        report.finish();

        tracing::info!("Run complete: {}", report.summary());
        Ok(report)
    }

    /// Processes a single gallery URL
    async fn process_gallery(
        &mut self,
        gallery_url: &str,
        store: &mut SessionStore,
        report: &mut RunReport,
    ) -> Result<Disposition, SweepError> {
        tracing::info!("Working on: {}", gallery_url);

        let page = match self.fetcher.fetch(gallery_url).await? {
            FetchOutcome::Success(page) => page,
            FetchOutcome::RetryLater { reason, .. } => {
                tracing::warn!("Deferring {}: {}", gallery_url, reason);
                report.push(ReportLine::RetryLater {
                    url: gallery_url.to_string(),
                });
                return Ok(Disposition::Keep);
            }
            FetchOutcome::PermanentFailure { reason, .. } => {
                tracing::warn!("Dropping {}: {}", gallery_url, reason);
                report.push(ReportLine::InvalidUrl {
                    url: gallery_url.to_string(),
                });
                return Ok(Disposition::Drop);
            }
        };

        let Page {
            url: gallery_base,
            document,
        } = page;

        let Some(artist) = extract_artist_name(&document) else {
            tracing::warn!("No artist name on {}, dropping it", gallery_url);
            report.push(ReportLine::NoArtLinks {
                url: gallery_url.to_string(),
            });
            return Ok(Disposition::Drop);
        };

        if !self.storage.accepts_artist_name(&artist) {
            tracing::warn!(
                "Artist name '{}' on {} cannot be stored, dropping it",
                artist,
                gallery_url
            );
            report.push(ReportLine::NoArtLinks {
                url: gallery_url.to_string(),
            });
            return Ok(Disposition::Drop);
        }

        let candidates =
            extract_candidate_links(&document).map_err(|source| SweepError::Page {
                url: gallery_url.to_string(),
                source,
            })?;
        drop(document);

        tracing::info!("Extracted {} links from {}'s page", candidates.len(), artist);

        if candidates.is_empty() {
            tracing::warn!("No artwork links on {}, dropping it", gallery_url);
            report.push(ReportLine::NoArtLinks {
                url: gallery_url.to_string(),
            });
            return Ok(Disposition::Drop);
        }

        let (record, created) = store.ensure_artist(&artist);
        if created {
            tracing::info!("New artist: {}", artist);
            report.push(ReportLine::ArtistAdded {
                artist: artist.clone(),
            });
        }

        let added = self
            .harvest_artworks(&gallery_base, &candidates, record)
            .await?;

        if added > 0 {
            tracing::info!("Added {} new images for {}", added, artist);
            report.push(ReportLine::ImagesAdded {
                artist,
                count: added,
            });
        }

        Ok(Disposition::Keep)
    }

    /// Visits every unseen artwork candidate and collects accepted deep links
    ///
    /// Candidates are marked seen before they are fetched, so an artwork page
    /// that fails or is filtered out is not visited again on later runs.
    async fn harvest_artworks(
        &mut self,
        gallery_base: &Url,
        candidates: &[String],
        record: &mut ArtistRecord,
    ) -> Result<usize, SweepError> {
        let mut added = 0;

        for candidate in candidates {
            if !record.mark_seen(candidate) {
                continue;
            }

            let artwork_url = artwork_page_url(candidate, gallery_base);
            let artwork = match self.fetcher.fetch(&artwork_url).await? {
                FetchOutcome::Success(page) => page,
                other => {
                    tracing::debug!("Skipping artwork {}: {:?}", artwork_url, other);
                    continue;
                }
            };

            if !self.filter.is_accepted(&artwork.document) {
                tracing::debug!("Artwork {} rejected by rating filter", artwork_url);
                continue;
            }

            added += record.add_deep_links(extract_deep_links(&artwork.document));
        }

        Ok(added)
    }
}

/// Runs one harvest with the given configuration
///
/// This is the entry point a front end calls. It will:
/// 1. Open the configured session store
/// 2. Build the throttled HTTP fetcher
/// 3. Process every pending gallery
/// 4. Save the store and return the report
///
/// # Example
///
/// ```no_run
/// use artsweep::config::load_config;
/// use artsweep::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> artsweep::Result<()> {
/// let config = load_config(Path::new("artsweep.toml"))?;
/// let report = run_crawl(&config).await?;
/// for line in report.messages() {
///     println!("{}", line);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: &Config) -> Result<RunReport, SweepError> {
    let mut coordinator = Coordinator::new(config)?;
    coordinator.run().await
}
