//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the harvester, including:
//! - Building HTTP clients with proper user agent strings and timeouts
//! - Throttling every request through the shared [`Throttle`]
//! - Classifying outcomes into success, retry-later, and permanent failure
//! - Parsing successful responses into queryable documents

use crate::config::{Config, ScraperConfig, UserAgentConfig};
use crate::crawler::throttle::Throttle;
use crate::url::parse_fetch_url;
use crate::SweepError;
use reqwest::{redirect::Policy, Client, StatusCode};
use scraper::Html;
use std::time::Duration;
use url::Url;

/// Maximum redirect hops followed for a single fetch
const MAX_REDIRECTS: usize = 10;

/// A successfully fetched and parsed page
#[derive(Debug)]
pub struct Page {
    /// Final URL after redirects
    pub url: Url,

    /// Parsed document
    pub document: Html,
}

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchOutcome {
    /// The page was fetched and parsed
    Success(Page),

    /// Transient upstream failure; try the URL again on a later run
    RetryLater {
        /// HTTP status code, if a response was received
        status_code: Option<u16>,
        /// Description of the failure
        reason: String,
    },

    /// The URL is bad and should not be requested again
    PermanentFailure {
        /// HTTP status code, if a response was received
        status_code: Option<u16>,
        /// Description of the failure
        reason: String,
    },
}

/// How a response status is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    RetryLater,
    Permanent,
}

/// Classifies an HTTP status
///
/// | Status | Class |
/// |--------|-------|
/// | 5xx | RetryLater |
/// | 429 | RetryLater |
/// | other 4xx | Permanent |
/// | anything else | Success |
pub fn classify_status(status: StatusCode) -> StatusClass {
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        StatusClass::RetryLater
    } else if status.is_client_error() {
        StatusClass::Permanent
    } else {
        StatusClass::Success
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use artsweep::config::{ScraperConfig, UserAgentConfig};
/// use artsweep::crawler::build_http_client;
///
/// let user_agent = UserAgentConfig {
///     crawler_name: "artsweep".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&user_agent, &ScraperConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    scraper: &ScraperConfig,
) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version (+ContactURL; ContactEmail)
    let user_agent = format!(
        "{}/{} (+{}; {})",
        user_agent.crawler_name,
        user_agent.crawler_version,
        user_agent.contact_url,
        user_agent.contact_email
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(scraper.request_timeout_secs))
        .connect_timeout(Duration::from_secs(scraper.connect_timeout_secs))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Throttled page fetcher
///
/// Holds the HTTP client and the process-wide [`Throttle`]. Takes `&mut self`
/// per fetch, so requests are strictly sequential.
pub struct Fetcher {
    client: Client,
    throttle: Throttle,
}

impl Fetcher {
    pub fn new(client: Client, throttle: Throttle) -> Self {
        Self { client, throttle }
    }

    /// Builds a fetcher from the configuration's user agent, timeouts, and interval
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&config.user_agent, &config.scraper)?;
        Ok(Self::new(client, Throttle::from_config(&config.scraper)))
    }

    pub fn throttle(&self) -> &Throttle {
        &self.throttle
    }

    /// Fetches a URL and classifies the outcome
    ///
    /// # Outcome Rules
    ///
    /// | Condition | Outcome |
    /// |-----------|---------|
    /// | URL without http(s) scheme | PermanentFailure (no request made) |
    /// | HTTP 5xx / 429 | RetryLater |
    /// | Other HTTP 4xx | PermanentFailure |
    /// | Timeout / connection failure | RetryLater |
    /// | Redirect loop or too many redirects | PermanentFailure |
    /// | Anything else | Success with parsed document |
    ///
    /// # Errors
    ///
    /// Transport faults that fit none of the rules above are returned as
    /// [`SweepError::Http`] and abort the run.
    pub async fn fetch(&mut self, url_str: &str) -> Result<FetchOutcome, SweepError> {
        let url = match parse_fetch_url(url_str) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Malformed URL {}: {}", url_str, e);
                return Ok(FetchOutcome::PermanentFailure {
                    status_code: None,
                    reason: e.to_string(),
                });
            }
        };

        self.throttle.wait().await;
        tracing::debug!("GET {}", url);

        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => return classify_transport_error(url_str, e),
        };

        let status = response.status();
        match classify_status(status) {
            StatusClass::RetryLater => {
                tracing::warn!("Error {} on link {}. Skipping...", status.as_u16(), url_str);
                return Ok(FetchOutcome::RetryLater {
                    status_code: Some(status.as_u16()),
                    reason: format!("HTTP {}", status),
                });
            }
            StatusClass::Permanent => {
                tracing::warn!(
                    "Error {} on link {}. Removing link...",
                    status.as_u16(),
                    url_str
                );
                return Ok(FetchOutcome::PermanentFailure {
                    status_code: Some(status.as_u16()),
                    reason: format!("HTTP {}", status),
                });
            }
            StatusClass::Success => {}
        }

        let final_url = response.url().clone();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return classify_transport_error(url_str, e),
        };

        Ok(FetchOutcome::Success(Page {
            url: final_url,
            document: Html::parse_document(&body),
        }))
    }
}

/// Maps a reqwest error to an outcome, or to a run-aborting error
fn classify_transport_error(
    url_str: &str,
    error: reqwest::Error,
) -> Result<FetchOutcome, SweepError> {
    if error.is_timeout() {
        tracing::warn!("Request to {} timed out", url_str);
        Ok(FetchOutcome::RetryLater {
            status_code: None,
            reason: "Request timeout".to_string(),
        })
    } else if error.is_connect() {
        tracing::warn!("Could not connect to {}: {}", url_str, error);
        Ok(FetchOutcome::RetryLater {
            status_code: None,
            reason: "Connection failed".to_string(),
        })
    } else if error.is_redirect() {
        tracing::warn!("Redirect error for {}: {}", url_str, error);
        Ok(FetchOutcome::PermanentFailure {
            status_code: None,
            reason: error.to_string(),
        })
    } else {
        Err(SweepError::Http {
            url: url_str.to_string(),
            source: error,
        })
    }
}
