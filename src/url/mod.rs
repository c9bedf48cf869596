//! URL handling for Artsweep
//!
//! Gallery URLs come straight from users and are validated before any request
//! is made. Artwork candidates are mined from gallery manifests without a
//! scheme (`host/art/view/1`) and are completed here before fetching.

use crate::UrlError;
use url::Url;

/// Parses a URL that is about to be fetched
///
/// Only absolute `http`/`https` URLs are accepted. A string without a scheme
/// (for example `artist.example.com/art`) is rejected with
/// [`UrlError::MissingScheme`] rather than being guessed at.
///
/// # Examples
///
/// ```
/// use artsweep::url::parse_fetch_url;
///
/// assert!(parse_fetch_url("https://artist.example.com/art").is_ok());
/// assert!(parse_fetch_url("artist.example.com/art").is_err());
/// ```
pub fn parse_fetch_url(url_str: &str) -> Result<Url, UrlError> {
    let trimmed = url_str.trim();

    let url = match Url::parse(trimmed) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            return Err(UrlError::MissingScheme(trimmed.to_string()))
        }
        Err(e) => return Err(UrlError::Parse(format!("{}: {}", trimmed, e))),
    };

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::Parse(format!("{}: missing host", trimmed)));
    }

    Ok(url)
}

/// Turns a mined artwork candidate into a fetchable URL
///
/// Candidates are stored exactly as mined (scheme-less), so the same string
/// is used for dedup across runs. They come from protocol-relative anchors
/// (`//host/...`), so they inherit the scheme of the gallery they were found on.
/// Candidates that already carry a scheme are returned unchanged.
///
/// On the live site artwork pages resolve to https only because gallery URLs are https.
pub fn artwork_page_url(candidate: &str, gallery: &Url) -> String {
    if candidate.starts_with("http://") || candidate.starts_with("https://") {
        return candidate.to_string();
    }

    let rest = candidate.trim_start_matches('/');
    format!("{}://{}", gallery.scheme(), rest)
}
