use crate::page::manifest::mine_link_lists;
use crate::page::script::find_property;
use crate::page::{PageError, PageResult};
use scraper::{Html, Selector};
use serde_json::Value;

/// Manifest property holding the per-year artwork listings
const MANIFEST_KEY: &str = "years";

/// Index of the manifest script among the scripts in the gallery body
const MANIFEST_SCRIPT_INDEX: usize = 1;

/// Extracts the artist's display name from a gallery page
///
/// Returns `None` when the page has no author header, which means it is not
/// an artist gallery page.
///
/// # Example
///
/// ```
/// use artsweep::page::extract_artist_name;
/// use scraper::Html;
///
/// let html = r#"<span class="user-header-name"><a class="user-link"> Alice </a></span>"#;
/// let document = Html::parse_document(html);
/// assert_eq!(extract_artist_name(&document), Some("Alice".to_string()));
/// ```
pub fn extract_artist_name(document: &Html) -> Option<String> {
    let header_selector = Selector::parse("span.user-header-name").ok()?;
    let link_selector = Selector::parse("a.user-link").ok()?;

    document
        .select(&header_selector)
        .next()?
        .select(&link_selector)
        .next()
        .map(|link| link.text().collect::<String>().trim().to_string())
        .filter(|name| !name.is_empty())
}

/// Extracts the embedded artwork manifest from a gallery page
///
/// The manifest is the value of the `"years"` property inside the second
/// `<script>` of the page's `div.body-center`.
///
/// # Returns
///
/// * `Ok(Some(value))` - The manifest, decoded as JSON
/// * `Ok(None)` - No such script, or no `"years"` property in it
/// * `Err(PageError::ManifestSyntax)` - The property exists but is not JSON
pub fn extract_manifest(document: &Html) -> PageResult<Option<Value>> {
    let (Ok(body_selector), Ok(script_selector)) = (
        Selector::parse("div.body-center"),
        Selector::parse("script"),
    ) else {
        return Ok(None);
    };

    let Some(body) = document.select(&body_selector).next() else {
        tracing::debug!("Gallery page has no body-center block");
        return Ok(None);
    };

    let Some(script) = body.select(&script_selector).nth(MANIFEST_SCRIPT_INDEX) else {
        tracing::debug!("Gallery body has no manifest script");
        return Ok(None);
    };

    let source = script.text().collect::<String>();
    let Some(expression) = find_property(&source, MANIFEST_KEY) else {
        tracing::debug!("Manifest script has no \"{}\" property", MANIFEST_KEY);
        return Ok(None);
    };

    serde_json::from_str(expression)
        .map(Some)
        .map_err(|e| PageError::ManifestSyntax(e.to_string()))
}

/// Extracts the candidate artwork links of a gallery page
///
/// A page without a manifest yields an empty list, exactly like a manifest
/// without any artwork.
pub fn extract_candidate_links(document: &Html) -> PageResult<Vec<String>> {
    match extract_manifest(document)? {
        Some(manifest) => mine_link_lists(&manifest),
        None => Ok(Vec::new()),
    }
}
