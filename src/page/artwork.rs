use scraper::{ElementRef, Html, Selector};

/// Extracts direct image links from an artwork page
///
/// For each `div.pod-body` content block:
/// 1. the first link inside its `div.image` (the primary display image)
/// 2. the lazy-load source (`data-smartload-src`) of every image inside its
///    `div#author_comments` region
///
/// Links are returned in page order and may contain duplicates; dedup against
/// what is already known happens in the artist's record.
pub fn extract_deep_links(document: &Html) -> Vec<String> {
    let Ok(pod_selector) = Selector::parse("div.pod-body") else {
        return Vec::new();
    };

    document
        .select(&pod_selector)
        .flat_map(|pod| {
            let mut links = Vec::new();
            links.extend(primary_image(pod));
            links.extend(comment_images(pod));
            links
        })
        .collect()
}

/// Link target of the primary display image, if the block has one
fn primary_image(pod: ElementRef<'_>) -> Option<String> {
    let image_selector = Selector::parse("div.image").ok()?;
    let anchor_selector = Selector::parse("a").ok()?;

    pod.select(&image_selector)
        .next()?
        .select(&anchor_selector)
        .next()?
        .value()
        .attr("href")
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(str::to_string)
}

/// Lazy-load sources of the images embedded in the author's comments
fn comment_images(pod: ElementRef<'_>) -> Vec<String> {
    let (Ok(comments_selector), Ok(img_selector)) = (
        Selector::parse("div#author_comments"),
        Selector::parse("img"),
    ) else {
        return Vec::new();
    };

    let Some(comments) = pod.select(&comments_selector).next() else {
        return Vec::new();
    };

    comments
        .select(&img_selector)
        .filter_map(|img| img.value().attr("data-smartload-src"))
        .map(str::trim)
        .filter(|src| !src.is_empty())
        .map(str::to_string)
        .collect()
}
