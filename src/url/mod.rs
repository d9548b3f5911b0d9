//! URL handling module for Tome-Harvest
//!
//! This module provides listing-page URL construction, link resolution, and the
//! path-segment helpers used to derive book ids and image file names.

mod pages;
mod segments;

// Re-export main functions
pub use pages::{category_base, listing_page_url};
pub use segments::{book_id_from_url, last_segment_decoded};

use url::Url;

/// Resolves a link href to an absolute URL
///
/// Returns None if the link should be ignored:
/// - empty or fragment-only hrefs
/// - javascript:, mailto:, tel:, data: schemes
/// - hrefs that cannot be joined onto `base_url`
/// - non-HTTP(S) URLs after resolution
///
/// # Examples
///
/// ```
/// use url::Url;
/// use tome_harvest::url::resolve_link;
///
/// let base = Url::parse("https://tululu.org/b239/").unwrap();
/// let link = resolve_link("/shots/239.jpg", &base).unwrap();
/// assert_eq!(link.as_str(), "https://tululu.org/shots/239.jpg");
/// ```
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
        Some(absolute_url)
    } else {
        None
    }
}
