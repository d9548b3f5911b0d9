use url::Url;

/// Derives the numeric book id from a detail-page URL
///
/// The id is the digit run of the last non-empty path segment, so `/b239/` and
/// `/b239` both give `"239"`. Only the URL is consulted, never the page body,
/// which keeps the id available for logging even when the page is unusable.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use tome_harvest::url::book_id_from_url;
///
/// let url = Url::parse("https://tululu.org/b239/").unwrap();
/// assert_eq!(book_id_from_url(&url), Some("239".to_string()));
/// ```
pub fn book_id_from_url(url: &Url) -> Option<String> {
    let segment = url
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()?;

    let id: String = segment.chars().filter(|c| c.is_ascii_digit()).collect();
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

/// Returns the percent-decoded last path segment of a URL
///
/// Returns None when the path ends with a slash or has no segments.
pub fn last_segment_decoded(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.last()?;
    if segment.is_empty() {
        return None;
    }

    let decoded = urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string());
    Some(decoded)
}
