//! HTML parser for detail and listing pages
//!
//! This module turns the catalog's markup into data:
//! - Detail page → [`Book`] (title, author, genres, comments, asset URLs)
//! - Listing page → detail-page links in document order
//!
//! All relative URLs are resolved against the URL the page was actually served
//! from, never against the URL that was requested.

use crate::assets::sanitize_file_name;
use crate::crawler::book::Book;
use crate::crawler::layout::PageLayout;
use crate::url::{book_id_from_url, resolve_link};
use crate::ExtractionError;
use scraper::{ElementRef, Html};
use url::Url;

/// A parsed detail page
#[derive(Debug, Clone)]
pub struct ParsedBook {
    pub book: Book,

    /// Set when text was wanted but the page has no text link
    pub text_error: Option<ExtractionError>,
}

/// Parses a detail page into a book
///
/// # Extraction Rules
///
/// - id: digits of the last path segment of `resolved_url`
/// - title/author: heading text split once on the layout delimiter; a missing
///   heading or delimiter makes the page malformed
/// - genres/comments: text of every matching element, may be empty
/// - cover: `src` of the cover element resolved against `resolved_url`; required
/// - text link: first text-link element whose text equals the layout label.
///   Its absence is reported in [`ParsedBook::text_error`] only when
///   `want_text` is set
///
/// # Example
///
/// ```
/// use tome_harvest::config::LayoutConfig;
/// use tome_harvest::crawler::{parse_book_page, PageLayout};
/// use url::Url;
///
/// let html = r#"<h1>Азбука :: Толстой Лев</h1>
///     <div class="bookimage"><img src="/shots/1.jpg"></div>"#;
/// let layout = PageLayout::compile(&LayoutConfig::default()).unwrap();
/// let url = Url::parse("https://tululu.org/b1/").unwrap();
///
/// let parsed = parse_book_page(html, &url, &layout, false).unwrap();
/// assert_eq!(parsed.book.title, "Азбука");
/// assert_eq!(parsed.book.author, "Толстой Лев");
/// ```
pub fn parse_book_page(
    html: &str,
    resolved_url: &Url,
    layout: &PageLayout,
    want_text: bool,
) -> Result<ParsedBook, ExtractionError> {
    let id = book_id_from_url(resolved_url).ok_or_else(|| ExtractionError::MalformedPage {
        url: resolved_url.to_string(),
        reason: "no numeric book id in URL".to_string(),
    })?;

    let document = Html::parse_document(html);

    let (title, author) = extract_title_author(&document, resolved_url, layout)?;
    let image_url = extract_image_url(&document, resolved_url, layout)?;
    let genres = collect_texts(&document, &layout.genres);
    let comments = collect_texts(&document, &layout.comments);

    let text_url = extract_text_url(&document, resolved_url, layout);
    let text_error = match (&text_url, want_text) {
        (None, true) => Some(ExtractionError::NoTextAvailable {
            url: resolved_url.to_string(),
        }),
        _ => None,
    };

    Ok(ParsedBook {
        book: Book {
            id,
            title: sanitize_file_name(&title),
            author,
            genres,
            comments,
            image_url,
            text_url,
            book_path: None,
            image_path: None,
        },
        text_error,
    })
}

/// Extracts detail-page links from a listing page, in document order
///
/// Duplicates are kept; unresolvable hrefs are skipped.
pub fn extract_book_links(html: &str, resolved_url: &Url, layout: &PageLayout) -> Vec<Url> {
    let document = Html::parse_document(html);

    document
        .select(&layout.book_links)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, resolved_url))
        .collect()
}

/// Splits the heading into trimmed title and author
fn extract_title_author(
    document: &Html,
    url: &Url,
    layout: &PageLayout,
) -> Result<(String, String), ExtractionError> {
    let heading = document
        .select(&layout.heading)
        .next()
        .map(element_text)
        .ok_or_else(|| ExtractionError::MissingElement {
            url: url.to_string(),
            selector: layout.source().heading.clone(),
        })?;

    let (title, author) = heading
        .split_once(layout.title_delimiter.as_str())
        .ok_or_else(|| ExtractionError::MalformedPage {
            url: url.to_string(),
            reason: format!(
                "heading '{}' has no '{}' delimiter",
                heading, layout.title_delimiter
            ),
        })?;

    Ok((title.trim().to_string(), author.trim().to_string()))
}

/// Resolves the cover image source
fn extract_image_url(
    document: &Html,
    url: &Url,
    layout: &PageLayout,
) -> Result<Url, ExtractionError> {
    let missing = || ExtractionError::MissingElement {
        url: url.to_string(),
        selector: layout.source().cover_image.clone(),
    };

    let src = document
        .select(&layout.cover_image)
        .next()
        .and_then(|element| element.value().attr("src"))
        .ok_or_else(missing)?;

    resolve_link(src, url).ok_or_else(|| ExtractionError::MalformedPage {
        url: url.to_string(),
        reason: format!("unusable cover image source '{}'", src),
    })
}

/// Finds the text download link by its visible label
fn extract_text_url(document: &Html, url: &Url, layout: &PageLayout) -> Option<Url> {
    document
        .select(&layout.text_link)
        .filter(|element| element_text(*element) == layout.text_link_label)
        .filter_map(|element| element.value().attr("href"))
        .find_map(|href| resolve_link(href, url))
}

/// Trimmed text of every element matching `selector`, blank ones included
fn collect_texts(document: &Html, selector: &scraper::Selector) -> Vec<String> {
    document.select(selector).map(element_text).collect()
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
