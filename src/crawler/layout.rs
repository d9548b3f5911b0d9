use crate::config::{parse_selector, LayoutConfig};
use crate::ConfigError;
use scraper::Selector;

/// Compiled selectors for the catalog's markup
///
/// Compiled once per run from [`LayoutConfig`]; the raw selector strings are kept
/// for error messages.
#[derive(Debug, Clone)]
pub struct PageLayout {
    pub heading: Selector,
    pub title_delimiter: String,
    pub cover_image: Selector,
    pub genres: Selector,
    pub comments: Selector,
    pub text_link: Selector,
    pub text_link_label: String,
    pub book_links: Selector,
    source: LayoutConfig,
}

impl PageLayout {
    pub fn compile(config: &LayoutConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            heading: parse_selector(&config.heading)?,
            title_delimiter: config.title_delimiter.clone(),
            cover_image: parse_selector(&config.cover_image)?,
            genres: parse_selector(&config.genres)?,
            comments: parse_selector(&config.comments)?,
            text_link: parse_selector(&config.text_link)?,
            text_link_label: config.text_link_label.trim().to_string(),
            book_links: parse_selector(&config.book_links)?,
            source: config.clone(),
        })
    }

    /// The configuration this layout was compiled from
    pub fn source(&self) -> &LayoutConfig {
        &self.source
    }
}
