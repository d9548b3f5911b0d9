//! Crawler module for catalog fetching and book acquisition
//!
//! This module contains the core harvesting logic, including:
//! - HTTP fetching with redirect detection and capped linear backoff
//! - Detail-page parsing and listing link extraction
//! - Listing page traversal
//! - Overall harvest coordination

mod book;
mod coordinator;
mod fetcher;
mod layout;
mod listing;
mod parser;
mod retry;

pub use book::Book;
pub use coordinator::{Coordinator, CrawlReport};
pub use fetcher::{build_http_client, fetch_once, FetchedResponse, Fetcher};
pub use layout::PageLayout;
pub use listing::list_book_urls;
pub use parser::{extract_book_links, parse_book_page, ParsedBook};
pub use retry::{retry_transient, Backoff, Clock, ManualClock, RetryPolicy, TokioClock};

use crate::config::Config;
use crate::HarvestError;

/// Runs a complete harvest
///
/// This is the main entry point for starting a run. It will:
/// 1. Validate the configuration and build the HTTP client
/// 2. Walk the listing pages
/// 3. Acquire every listed book
///
/// The catalog is not written here; see [`crate::output::write_catalog`].
pub async fn crawl(config: Config) -> Result<CrawlReport, HarvestError> {
    Coordinator::new(config)?.run().await
}
