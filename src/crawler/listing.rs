//! Category listing walker
//!
//! Visits listing pages `start..=end` in ascending order and collects detail-page
//! links in document order. Nothing is deduplicated: a book listed on two pages
//! is returned twice.

use crate::config::ListingFailurePolicy;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::layout::PageLayout;
use crate::crawler::parser::extract_book_links;
use crate::state::{BookState, OutcomeLog};
use crate::url::listing_page_url;
use crate::{HarvestError, Result};
use url::Url;

/// Collects detail-page URLs from an inclusive range of listing pages
///
/// # Listing Failures
///
/// | Policy | Action |
/// |--------|--------|
/// | `Skip` | Warning recorded in `log`, continue with the next page |
/// | `Abort` | Return [`HarvestError::Listing`] |
///
/// Transient failures are retried by the fetcher and never reach this function.
pub async fn list_book_urls(
    fetcher: &Fetcher,
    category_url: &Url,
    start_page: u32,
    end_page: u32,
    layout: &PageLayout,
    on_failure: ListingFailurePolicy,
    log: &mut OutcomeLog,
) -> Result<Vec<Url>> {
    let mut book_urls = Vec::new();

    for page in start_page..=end_page {
        let page_url = listing_page_url(category_url, page)?;
        tracing::debug!("Fetching listing page {}: {}", page, page_url);

        let response = match fetcher.fetch(&page_url).await {
            Ok(response) => response,
            Err(error) => match on_failure {
                ListingFailurePolicy::Skip => {
                    log.record(
                        page_url.as_str(),
                        None,
                        BookState::ListingSkipped,
                        format!("Listing page {} skipped: {}", page, error),
                    );
                    continue;
                }
                ListingFailurePolicy::Abort => {
                    return Err(HarvestError::Listing {
                        page,
                        source: error,
                    });
                }
            },
        };

        let links = extract_book_links(&response.text(), &response.final_url, layout);
        tracing::info!("Listing page {}: {} books", page, links.len());
        book_urls.extend(links);
    }

    Ok(book_urls)
}
