//! Crawler coordinator - main harvest orchestration logic
//!
//! This module sequences the whole run:
//! - Walking the listing pages for book URLs
//! - Fetching and parsing each detail page
//! - Materializing the requested assets
//! - Isolating per-book failures into the outcome log
//! - Accumulating the books for the catalog

use crate::assets::{book_path, image_path, AssetMaterializer};
use crate::config::{validate, Config};
use crate::crawler::book::Book;
use crate::crawler::fetcher::{build_http_client, Fetcher};
use crate::crawler::layout::PageLayout;
use crate::crawler::listing::list_book_urls;
use crate::crawler::parser::{parse_book_page, ParsedBook};
use crate::crawler::retry::RetryPolicy;
use crate::state::{BookState, OutcomeLog};
use crate::url::book_id_from_url;
use crate::Result;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// Everything a finished run produced
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// Detail-page URLs found on the listing pages (duplicates included)
    pub candidates: usize,

    /// Acquired books, in listing order
    pub books: Vec<Book>,

    /// Every recorded outcome, in the order it happened
    pub log: OutcomeLog,
}

impl CrawlReport {
    /// Books with every requested asset in place
    pub fn complete_count(&self) -> usize {
        self.log.count(BookState::Acquired)
    }

    /// Books kept without their text
    pub fn partial_count(&self) -> usize {
        self.log.count(BookState::Partial)
    }

    /// Number of warnings recorded
    pub fn warning_count(&self) -> usize {
        self.log.warnings().count()
    }
}

/// Main harvest coordinator
///
/// Cheap to clone; clones share the configuration, layout, and HTTP client.
#[derive(Debug, Clone)]
pub struct Coordinator {
    config: Arc<Config>,
    layout: Arc<PageLayout>,
    fetcher: Fetcher,
    materializer: AssetMaterializer,
}

impl Coordinator {
    /// Creates a coordinator with a real HTTP client and clock
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Configuration is valid and the client was built
    /// * `Err(HarvestError)` - Invalid configuration or client setup failure
    pub fn new(config: Config) -> Result<Self> {
        let client = build_http_client(&config.http)?;
        let fetcher = Fetcher::new(client, RetryPolicy::from_config(&config.retry));
        Self::with_fetcher(config, fetcher)
    }

    /// Creates a coordinator around an existing fetcher
    pub fn with_fetcher(config: Config, fetcher: Fetcher) -> Result<Self> {
        validate(&config)?;
        let layout = PageLayout::compile(&config.layout)?;

        Ok(Self {
            config: Arc::new(config),
            layout: Arc::new(layout),
            materializer: AssetMaterializer::new(fetcher.clone()),
            fetcher,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs the full harvest
    ///
    /// 1. Collect book URLs from the configured listing pages
    /// 2. Acquire every book (in parallel when `workers > 1`)
    /// 3. Return the books and the outcome log
    ///
    /// Only configuration problems and an aborted listing end the run early;
    /// per-book failures are recorded and skipped.
    pub async fn run(&self) -> Result<CrawlReport> {
        let catalog = &self.config.catalog;
        let category_url = Url::parse(&catalog.category_url)?;

        tracing::info!(
            "Harvesting {} pages {}..={}",
            category_url,
            catalog.start_page,
            catalog.end_page
        );

        let mut log = OutcomeLog::new();
        let urls = list_book_urls(
            &self.fetcher,
            &category_url,
            catalog.start_page,
            catalog.end_page,
            &self.layout,
            catalog.on_listing_failure,
            &mut log,
        )
        .await?;

        let candidates = urls.len();
        tracing::info!("Found {} book pages", candidates);

        let (books, book_log) = self.acquire_all(urls).await?;
        log.extend(book_log);

        tracing::info!(
            "Harvest finished: {} of {} books acquired",
            books.len(),
            candidates
        );

        Ok(CrawlReport {
            candidates,
            books,
            log,
        })
    }

    /// Acquires every URL, preserving input order in the results
    pub async fn acquire_all(&self, urls: Vec<Url>) -> Result<(Vec<Book>, OutcomeLog)> {
        let workers = self.config.catalog.workers.max(1) as usize;

        if workers == 1 {
            let mut log = OutcomeLog::new();
            let mut books = Vec::new();
            for url in &urls {
                if let Some(book) = self.acquire(url, &mut log).await {
                    books.push(book);
                }
            }
            return Ok((books, log));
        }

        let semaphore = Arc::new(Semaphore::new(workers));
        let mut tasks = JoinSet::new();

        for (index, url) in urls.into_iter().enumerate() {
            let coordinator = self.clone();
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let mut log = OutcomeLog::new();
                let book = coordinator.acquire(&url, &mut log).await;
                (index, book, log)
            });
        }

        let mut results = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            results.push(joined?);
        }
        results.sort_by_key(|(index, _, _)| *index);

        let mut log = OutcomeLog::new();
        let mut books = Vec::new();
        for (_, book, task_log) in results {
            log.extend(task_log);
            books.extend(book);
        }

        Ok((books, log))
    }

    /// Acquires a single book
    ///
    /// Fetch and parse failures skip the book with a warning; a missing text
    /// link (when text is wanted) keeps the book as a partial; an asset download
    /// failure keeps the book without that asset. Nothing is propagated.
    pub async fn acquire(&self, book_url: &Url, log: &mut OutcomeLog) -> Option<Book> {
        let url_id = book_id_from_url(book_url);
        let want_text = !self.config.output.skip_text;
        let want_image = !self.config.output.skip_images;

        let response = match self.fetcher.fetch(book_url).await {
            Ok(response) => response,
            Err(error) => {
                log.record(
                    book_url.as_str(),
                    url_id.as_deref(),
                    BookState::for_fetch_error(&error),
                    format!("Book skipped: {}", error),
                );
                return None;
            }
        };

        let parsed = parse_book_page(
            &response.text(),
            &response.final_url,
            &self.layout,
            want_text,
        );
        let ParsedBook {
            mut book,
            text_error,
        } = match parsed {
            Ok(parsed) => parsed,
            Err(error) => {
                log.record(
                    book_url.as_str(),
                    url_id.as_deref(),
                    BookState::for_extraction_error(&error),
                    format!("Book skipped: {}", error),
                );
                return None;
            }
        };

        if want_text && book.text_url.is_some() {
            book.book_path = Some(book_path(
                &self.config.output.books_dir(),
                &book.id,
                &book.title,
            ));
        }
        if want_image {
            book.image_path = Some(image_path(
                &self.config.output.images_dir(),
                &book.image_url,
            ));
        }

        let mut asset_failed = false;

        if let (Some(text_url), Some(path)) = (&book.text_url, &book.book_path) {
            if let Err(error) = self.materializer.download_text(text_url, path).await {
                log.record(
                    text_url.as_str(),
                    Some(&book.id),
                    BookState::AssetFailed,
                    format!("Text not saved: {}", error),
                );
                asset_failed = true;
                book.book_path = None;
            }
        }

        if let Some(path) = &book.image_path {
            if let Err(error) = self.materializer.download_image(&book.image_url, path).await {
                log.record(
                    book.image_url.as_str(),
                    Some(&book.id),
                    BookState::AssetFailed,
                    format!("Cover not saved: {}", error),
                );
                asset_failed = true;
                book.image_path = None;
            }
        }

        match text_error {
            Some(error) => log.record(
                book_url.as_str(),
                Some(&book.id),
                BookState::for_extraction_error(&error),
                format!("Image-only book: {}", error),
            ),
            None if !asset_failed => log.record(
                book_url.as_str(),
                Some(&book.id),
                BookState::Acquired,
                format!("Acquired '{}' by {}", book.title, book.author),
            ),
            None => {}
        }

        Some(book)
    }
}
