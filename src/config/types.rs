use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure for Tome-Harvest
///
/// Every table has defaults, so an empty file (or no file at all) yields a
/// configuration that harvests the first ten pages of the default category.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

/// What to crawl
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Category listing URL; page N lives at `{category-url}/{N}/`
    #[serde(rename = "category-url")]
    pub category_url: String,

    /// First listing page (inclusive)
    #[serde(rename = "start-page")]
    pub start_page: u32,

    /// Last listing page (inclusive)
    #[serde(rename = "end-page")]
    pub end_page: u32,

    /// Number of books acquired concurrently
    pub workers: u32,

    /// What to do when a listing page cannot be fetched
    #[serde(rename = "on-listing-failure")]
    pub on_listing_failure: ListingFailurePolicy,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            category_url: "https://tululu.org/l55/".to_string(),
            start_page: 1,
            end_page: 10,
            workers: 1,
            on_listing_failure: ListingFailurePolicy::Skip,
        }
    }
}

/// Policy for listing pages that redirect, error, or time out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingFailurePolicy {
    /// Record a warning and continue with the next page
    #[default]
    Skip,
    /// Stop the whole crawl
    Abort,
}

/// Transient-failure backoff
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Delay increment after every failed attempt (seconds)
    #[serde(rename = "backoff-step-secs")]
    pub backoff_step_secs: u64,

    /// Delay ceiling (seconds)
    #[serde(rename = "backoff-cap-secs")]
    pub backoff_cap_secs: u64,

    /// Wall-clock budget for one fetch sequence (seconds); unbounded when absent
    #[serde(rename = "fetch-deadline-secs")]
    pub fetch_deadline_secs: Option<u64>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            backoff_step_secs: 5,
            backoff_cap_secs: 30,
            fetch_deadline_secs: None,
        }
    }
}

/// Where results go and which assets are acquired
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root directory for the `books/` and `images/` trees
    #[serde(rename = "dest-folder")]
    pub dest_folder: PathBuf,

    /// Directory for `books.json`; defaults to `dest-folder`
    #[serde(rename = "json-path")]
    pub json_path: Option<PathBuf>,

    /// Do not download cover images
    #[serde(rename = "skip-images")]
    pub skip_images: bool,

    /// Do not download book texts
    #[serde(rename = "skip-text")]
    pub skip_text: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dest_folder: PathBuf::from("downloaded_books"),
            json_path: None,
            skip_images: false,
            skip_text: false,
        }
    }
}

impl OutputConfig {
    /// Directory receiving book texts
    pub fn books_dir(&self) -> PathBuf {
        self.dest_folder.join("books")
    }

    /// Directory receiving cover images
    pub fn images_dir(&self) -> PathBuf {
        self.dest_folder.join("images")
    }

    /// Full path of the catalog JSON file
    pub fn catalog_path(&self) -> PathBuf {
        self.json_path
            .as_ref()
            .unwrap_or(&self.dest_folder)
            .join("books.json")
    }
}

/// CSS selectors describing the site's markup
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Heading holding "title :: author"
    pub heading: String,

    /// Separator between title and author inside the heading
    #[serde(rename = "title-delimiter")]
    pub title_delimiter: String,

    /// Cover `<img>` element
    #[serde(rename = "cover-image")]
    pub cover_image: String,

    /// Genre links
    pub genres: String,

    /// Comment bodies
    pub comments: String,

    /// Candidate elements for the text download link
    #[serde(rename = "text-link")]
    pub text_link: String,

    /// Visible label of the text download link
    #[serde(rename = "text-link-label")]
    pub text_link_label: String,

    /// Detail-page links on a listing page
    #[serde(rename = "book-links")]
    pub book_links: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            heading: "h1".to_string(),
            title_delimiter: "::".to_string(),
            cover_image: "div.bookimage img".to_string(),
            genres: "span.d_book a".to_string(),
            comments: "div.texts span.black".to_string(),
            text_link: "a[href]".to_string(),
            text_link_label: "скачать txt".to_string(),
            book_links: "table.d_book div.bookimage a[href]".to_string(),
        }
    }
}

/// HTTP client settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Whole-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Connect timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("tome-harvest/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}
