//! Tome-Harvest: a resilient book-catalog harvester
//!
//! This crate walks the paginated listing of a book catalog, resolves every listed
//! book to its detail page, extracts its metadata, and downloads the text and cover
//! assets into a deterministic local layout.

pub mod assets;
pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for run-level failures
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Listing page {page} unavailable: {source}")]
    Listing { page: u32, source: FetchError },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Catalog serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector in config: {0}")]
    InvalidSelector(String),
}

/// Outcome of a single logical GET that did not produce a usable response
///
/// Only `Network` is transient; the retry loop absorbs it and never hands it to
/// callers. Everything else is permanent for the requested URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("Resource no longer exists at {url} (redirected to {location})")]
    Redirected { url: String, location: String },

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Invalid request for {url}: {message}")]
    InvalidRequest { url: String, message: String },

    #[error("Gave up on {url} after {attempts} attempts: deadline exceeded")]
    DeadlineExceeded { url: String, attempts: u32 },
}

impl FetchError {
    /// Returns true if another attempt may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// Returns true if the resource is gone (redirected or error status)
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Redirected { .. } | Self::HttpStatus { .. })
    }
}

/// Errors raised while turning a detail page into a book
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("Malformed page {url}: {reason}")]
    MalformedPage { url: String, reason: String },

    #[error("Missing element '{selector}' on {url}")]
    MissingElement { url: String, selector: String },

    #[error("No text download link on {url}")]
    NoTextAvailable { url: String },
}

impl ExtractionError {
    /// Returns true if the error only affects text acquisition
    pub fn is_partial(&self) -> bool {
        matches!(self, Self::NoTextAvailable { .. })
    }
}

/// Errors raised while materializing a single asset
#[derive(Debug, Error)]
pub enum AssetError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// Result type alias for run-level operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Book, Coordinator, CrawlReport};
pub use state::{BookState, OutcomeLog};
