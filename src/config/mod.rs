//! Configuration module for Tome-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! The resulting [`Config`] is built once per run and shared read-only.
//!
//! # Example
//!
//! ```no_run
//! use tome_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Crawling pages {}..={}", config.catalog.start_page, config.catalog.end_page);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CatalogConfig, Config, HttpConfig, LayoutConfig, ListingFailurePolicy, OutputConfig,
    RetryConfig,
};

// Re-export parser functions
pub use parser::{load_config, read_config, read_config_with_hash};
pub use validation::validate;
pub(crate) use validation::parse_selector;
