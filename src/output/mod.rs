//! Output module for the catalog file and run summaries
//!
//! This module handles:
//! - Writing the JSON catalog of acquired books
//! - Computing and printing run statistics

mod catalog;
pub mod stats;

pub use catalog::{render_catalog, write_catalog};
pub use stats::{print_statistics, RunStatistics};
