//! Asset module: local layout and downloads
//!
//! This module owns everything about where book assets land on disk:
//! - Sanitizing titles into valid file names
//! - Deriving deterministic text and image paths
//! - Downloading assets and writing them to those paths

mod materializer;
mod paths;

pub use materializer::AssetMaterializer;
pub use paths::{book_path, image_path, sanitize_file_name};
