use serde::Serialize;
use std::path::PathBuf;
use url::Url;

/// A single catalog entry
///
/// Built once from a parsed detail page; local paths are filled in only for the
/// assets the run actually acquires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Book {
    /// Numeric id taken from the detail-page URL
    pub id: String,

    /// Filesystem-safe title
    pub title: String,

    pub author: String,

    pub genres: Vec<String>,

    pub comments: Vec<String>,

    /// Absolute cover image URL
    pub image_url: Url,

    /// Absolute text download URL; absent when the page offers none
    pub text_url: Option<Url>,

    /// Local copy of the text
    pub book_path: Option<PathBuf>,

    /// Local copy of the cover
    pub image_path: Option<PathBuf>,
}
