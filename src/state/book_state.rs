//! Book outcome definitions for tracking acquisition results
//!
//! This module defines every outcome a listed book (or listing page) can end in.
use crate::{ExtractionError, FetchError};
use std::fmt;

/// Represents how the acquisition of one catalog entry ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookState {
    // ===== Success States =====
    /// Book parsed and every requested asset written
    Acquired,

    /// Book parsed, but the page offers no text download
    Partial,

    // ===== Degraded States =====
    /// Book kept, but one of its asset downloads failed
    AssetFailed,

    // ===== Skip States =====
    /// Detail page redirected or returned an error status
    NotFound,

    /// Detail page did not match the expected layout
    Malformed,

    /// Retrying ran past the fetch deadline
    TimedOut,

    /// A listing page could not be fetched and was skipped
    ListingSkipped,
}

impl BookState {
    /// Returns true if the book ends up in the catalog
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Acquired | Self::Partial | Self::AssetFailed)
    }

    /// Returns true if the entry was dropped
    pub fn is_skipped(&self) -> bool {
        matches!(
            self,
            Self::NotFound | Self::Malformed | Self::TimedOut | Self::ListingSkipped
        )
    }

    /// Returns true if the outcome deserves a warning
    ///
    /// Partial books are an expected outcome and are not warned about.
    pub fn is_warning(&self) -> bool {
        !matches!(self, Self::Acquired | Self::Partial)
    }

    /// State of a book whose detail page could not be fetched
    pub fn for_fetch_error(error: &FetchError) -> Self {
        match error {
            FetchError::DeadlineExceeded { .. } => Self::TimedOut,
            FetchError::Redirected { .. }
            | FetchError::HttpStatus { .. }
            | FetchError::InvalidRequest { .. }
            | FetchError::Network { .. } => Self::NotFound,
        }
    }

    /// State of a book whose detail page could not be parsed
    pub fn for_extraction_error(error: &ExtractionError) -> Self {
        if error.is_partial() {
            Self::Partial
        } else {
            Self::Malformed
        }
    }

    /// Short machine-friendly name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Acquired => "acquired",
            Self::Partial => "partial",
            Self::AssetFailed => "asset_failed",
            Self::NotFound => "not_found",
            Self::Malformed => "malformed",
            Self::TimedOut => "timed_out",
            Self::ListingSkipped => "listing_skipped",
        }
    }

    /// Returns all possible states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Acquired,
            Self::Partial,
            Self::AssetFailed,
            Self::NotFound,
            Self::Malformed,
            Self::TimedOut,
            Self::ListingSkipped,
        ]
    }
}

impl fmt::Display for BookState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
