//! State module for tracking crawl outcomes
//!
//! # Components
//!
//! - `BookState`: How the acquisition of one listed book ended
//! - `OutcomeLog`: The ordered, explicit record of all outcomes of a run

mod book_state;
mod outcome_log;

// Re-export main types
pub use book_state::BookState;
pub use outcome_log::{Outcome, OutcomeLog};
