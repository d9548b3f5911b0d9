//! Statistics generation from a finished harvest
//!
//! This module provides functionality for summarizing and displaying
//! the outcome of a run.

use crate::crawler::CrawlReport;
use crate::state::BookState;
use std::collections::HashMap;

/// Harvest statistics summary
#[derive(Debug, Clone, Default)]
pub struct RunStatistics {
    /// Detail-page URLs found on the listing pages
    pub candidates: usize,

    /// Books that made it into the catalog
    pub books: usize,

    /// Books with every requested asset in place
    pub complete: usize,

    /// Books kept without their text
    pub partial: usize,

    /// Count of outcomes by state
    pub outcomes_by_state: HashMap<BookState, usize>,

    /// Warning messages in the order they were recorded
    pub warnings: Vec<String>,
}

impl RunStatistics {
    /// Summarizes a run report
    pub fn from_report(report: &CrawlReport) -> Self {
        let mut outcomes_by_state = HashMap::new();
        for state in BookState::all_states() {
            let count = report.log.count(state);
            if count > 0 {
                outcomes_by_state.insert(state, count);
            }
        }

        let warnings = report
            .log
            .warnings()
            .map(|outcome| format!("{}: {}", outcome.url, outcome.message))
            .collect();

        Self {
            candidates: report.candidates,
            books: report.books.len(),
            complete: report.complete_count(),
            partial: report.partial_count(),
            outcomes_by_state,
            warnings,
        }
    }

    /// Share of listed books that reached the catalog, in percent
    pub fn success_rate(&self) -> f64 {
        if self.candidates > 0 {
            (self.books as f64 / self.candidates as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &RunStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Overview:");
    println!("  Book pages listed: {}", stats.candidates);
    println!("  Books in catalog: {}", stats.books);
    println!("  Complete: {}", stats.complete);
    println!("  Image-only: {}", stats.partial);
    println!();

    println!("Outcomes by State:");
    let mut state_counts: Vec<_> = stats.outcomes_by_state.iter().collect();
    state_counts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.as_str().cmp(b.0.as_str())));

    for (state, count) in state_counts {
        println!("  {}: {}", state, count);
    }
    println!();

    if !stats.warnings.is_empty() {
        println!("Warnings ({}):", stats.warnings.len());
        for warning in &stats.warnings {
            println!("  - {}", warning);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} books acquired)",
        stats.success_rate(),
        stats.books,
        stats.candidates
    );
}
