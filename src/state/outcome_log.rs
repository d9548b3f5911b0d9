use crate::state::BookState;

/// One recorded outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// URL the outcome refers to (detail page, asset, or listing page)
    pub url: String,

    /// Book id, when one could be derived
    pub book_id: Option<String>,

    pub state: BookState,

    /// Human-readable cause
    pub message: String,
}

/// Ordered record of everything that happened during a crawl
///
/// The log is owned by whoever drives the crawl and handed back in the final
/// report. Every entry is mirrored to `tracing` as it is recorded.
#[derive(Debug, Clone, Default)]
pub struct OutcomeLog {
    entries: Vec<Outcome>,
}

impl OutcomeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an outcome and mirrors it to the tracing subscriber
    pub fn record(
        &mut self,
        url: impl Into<String>,
        book_id: Option<&str>,
        state: BookState,
        message: impl Into<String>,
    ) {
        let outcome = Outcome {
            url: url.into(),
            book_id: book_id.map(str::to_string),
            state,
            message: message.into(),
        };

        if state.is_warning() {
            tracing::warn!(
                url = %outcome.url,
                book_id = outcome.book_id.as_deref().unwrap_or("-"),
                state = %state,
                "{}",
                outcome.message
            );
        } else {
            tracing::info!(
                url = %outcome.url,
                book_id = outcome.book_id.as_deref().unwrap_or("-"),
                state = %state,
                "{}",
                outcome.message
            );
        }

        self.entries.push(outcome);
    }

    /// Appends another log, keeping its order
    pub fn extend(&mut self, other: OutcomeLog) {
        self.entries.extend(other.entries);
    }

    pub fn entries(&self) -> &[Outcome] {
        &self.entries
    }

    /// Entries that are warnings
    pub fn warnings(&self) -> impl Iterator<Item = &Outcome> {
        self.entries.iter().filter(|o| o.state.is_warning())
    }

    /// Number of entries in the given state
    pub fn count(&self, state: BookState) -> usize {
        self.entries.iter().filter(|o| o.state == state).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
