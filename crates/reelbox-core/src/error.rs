//! Session error taxonomy.
//!
//! The `Display` text of each variant is the message shown to the user, so a
//! session stores `err.to_string()` in its `Failure` state.

/// Message for queries below the minimum length.
pub const QUERY_TOO_SHORT_MESSAGE: &str = "Input keyword minimum 3 chars.";

/// Message for a negative catalog answer that carries no text of its own.
pub const NO_RESULTS_MESSAGE: &str = "No results found";

/// Which fetch a transport failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchScope {
    /// Free-text search.
    Search,
    /// Single-title detail.
    Detail,
}

impl FetchScope {
    /// User-facing message for a transport failure in this scope.
    #[must_use]
    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::Search => "Failed to fetch movies. Please try again later.",
            Self::Detail => "Failed to fetch movie details.",
        }
    }
}

/// Errors recovered at the session boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[allow(clippy::module_name_repetitions)]
pub enum SessionError {
    /// The debounced query is shorter than the minimum; no request was made.
    #[error("{}", QUERY_TOO_SHORT_MESSAGE)]
    QueryTooShort,
    /// The catalog answered negatively, optionally with its own message.
    #[error("{}", .0.as_deref().unwrap_or(NO_RESULTS_MESSAGE))]
    NotFound(Option<String>),
    /// The catalog could not be reached or answered garbage.
    #[error("{}", .scope.failure_message())]
    Transport {
        /// Which fetch failed.
        scope: FetchScope,
        /// Error chain, kept for logs only.
        cause: String,
    },
    /// A runtime string has no leading minute count.
    #[error("runtime {0:?} has no leading minute count")]
    Parse(String),
    /// A rating was submitted while no detail record was loaded.
    #[error("No movie details are loaded.")]
    NoDetailLoaded,
    /// A rating was submitted for a title already in the watched list.
    #[error("{0} is already in the watched list.")]
    AlreadyWatched(String),
    /// A rating outside 1..=5 was submitted.
    #[error("Rating must be between 1 and 5, got {0}.")]
    InvalidRating(u8),
}
