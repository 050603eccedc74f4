//! Events posted to the coordinator by timers and fetch tasks.

use crate::error::SessionError;
use crate::model::{DetailRecord, SearchResultItem};
use crate::request::Ticket;

/// Classified outcome of a search request.
pub type SearchOutcome = Result<Vec<SearchResultItem>, SessionError>;

/// Classified outcome of a detail request.
pub type DetailOutcome = Result<DetailRecord, SessionError>;

/// Everything that can wake the coordinator besides a user intent.
///
/// Each event carries the ticket captured when its work was started; the
/// receiving component discards it if a newer trigger has since superseded
/// that ticket.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum SessionEvent {
    /// The query stayed unchanged for the full debounce delay.
    QueryDebounced {
        /// Debouncer ticket.
        ticket: Ticket,
        /// The settled query.
        query: String,
    },
    /// A search request finished.
    SearchCompleted {
        /// Search session ticket.
        ticket: Ticket,
        /// Classified result.
        outcome: SearchOutcome,
    },
    /// A detail request finished.
    DetailCompleted {
        /// Detail session ticket.
        ticket: Ticket,
        /// Classified result.
        outcome: DetailOutcome,
    },
}
