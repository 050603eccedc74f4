//! Search session: debounced query in, cancelable catalog search out.

use std::sync::Arc;

use reelbox_api::omdb::{CatalogApi, SearchResponse};
use tokio::sync::mpsc::UnboundedSender;

use crate::error::{FetchScope, SessionError};
use crate::event::{SearchOutcome, SessionEvent};
use crate::model::SearchResultItem;
use crate::request::{RequestState, RequestToken, TaskSlot, Ticket};

/// Minimum number of characters before a query reaches the catalog.
///
/// Counted in `char`s after trimming surrounding whitespace, so `"ab "`
/// is two characters and is rejected.
pub const MIN_QUERY_CHARS: usize = 3;

/// Owns the search results for the latest debounced query.
#[derive(Debug, Default)]
#[allow(clippy::module_name_repetitions)]
pub struct SearchSession {
    /// The latest debounced query, trimmed.
    query: String,
    /// Request state over the ordered result list.
    state: RequestState<Vec<SearchResultItem>>,
    /// Generation of the latest request.
    token: RequestToken,
    /// In-flight fetch task.
    in_flight: TaskSlot,
}

impl SearchSession {
    /// Creates an idle session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the latest debounced query.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Returns the current request state.
    #[must_use]
    pub const fn state(&self) -> &RequestState<Vec<SearchResultItem>> {
        &self.state
    }

    /// Transitions for a new debounced query.
    ///
    /// Returns the ticket for the request to issue, or `None` when no request
    /// is needed:
    ///
    /// - the query is too short; prior results are cleared and any in-flight
    ///   request is superseded.
    /// - the query equals the current one and its results are loaded or
    ///   still in flight; the state is left untouched.
    pub fn begin(&mut self, query: &str) -> Option<Ticket> {
        let query = query.trim();
        if query == self.query && self.is_settled_or_pending() {
            tracing::debug!(query, "query unchanged, keeping current results");
            return None;
        }
        self.query = String::from(query);

        if query.chars().count() < MIN_QUERY_CHARS {
            tracing::debug!(query, "query below minimum length, not searching");
            self.cancel();
            self.state = RequestState::Failure(SessionError::QueryTooShort.to_string());
            return None;
        }

        self.state = RequestState::Loading;
        Some(self.token.issue())
    }

    /// Starts a search for `query` on a background task.
    ///
    /// Returns `false` if no request was issued (see [`Self::begin`]). The
    /// previous in-flight request, if any, is aborted.
    pub fn start<C>(
        &mut self,
        query: &str,
        catalog: &Arc<C>,
        events: &UnboundedSender<SessionEvent>,
    ) -> bool
    where
        C: CatalogApi + Send + Sync + 'static,
    {
        let Some(ticket) = self.begin(query) else {
            return false;
        };

        tracing::debug!(query = %self.query, "searching catalog");
        let catalog = Arc::clone(catalog);
        let events = events.clone();
        let query = self.query.clone();
        self.in_flight.replace(tokio::spawn(async move {
            let outcome = classify_search(catalog.search(&query).await);
            // The receiver only disappears when the coordinator is gone.
            let _ = events.send(SessionEvent::SearchCompleted { ticket, outcome });
        }));
        true
    }

    /// Applies a finished request unless it has been superseded.
    ///
    /// Returns `true` if the state changed.
    pub fn complete(&mut self, ticket: Ticket, outcome: SearchOutcome) -> bool {
        if !self.token.is_current(ticket) {
            tracing::debug!("discarding stale search response");
            return false;
        }
        self.in_flight.release();

        self.state = match outcome {
            Ok(items) => {
                tracing::debug!(query = %self.query, results = items.len(), "search completed");
                RequestState::Success(items)
            }
            Err(err) => {
                if let SessionError::Transport { cause, .. } = &err {
                    tracing::warn!(query = %self.query, %cause, "search request failed");
                }
                RequestState::Failure(err.to_string())
            }
        };
        true
    }

    /// Whether the current query already has results or a live request.
    const fn is_settled_or_pending(&self) -> bool {
        match self.state {
            RequestState::Success(_) => true,
            RequestState::Loading => self.in_flight.is_occupied(),
            RequestState::Idle | RequestState::Failure(_) => false,
        }
    }

    /// Supersedes and aborts the in-flight request, if any.
    pub fn cancel(&mut self) {
        self.token.invalidate();
        self.in_flight.abort();
    }
}

/// Classifies a raw catalog search result.
///
/// A positive answer with no hits is a success with an empty list; the
/// presentation layer renders it as "no results".
///
/// # Errors
///
/// - [`SessionError::Transport`] when the call itself failed.
/// - [`SessionError::NotFound`] when the catalog answered negatively.
pub fn classify_search(result: anyhow::Result<SearchResponse>) -> SearchOutcome {
    let response = result.map_err(|err| SessionError::Transport {
        scope: FetchScope::Search,
        cause: format!("{err:#}"),
    })?;

    if !response.is_success() {
        return Err(SessionError::NotFound(response.error));
    }

    Ok(response
        .search
        .unwrap_or_default()
        .into_iter()
        .map(SearchResultItem::from)
        .collect())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use super::*;

    fn fixture(json: &str) -> SearchResponse {
        serde_json::from_str(json).unwrap()
    }

    fn item(id: &str) -> SearchResultItem {
        SearchResultItem {
            id: String::from(id),
            title: String::from("Title"),
            year: String::from("2000"),
            poster_url: String::new(),
        }
    }

    #[test]
    fn test_short_queries_fail_without_ticket() {
        for query in ["", "u", "up", "  up  "] {
            // Arrange
            let mut session = SearchSession::new();

            // Act
            let ticket = session.begin(query);

            // Assert
            assert!(ticket.is_none(), "query {query:?} should be rejected");
            assert_eq!(
                session.state(),
                &RequestState::Failure(String::from("Input keyword minimum 3 chars."))
            );
        }
    }

    #[test]
    fn test_short_query_clears_previous_results() {
        // Arrange
        let mut session = SearchSession::new();
        let ticket = session.begin("superman").unwrap();
        session.complete(ticket, Ok(vec![item("tt0770828")]));

        // Act
        session.begin("su");

        // Assert
        assert!(session.state().success().is_none());
        assert_eq!(session.query(), "su");
    }

    #[test]
    fn test_short_query_supersedes_in_flight_request() {
        // Arrange
        let mut session = SearchSession::new();
        let ticket = session.begin("superman").unwrap();

        // Act
        session.begin("s");
        let applied = session.complete(ticket, Ok(vec![item("tt0770828")]));

        // Assert
        assert!(!applied);
        assert!(session.state().failure().is_some());
    }

    #[test]
    fn test_begin_enters_loading() {
        // Arrange
        let mut session = SearchSession::new();

        // Act
        let ticket = session.begin("  bat  ");

        // Assert
        assert!(ticket.is_some());
        assert!(session.state().is_loading());
        assert_eq!(session.query(), "bat");
    }

    #[test]
    fn test_multibyte_query_counts_characters() {
        // Arrange
        let mut session = SearchSession::new();

        // Act
        let ticket = session.begin("千と千");

        // Assert
        assert!(ticket.is_some());
    }

    #[test]
    fn test_older_response_never_overwrites_newer_request() {
        // Arrange
        let mut session = SearchSession::new();
        let old = session.begin("bat").unwrap();
        let new = session.begin("batman").unwrap();

        // Act
        let applied_new = session.complete(new, Ok(vec![item("tt0372784")]));
        let applied_old = session.complete(old, Ok(vec![item("tt0096895")]));

        // Assert
        assert!(applied_new);
        assert!(!applied_old);
        assert_eq!(session.state().success().unwrap()[0].id, "tt0372784");
    }

    #[test]
    fn test_cancel_discards_late_response() {
        // Arrange
        let mut session = SearchSession::new();
        let ticket = session.begin("batman").unwrap();

        // Act
        session.cancel();
        let applied = session.complete(ticket, Ok(vec![item("tt0372784")]));

        // Assert
        assert!(!applied);
        assert!(session.state().is_loading());
    }

    #[test]
    fn test_unchanged_query_keeps_loaded_results() {
        // Arrange
        let mut session = SearchSession::new();
        let ticket = session.begin("superman").unwrap();
        session.complete(ticket, Ok(vec![item("tt0770828")]));

        // Act
        let again = session.begin(" superman ");

        // Assert
        assert!(again.is_none());
        assert_eq!(session.state().success().unwrap()[0].id, "tt0770828");
    }

    #[test]
    fn test_unchanged_query_after_failure_searches_again() {
        // Arrange
        let mut session = SearchSession::new();
        let ticket = session.begin("superman").unwrap();
        session.complete(
            ticket,
            Err(SessionError::Transport {
                scope: FetchScope::Search,
                cause: String::from("connection reset"),
            }),
        );

        // Act
        let again = session.begin("superman");

        // Assert
        assert!(again.is_some());
        assert!(session.state().is_loading());
    }

    #[test]
    fn test_failure_outcome_sets_message() {
        // Arrange
        let mut session = SearchSession::new();
        let ticket = session.begin("zzzzzz").unwrap();

        // Act
        session.complete(
            ticket,
            Err(SessionError::NotFound(Some(String::from("Movie not found!")))),
        );

        // Assert
        assert_eq!(session.state().failure(), Some("Movie not found!"));
    }

    #[test]
    fn test_classify_success_preserves_catalog_order() {
        // Arrange
        let response = fixture(include_str!("../../../fixtures/omdb/search_superman.json"));

        // Act
        let items = classify_search(Ok(response)).unwrap();

        // Assert
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(
            ids,
            [
                "tt0770828",
                "tt0348150",
                "tt0078346",
                "tt0081573",
                "tt0115378"
            ]
        );
    }

    #[test]
    fn test_classify_negative_answer_uses_catalog_message() {
        // Arrange
        let response = fixture(include_str!("../../../fixtures/omdb/search_not_found.json"));

        // Act
        let result = classify_search(Ok(response));

        // Assert
        assert_eq!(
            result,
            Err(SessionError::NotFound(Some(String::from("Movie not found!"))))
        );
    }

    #[test]
    fn test_classify_negative_answer_without_message() {
        // Arrange
        let response = fixture(r#"{"Response":"False"}"#);

        // Act
        let err = classify_search(Ok(response)).unwrap_err();

        // Assert
        assert_eq!(err.to_string(), "No results found");
    }

    #[test]
    fn test_classify_positive_answer_without_hits_is_empty_success() {
        // Arrange
        let response = fixture(r#"{"Response":"True","Search":[],"totalResults":"0"}"#);

        // Act
        let items = classify_search(Ok(response)).unwrap();

        // Assert
        assert!(items.is_empty());
    }

    #[test]
    fn test_classify_transport_failure() {
        // Arrange
        let result = Err(anyhow::anyhow!("connection refused"));

        // Act
        let err = classify_search(result).unwrap_err();

        // Assert
        assert_eq!(
            err.to_string(),
            "Failed to fetch movies. Please try again later."
        );
        assert!(matches!(
            err,
            SessionError::Transport {
                scope: FetchScope::Search,
                ..
            }
        ));
    }
}
