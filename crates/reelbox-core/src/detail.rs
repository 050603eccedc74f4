//! Detail session: selected id in, cancelable detail fetch out.

use std::sync::Arc;

use reelbox_api::omdb::{CatalogApi, TitleDetails};
use tokio::sync::mpsc::UnboundedSender;

use crate::error::{FetchScope, SessionError};
use crate::event::{DetailOutcome, SessionEvent};
use crate::model::{DetailRecord, UserRating, WatchedEntry};
use crate::request::{RequestState, RequestToken, TaskSlot, Ticket};
use crate::watched::WatchedCollection;

/// Result of a successful rating submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submitted {
    /// Id of the entry added to the watched list.
    pub id: String,
    /// Non-fatal problem met while building the entry.
    pub warning: Option<SessionError>,
}

/// Owns the detail record for the currently selected id.
#[derive(Debug, Default)]
#[allow(clippy::module_name_repetitions)]
pub struct DetailSession {
    /// Selected catalog id; `None` when the detail view is closed.
    selected: Option<String>,
    /// Request state over the detail record.
    state: RequestState<DetailRecord>,
    /// Generation of the latest request.
    token: RequestToken,
    /// In-flight fetch task.
    in_flight: TaskSlot,
}

impl DetailSession {
    /// Creates a closed session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the selected id.
    #[must_use]
    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Returns the current request state.
    #[must_use]
    pub const fn state(&self) -> &RequestState<DetailRecord> {
        &self.state
    }

    /// Transitions for a selection.
    ///
    /// Selecting the already selected id closes the view and returns `None`;
    /// any other id replaces the selection and returns the ticket for the
    /// request to issue.
    pub fn select(&mut self, id: &str) -> Option<Ticket> {
        if self.selected.as_deref() == Some(id) {
            self.close();
            return None;
        }

        self.selected = Some(String::from(id));
        self.state = RequestState::Loading;
        Some(self.token.issue())
    }

    /// Selects `id` and fetches its record on a background task.
    ///
    /// The previous in-flight request, if any, is aborted.
    pub fn start<C>(&mut self, id: &str, catalog: &Arc<C>, events: &UnboundedSender<SessionEvent>)
    where
        C: CatalogApi + Send + Sync + 'static,
    {
        let Some(ticket) = self.select(id) else {
            tracing::debug!(id, "selection toggled off");
            return;
        };

        tracing::debug!(id, "fetching title details");
        let catalog = Arc::clone(catalog);
        let events = events.clone();
        let id = String::from(id);
        self.in_flight.replace(tokio::spawn(async move {
            let outcome = classify_detail(catalog.title_details(&id).await);
            // The receiver only disappears when the coordinator is gone.
            let _ = events.send(SessionEvent::DetailCompleted { ticket, outcome });
        }));
    }

    /// Closes the detail view and supersedes any in-flight request.
    pub fn close(&mut self) {
        self.selected = None;
        self.state = RequestState::Idle;
        self.token.invalidate();
        self.in_flight.abort();
    }

    /// Applies a finished request unless it has been superseded.
    ///
    /// Returns `true` if the state changed.
    pub fn complete(&mut self, ticket: Ticket, outcome: DetailOutcome) -> bool {
        if !self.token.is_current(ticket) {
            tracing::debug!("discarding stale detail response");
            return false;
        }
        self.in_flight.release();

        self.state = match outcome {
            Ok(record) => RequestState::Success(record),
            Err(err) => {
                if let SessionError::Transport { cause, .. } = &err {
                    tracing::warn!(id = ?self.selected, %cause, "detail request failed");
                }
                RequestState::Failure(err.to_string())
            }
        };
        true
    }

    /// Adds the loaded record to `watched` with the user's rating, then
    /// closes the detail view.
    ///
    /// An unparseable runtime does not block the add: the entry is stored
    /// with a runtime of 0 and the problem is returned as a warning.
    ///
    /// # Errors
    ///
    /// - [`SessionError::InvalidRating`] if `stars` is outside `1..=5`.
    /// - [`SessionError::NoDetailLoaded`] if no record is loaded.
    /// - [`SessionError::AlreadyWatched`] if the record is already watched.
    pub fn submit_rating(
        &mut self,
        stars: u8,
        watched: &mut WatchedCollection,
    ) -> Result<Submitted, SessionError> {
        let user_rating = UserRating::new(stars)?;
        let RequestState::Success(record) = &self.state else {
            return Err(SessionError::NoDetailLoaded);
        };
        if watched.contains(&record.id) {
            return Err(SessionError::AlreadyWatched(record.id.clone()));
        }

        let (runtime_minutes, warning) = match record.runtime_minutes() {
            Ok(minutes) => (minutes, None),
            Err(err) => {
                tracing::warn!(id = %record.id, %err, "storing watched entry with runtime 0");
                (0, Some(err))
            }
        };

        let entry = WatchedEntry {
            id: record.id.clone(),
            title: record.title.clone(),
            poster_url: record.poster_url.clone(),
            catalog_rating: record.rating,
            user_rating,
            runtime_minutes,
        };
        let id = entry.id.clone();
        watched.add(entry);
        tracing::info!(id, rating = stars, "marked as watched");

        self.close();
        Ok(Submitted { id, warning })
    }
}

/// Classifies a raw catalog detail result.
///
/// # Errors
///
/// - [`SessionError::Transport`] when the call itself failed.
/// - [`SessionError::NotFound`] when the catalog answered negatively
///   (e.g. an unknown id).
pub fn classify_detail(result: anyhow::Result<TitleDetails>) -> DetailOutcome {
    let details = result.map_err(|err| SessionError::Transport {
        scope: FetchScope::Detail,
        cause: format!("{err:#}"),
    })?;

    if !details.is_success() {
        return Err(SessionError::NotFound(details.error));
    }

    Ok(DetailRecord::from(details))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]

    use tracing::subscriber::with_default;
    use tracing_mock::{expect, subscriber};

    use super::*;

    fn record(id: &str, runtime: &str) -> DetailRecord {
        DetailRecord {
            id: String::from(id),
            title: String::from("Man of Steel"),
            year: String::from("2013"),
            poster_url: String::new(),
            release_date: String::from("14 Jun 2013"),
            runtime: String::from(runtime),
            rating: 7.1,
            plot: String::new(),
            genre: String::from("Action, Adventure, Sci-Fi"),
            cast: String::from("Henry Cavill, Amy Adams, Michael Shannon"),
            director: String::from("Zack Snyder"),
        }
    }

    fn loaded(id: &str, runtime: &str) -> DetailSession {
        let mut session = DetailSession::new();
        let ticket = session.select(id).unwrap();
        session.complete(ticket, Ok(record(id, runtime)));
        session
    }

    #[test]
    fn test_select_enters_loading() {
        // Arrange
        let mut session = DetailSession::new();

        // Act
        let ticket = session.select("tt0770828");

        // Assert
        assert!(ticket.is_some());
        assert_eq!(session.selected_id(), Some("tt0770828"));
        assert!(session.state().is_loading());
    }

    #[test]
    fn test_selecting_same_id_toggles_off() {
        // Arrange
        let mut session = DetailSession::new();
        session.select("tt0770828");

        // Act
        let ticket = session.select("tt0770828");

        // Assert
        assert!(ticket.is_none());
        assert_eq!(session.selected_id(), None);
        assert_eq!(session.state(), &RequestState::Idle);
    }

    #[test]
    fn test_selecting_other_id_replaces_and_supersedes() {
        // Arrange
        let mut session = DetailSession::new();
        let first = session.select("tt0770828").unwrap();

        // Act
        let second = session.select("tt0348150").unwrap();
        let applied_first = session.complete(first, Ok(record("tt0770828", "143 min")));

        // Assert
        assert!(!applied_first);
        assert_eq!(session.selected_id(), Some("tt0348150"));
        assert!(session.state().is_loading());
        assert!(session.complete(second, Ok(record("tt0348150", "154 min"))));
    }

    #[test]
    fn test_late_response_after_close_is_discarded() {
        // Arrange
        let mut session = DetailSession::new();
        let ticket = session.select("tt0770828").unwrap();

        // Act
        session.close();
        let applied = session.complete(ticket, Ok(record("tt0770828", "143 min")));

        // Assert
        assert!(!applied);
        assert_eq!(session.selected_id(), None);
        assert_eq!(session.state(), &RequestState::Idle);
    }

    #[test]
    fn test_transport_failure_message() {
        // Arrange
        let mut session = DetailSession::new();
        let ticket = session.select("tt0770828").unwrap();

        // Act
        session.complete(
            ticket,
            classify_detail(Err(anyhow::anyhow!("connection reset"))),
        );

        // Assert
        assert_eq!(session.state().failure(), Some("Failed to fetch movie details."));
    }

    #[test]
    fn test_classify_negative_answer() {
        // Arrange
        let details: TitleDetails =
            serde_json::from_str(r#"{"Response":"False","Error":"Incorrect IMDb ID."}"#).unwrap();

        // Act
        let result = classify_detail(Ok(details));

        // Assert
        assert_eq!(
            result,
            Err(SessionError::NotFound(Some(String::from("Incorrect IMDb ID."))))
        );
    }

    #[test]
    fn test_submit_rating_adds_entry_and_closes() {
        // Arrange
        let mut session = loaded("tt0770828", "143 min");
        let mut watched = WatchedCollection::new();

        // Act
        let submitted = session.submit_rating(4, &mut watched).unwrap();

        // Assert
        assert_eq!(submitted.id, "tt0770828");
        assert!(submitted.warning.is_none());
        let entry = watched.get("tt0770828").unwrap();
        assert_eq!(entry.user_rating.get(), 4);
        assert_eq!(entry.runtime_minutes, 143);
        assert_eq!(entry.catalog_rating, 7.1);
        assert_eq!(session.selected_id(), None);
    }

    #[test]
    fn test_submit_rating_without_record_is_rejected() {
        // Arrange
        let mut session = DetailSession::new();
        session.select("tt0770828");
        let mut watched = WatchedCollection::new();

        // Act
        let result = session.submit_rating(4, &mut watched);

        // Assert
        assert_eq!(result, Err(SessionError::NoDetailLoaded));
        assert!(watched.is_empty());
        assert_eq!(session.selected_id(), Some("tt0770828"));
    }

    #[test]
    fn test_submit_rating_when_already_watched_is_rejected() {
        // Arrange
        let mut watched = WatchedCollection::new();
        loaded("tt0770828", "143 min")
            .submit_rating(3, &mut watched)
            .unwrap();
        let mut session = loaded("tt0770828", "143 min");

        // Act
        let result = session.submit_rating(5, &mut watched);

        // Assert
        assert_eq!(
            result,
            Err(SessionError::AlreadyWatched(String::from("tt0770828")))
        );
        assert_eq!(watched.rating_for("tt0770828").unwrap().get(), 3);
    }

    #[test]
    fn test_submit_rating_out_of_range_is_rejected() {
        // Arrange
        let mut session = loaded("tt0770828", "143 min");
        let mut watched = WatchedCollection::new();

        // Act
        let result = session.submit_rating(6, &mut watched);

        // Assert
        assert_eq!(result, Err(SessionError::InvalidRating(6)));
        assert!(watched.is_empty());
    }

    #[test]
    fn test_submit_rating_with_unparseable_runtime_warns_and_adds() {
        // Arrange
        let mut session = loaded("tt0115378", "N/A");
        let mut watched = WatchedCollection::new();
        let (subscriber, handle) = subscriber::mock()
            .event(
                expect::event()
                    .with_target("reelbox_core::detail")
                    .at_level(tracing::Level::WARN),
            )
            .event(expect::event().with_fields(expect::msg("marked as watched")))
            .only()
            .run_with_handle();

        // Act
        let submitted = with_default(subscriber, || session.submit_rating(2, &mut watched));

        // Assert
        handle.assert_finished();
        let submitted = submitted.unwrap();
        assert_eq!(
            submitted.warning,
            Some(SessionError::Parse(String::from("N/A")))
        );
        assert_eq!(watched.get("tt0115378").unwrap().runtime_minutes, 0);
        assert_eq!(session.selected_id(), None);
    }
}
