//! Session coordinator: the single owner of all session state.

use std::sync::Arc;
use std::time::Duration;

use reelbox_api::omdb::CatalogApi;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::debounce::{DEFAULT_DEBOUNCE, QueryDebouncer};
use crate::detail::{DetailSession, Submitted};
use crate::error::SessionError;
use crate::event::SessionEvent;
use crate::model::{DetailRecord, SearchResultItem, UserRating, WatchedEntry, WatchedSummary};
use crate::request::RequestState;
use crate::search::SearchSession;
use crate::watched::WatchedCollection;

/// Coordinator tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Quiet period before a query reaches the search session.
    pub debounce: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

/// A user intent. These are the only mutation paths into the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// The raw query text changed.
    SetQuery(String),
    /// A title was picked (picking the open one closes it).
    SelectId(String),
    /// The open title was rated 1 to 5 and marked as watched.
    SubmitRating(u8),
    /// A watched entry was deleted.
    DeleteWatched(String),
    /// The detail view was dismissed.
    CloseDetail,
}

/// Read-only view of the session for the presentation layer.
#[derive(Debug)]
pub struct Snapshot<'a> {
    /// Raw query text as typed.
    pub query: &'a str,
    /// Search request state for the latest debounced query.
    pub search: &'a RequestState<Vec<SearchResultItem>>,
    /// Detail request state for the selected id.
    pub detail: &'a RequestState<DetailRecord>,
    /// Selected id, if the detail view is open.
    pub selected_id: Option<&'a str>,
    /// Whether the selected id is already watched.
    pub is_watched: bool,
    /// The user's rating for the selected id, if watched.
    pub existing_user_rating: Option<UserRating>,
    /// Watched entries in insertion order.
    pub watched: &'a [WatchedEntry],
    /// Aggregates over the watched entries.
    pub summary: WatchedSummary,
}

/// Composes the debouncer, both sessions and the watched list.
///
/// Owns the receiving end of the event channel; timers and fetch tasks hold
/// senders. Events are applied in the order they arrive, and each session
/// discards completions whose ticket has been superseded.
pub struct SessionCoordinator<C> {
    /// Catalog shared with fetch tasks.
    catalog: Arc<C>,
    /// Raw query text.
    query: String,
    /// Query debouncer.
    debouncer: QueryDebouncer,
    /// Search session.
    search: SearchSession,
    /// Detail session.
    detail: DetailSession,
    /// Watched list.
    watched: WatchedCollection,
    /// Sender handed to fetch tasks.
    events_tx: UnboundedSender<SessionEvent>,
    /// Internal event queue.
    events_rx: UnboundedReceiver<SessionEvent>,
}

impl<C> std::fmt::Debug for SessionCoordinator<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCoordinator")
            .field("query", &self.query)
            .field("search", &self.search)
            .field("detail", &self.detail)
            .field("watched", &self.watched)
            .finish_non_exhaustive()
    }
}

impl<C> SessionCoordinator<C>
where
    C: CatalogApi + Send + Sync + 'static,
{
    /// Creates an idle coordinator over `catalog`.
    #[must_use]
    pub fn new(catalog: Arc<C>, options: SessionOptions) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            catalog,
            query: String::new(),
            debouncer: QueryDebouncer::new(options.debounce, events_tx.clone()),
            search: SearchSession::new(),
            detail: DetailSession::new(),
            watched: WatchedCollection::new(),
            events_tx,
            events_rx,
        }
    }

    /// Applies an intent.
    ///
    /// # Errors
    ///
    /// Only [`Intent::SubmitRating`] can fail; see
    /// [`submit_rating`](Self::submit_rating).
    pub fn dispatch(&mut self, intent: Intent) -> Result<(), SessionError> {
        match intent {
            Intent::SetQuery(query) => self.set_query(query),
            Intent::SelectId(id) => self.select_id(&id),
            Intent::SubmitRating(stars) => {
                self.submit_rating(stars)?;
            }
            Intent::DeleteWatched(id) => {
                self.delete_watched(&id);
            }
            Intent::CloseDetail => self.close_detail(),
        }
        Ok(())
    }

    /// Updates the raw query and restarts the debounce timer.
    ///
    /// Must be called from within a tokio runtime.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.debouncer.push(self.query.clone());
    }

    /// Opens `id`, or closes the detail view if `id` is already open.
    ///
    /// Must be called from within a tokio runtime.
    pub fn select_id(&mut self, id: &str) {
        self.detail.start(id, &self.catalog, &self.events_tx);
    }

    /// Closes the detail view.
    pub fn close_detail(&mut self) {
        self.detail.close();
    }

    /// Marks the open title as watched with the user's rating.
    ///
    /// # Errors
    ///
    /// See [`DetailSession::submit_rating`].
    pub fn submit_rating(&mut self, stars: u8) -> Result<Submitted, SessionError> {
        self.detail.submit_rating(stars, &mut self.watched)
    }

    /// Deletes a watched entry. Returns `false` if `id` was not watched.
    pub fn delete_watched(&mut self, id: &str) -> bool {
        let removed = self.watched.remove(id).is_some();
        if removed {
            tracing::info!(id, "removed from watched list");
        }
        removed
    }

    /// Waits for the next internal event.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.events_rx.recv().await
    }

    /// Applies one internal event. Returns `true` if state changed.
    pub fn handle_event(&mut self, event: SessionEvent) -> bool {
        match event {
            SessionEvent::QueryDebounced { ticket, query } => {
                if !self.debouncer.accept(ticket) {
                    return false;
                }
                self.search.start(&query, &self.catalog, &self.events_tx);
                true
            }
            SessionEvent::SearchCompleted { ticket, outcome } => {
                self.search.complete(ticket, outcome)
            }
            SessionEvent::DetailCompleted { ticket, outcome } => {
                self.detail.complete(ticket, outcome)
            }
        }
    }

    /// Waits for the next internal event and applies it.
    pub async fn pump(&mut self) -> bool {
        match self.next_event().await {
            Some(event) => self.handle_event(event),
            None => false,
        }
    }

    /// Returns the read-only view for rendering.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot<'_> {
        let selected_id = self.detail.selected_id();
        Snapshot {
            query: &self.query,
            search: self.search.state(),
            detail: self.detail.state(),
            selected_id,
            is_watched: selected_id.is_some_and(|id| self.watched.contains(id)),
            existing_user_rating: selected_id.and_then(|id| self.watched.rating_for(id)),
            watched: self.watched.entries(),
            summary: self.watched.summary(),
        }
    }
}
