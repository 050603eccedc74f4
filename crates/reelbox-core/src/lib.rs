//! Session controller for the reelbox movie browser.
//!
//! Turns keystrokes into debounced, cancelable catalog searches, runs a
//! second cancelable fetch for the selected title, and keeps the watched
//! list consistent with both. All state changes happen on the task that
//! owns the [`SessionCoordinator`]; background fetches only post
//! [`SessionEvent`]s back to it.

/// Input debouncing.
pub mod debounce;
/// Detail view session.
pub mod detail;
/// Error taxonomy shared by the sessions.
pub mod error;
/// Internal events posted by timers and fetch tasks.
pub mod event;
/// Domain data model.
pub mod model;
/// Request lifecycle primitives.
pub mod request;
/// Search session.
pub mod search;
/// Watched titles collection.
pub mod watched;

mod coordinator;

pub use coordinator::{Intent, SessionCoordinator, SessionOptions, Snapshot};
pub use error::SessionError;
pub use event::SessionEvent;
pub use model::{DetailRecord, SearchResultItem, UserRating, WatchedEntry, WatchedSummary};
pub use request::RequestState;
