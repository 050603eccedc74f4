//! Request lifecycle primitives shared by the debouncer and both sessions.
//!
//! Every trigger (keystroke, debounced query, selection) issues a new
//! [`Ticket`] from a [`RequestToken`]. Work started for that trigger carries
//! the ticket and may only mutate state while it is still current.

use tokio::task::JoinHandle;

/// State of one asynchronous request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestState<T> {
    /// Nothing requested yet.
    Idle,
    /// A request is in flight.
    Loading,
    /// The latest request succeeded.
    Success(T),
    /// The latest request failed; holds the user-facing message.
    Failure(String),
}

impl<T> Default for RequestState<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> RequestState<T> {
    /// Returns `true` while a request is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Returns the success value, if any.
    #[must_use]
    pub const fn success(&self) -> Option<&T> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the failure message, if any.
    #[must_use]
    pub fn failure(&self) -> Option<&str> {
        match self {
            Self::Failure(message) => Some(message),
            _ => None,
        }
    }
}

/// Generation captured when a request was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Generation counter deciding which ticket may still apply its result.
#[derive(Debug, Default)]
pub struct RequestToken {
    generation: u64,
}

impl RequestToken {
    /// Issues a new ticket, superseding every earlier one.
    pub const fn issue(&mut self) -> Ticket {
        self.generation = self.generation.wrapping_add(1);
        Ticket(self.generation)
    }

    /// Supersedes every issued ticket without issuing a new one.
    pub const fn invalidate(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    /// Returns `true` if `ticket` is the most recently issued one.
    #[must_use]
    pub const fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.generation
    }
}

/// Holds at most one background task; replacing or dropping it aborts the
/// previous one.
#[derive(Debug, Default)]
pub struct TaskSlot {
    handle: Option<JoinHandle<()>>,
}

impl TaskSlot {
    /// Stores `handle`, aborting the task it replaces.
    pub fn replace(&mut self, handle: JoinHandle<()>) {
        if let Some(previous) = self.handle.replace(handle) {
            previous.abort();
        }
    }

    /// Aborts the held task, if any.
    pub fn abort(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Forgets the held task without aborting it (it has finished).
    pub fn release(&mut self) {
        self.handle = None;
    }

    /// Returns `true` while a task is held.
    #[must_use]
    pub const fn is_occupied(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for TaskSlot {
    fn drop(&mut self) {
        self.abort();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_newest_ticket_is_current() {
        // Arrange
        let mut token = RequestToken::default();

        // Act
        let first = token.issue();
        let second = token.issue();

        // Assert
        assert!(!token.is_current(first));
        assert!(token.is_current(second));
    }

    #[test]
    fn test_invalidate_supersedes_outstanding_ticket() {
        // Arrange
        let mut token = RequestToken::default();
        let ticket = token.issue();

        // Act
        token.invalidate();

        // Assert
        assert!(!token.is_current(ticket));
    }

    #[test]
    fn test_request_state_accessors() {
        // Arrange
        let idle: RequestState<u32> = RequestState::default();
        let loading: RequestState<u32> = RequestState::Loading;
        let success = RequestState::Success(7);
        let failure: RequestState<u32> = RequestState::Failure(String::from("boom"));

        // Act & Assert
        assert_eq!(idle, RequestState::Idle);
        assert!(loading.is_loading());
        assert_eq!(success.success(), Some(&7));
        assert_eq!(failure.failure(), Some("boom"));
        assert!(success.failure().is_none());
    }

    /// Spawns a task that raises `flag` after a minute.
    fn spawn_flagging(flag: &Arc<AtomicBool>) -> JoinHandle<()> {
        let flag = Arc::clone(flag);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(60)).await;
            flag.store(true, Ordering::SeqCst);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_replacing_task_aborts_previous() {
        // Arrange
        let fired = Arc::new(AtomicBool::new(false));
        let mut slot = TaskSlot::default();
        slot.replace(spawn_flagging(&fired));

        // Act
        slot.replace(tokio::spawn(async {}));
        tokio::time::sleep(Duration::from_secs(120)).await;

        // Assert
        assert!(!fired.load(Ordering::SeqCst));
        assert!(slot.is_occupied());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_slot_aborts_task() {
        // Arrange
        let fired = Arc::new(AtomicBool::new(false));
        let mut slot = TaskSlot::default();
        slot.replace(spawn_flagging(&fired));

        // Act
        drop(slot);
        tokio::time::sleep(Duration::from_secs(120)).await;

        // Assert
        assert!(!fired.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_released_task_keeps_running() {
        // Arrange
        let fired = Arc::new(AtomicBool::new(false));
        let mut slot = TaskSlot::default();
        slot.replace(spawn_flagging(&fired));

        // Act
        slot.release();
        drop(slot);
        tokio::time::sleep(Duration::from_secs(120)).await;

        // Assert
        assert!(fired.load(Ordering::SeqCst));
    }
}
