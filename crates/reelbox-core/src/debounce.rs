//! Query debouncing on tokio timers.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;

use crate::event::SessionEvent;
use crate::request::{RequestToken, TaskSlot, Ticket};

/// Default quiet period before a query is emitted.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Emits a query only after it has stayed unchanged for `delay`.
///
/// Each [`push`](Self::push) restarts the timer; at most one emission is
/// pending at a time, and a superseded one never reaches the coordinator.
#[derive(Debug)]
pub struct QueryDebouncer {
    /// Quiet period.
    delay: Duration,
    /// Generation of the latest pushed value.
    token: RequestToken,
    /// Pending timer task.
    pending: TaskSlot,
    /// Coordinator event channel.
    events: UnboundedSender<SessionEvent>,
}

impl QueryDebouncer {
    /// Creates a debouncer posting to `events`.
    #[must_use]
    pub fn new(delay: Duration, events: UnboundedSender<SessionEvent>) -> Self {
        Self {
            delay,
            token: RequestToken::default(),
            pending: TaskSlot::default(),
            events,
        }
    }

    /// Returns the configured quiet period.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Restarts the timer with a new value.
    ///
    /// Must be called from within a tokio runtime.
    pub fn push(&mut self, value: String) {
        let ticket = self.token.issue();
        let delay = self.delay;
        let events = self.events.clone();
        self.pending.replace(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // The receiver only disappears when the coordinator is gone.
            let _ = events.send(SessionEvent::QueryDebounced {
                ticket,
                query: value,
            });
        }));
    }

    /// Accepts an emission if it belongs to the latest pushed value.
    pub fn accept(&mut self, ticket: Ticket) -> bool {
        if self.token.is_current(ticket) {
            self.pending.release();
            true
        } else {
            tracing::debug!("dropping superseded debounced query");
            false
        }
    }

    /// Drops the pending emission, if any.
    pub fn cancel(&mut self) {
        self.token.invalidate();
        self.pending.abort();
    }

    /// Returns `true` while an emission is pending.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_occupied()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::panic)]

    use tokio::sync::mpsc;
    use tokio::time::Instant;

    use super::*;

    async fn recv_query(rx: &mut mpsc::UnboundedReceiver<SessionEvent>) -> (Ticket, String) {
        match rx.recv().await.unwrap() {
            SessionEvent::QueryDebounced { ticket, query } => (ticket, query),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_emits_after_delay() {
        // Arrange
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut debouncer = QueryDebouncer::new(DEFAULT_DEBOUNCE, tx);
        let start = Instant::now();

        // Act
        debouncer.push(String::from("batman"));
        let (ticket, query) = recv_query(&mut rx).await;

        // Assert
        assert_eq!(query, "batman");
        assert!(start.elapsed() >= DEFAULT_DEBOUNCE);
        assert!(debouncer.accept(ticket));
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_value_restarts_delay_and_supersedes_previous() {
        // Arrange
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut debouncer = QueryDebouncer::new(DEFAULT_DEBOUNCE, tx);
        let start = Instant::now();

        // Act
        debouncer.push(String::from("bat"));
        tokio::time::sleep(Duration::from_millis(200)).await;
        debouncer.push(String::from("batman"));
        let (ticket, query) = recv_query(&mut rx).await;

        // Assert
        assert_eq!(query, "batman");
        assert!(start.elapsed() >= Duration::from_millis(500));
        assert!(debouncer.accept(ticket));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_emission() {
        // Arrange
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut debouncer = QueryDebouncer::new(DEFAULT_DEBOUNCE, tx);

        // Act
        debouncer.push(String::from("batman"));
        debouncer.cancel();
        tokio::time::sleep(Duration::from_secs(1)).await;

        // Assert
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_prevents_emission() {
        // Arrange
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut debouncer = QueryDebouncer::new(DEFAULT_DEBOUNCE, tx);

        // Act
        debouncer.push(String::from("batman"));
        drop(debouncer);
        tokio::time::sleep(Duration::from_secs(1)).await;

        // Assert
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_ticket_is_rejected() {
        // Arrange
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut debouncer = QueryDebouncer::new(Duration::ZERO, tx);
        debouncer.push(String::from("bat"));
        let (stale, _) = recv_query(&mut rx).await;

        // Act
        debouncer.push(String::from("batman"));

        // Assert
        assert!(!debouncer.accept(stale));
    }
}
