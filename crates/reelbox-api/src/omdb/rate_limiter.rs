//! Request spacing for the OMDb API.

use std::time::Duration;

use tokio::time::Instant;

/// Default minimum interval between requests (~10 req/s).
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(100);

/// Spaces catalog requests at least `min_interval` apart.
///
/// The free OMDb tier throttles bursts, and a fast typist can produce a
/// search per debounce window. Each call reserves the next free slot on
/// the tokio clock, so paused-time tests observe exact spacing.
#[derive(Debug)]
pub struct RateLimiter {
    /// Minimum interval between requests.
    min_interval: Duration,
    /// Earliest instant the next request may start.
    next_slot: Option<Instant>,
}

impl RateLimiter {
    /// Creates a limiter with the given minimum interval.
    pub(crate) const fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            next_slot: None,
        }
    }

    /// Creates a limiter with [`DEFAULT_MIN_INTERVAL`].
    pub(crate) const fn default_interval() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }

    /// Waits for the next free slot and reserves the one after it.
    ///
    /// Returns how long the caller was held back.
    pub async fn wait(&mut self) -> Duration {
        let now = Instant::now();
        let slot = self.next_slot.map_or(now, |next| next.max(now));
        self.next_slot = Some(slot.checked_add(self.min_interval).unwrap_or(slot));

        let delay = slot.saturating_duration_since(now);
        if !delay.is_zero() {
            tracing::trace!(?delay, "holding request for rate limit");
            tokio::time::sleep_until(slot).await;
        }
        delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_request_goes_immediately() {
        // Arrange
        let mut limiter = RateLimiter::new(Duration::from_secs(1));
        let start = Instant::now();

        // Act
        let delay = limiter.wait().await;

        // Assert
        assert_eq!(delay, Duration::ZERO);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_is_spaced_by_interval() {
        // Arrange
        let mut limiter = RateLimiter::new(Duration::from_millis(100));
        let start = Instant::now();

        // Act
        let delays = [
            limiter.wait().await,
            limiter.wait().await,
            limiter.wait().await,
        ];

        // Assert
        assert_eq!(
            delays,
            [
                Duration::ZERO,
                Duration::from_millis(100),
                Duration::from_millis(100)
            ]
        );
        assert_eq!(start.elapsed(), Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_partial_gap_waits_for_remainder() {
        // Arrange
        let mut limiter = RateLimiter::new(Duration::from_millis(100));
        limiter.wait().await;
        tokio::time::advance(Duration::from_millis(70)).await;

        // Act
        let delay = limiter.wait().await;

        // Assert
        assert_eq!(delay, Duration::from_millis(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_gap_resets_spacing() {
        // Arrange
        let mut limiter = RateLimiter::new(Duration::from_millis(100));
        limiter.wait().await;
        tokio::time::advance(Duration::from_millis(250)).await;

        // Act
        let delay = limiter.wait().await;

        // Assert
        assert_eq!(delay, Duration::ZERO);
    }

    #[test]
    fn test_default_interval() {
        // Arrange & Act
        let limiter = RateLimiter::default_interval();

        // Assert
        assert_eq!(limiter.min_interval, DEFAULT_MIN_INTERVAL);
        assert!(limiter.next_slot.is_none());
    }
}
