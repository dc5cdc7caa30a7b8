//! Cooperative cancellation for in-flight requests.

use std::time::Duration;

use tokio::time::Instant;

/// A cloneable cancellation signal with an optional deadline.
///
/// Clones share the same signal: cancelling one cancels all. The HTTP client
/// checks the token before every attempt and races it against retry sleeps,
/// so a cancelled list iteration stops without issuing further requests.
///
/// # Example
///
/// ```rust
/// use gitlab_api::CancellationToken;
/// use std::time::Duration;
///
/// let token = CancellationToken::new();
/// let observer = token.clone();
/// token.cancel();
/// assert!(observer.is_cancelled());
///
/// let expiring = CancellationToken::with_timeout(Duration::ZERO);
/// assert!(expiring.is_cancelled());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    signal: tokio_util::sync::CancellationToken,
    deadline: Option<Instant>,
}

impl CancellationToken {
    /// Creates a token that is cancelled only by [`cancel`](Self::cancel).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a token that also counts as cancelled once `timeout` elapses.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            signal: tokio_util::sync::CancellationToken::new(),
            deadline: Some(Instant::now() + timeout),
        }
    }

    /// Signals cancellation to every clone of this token.
    pub fn cancel(&self) {
        self.signal.cancel();
    }

    /// Returns `true` once cancelled or past the deadline.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.signal.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Completes when the token is cancelled or its deadline passes.
    pub async fn cancelled(&self) {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    () = self.signal.cancelled() => {}
                    () = tokio::time::sleep_until(deadline) => {}
                }
            }
            None => self.signal.cancelled().await,
        }
    }
}
