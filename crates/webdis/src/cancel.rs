//! Cooperative cancellation for in-flight requests.

use std::sync::Arc;

use tokio::sync::watch;

/// A cloneable handle that can cancel any number of pending requests.
///
/// Cancelling stops the caller from waiting: the pending future resolves to
/// [`protocol::WebdisError::Cancelled`]. A request that has already reached the
/// gateway is not recalled and may still take effect.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    state: Arc<watch::Sender<bool>>,
}

impl CancellationToken {
    /// Creates a token in the not-cancelled state.
    pub fn new() -> Self {
        let (state, _) = watch::channel(false);
        Self {
            state: Arc::new(state),
        }
    }

    /// Cancels every request waiting on this token (or a clone of it).
    pub fn cancel(&self) {
        self.state.send_replace(true);
    }

    /// Returns `true` once [`CancellationToken::cancel`] has been called.
    pub fn is_cancelled(&self) -> bool {
        *self.state.borrow()
    }

    /// Completes when the token is cancelled.
    pub async fn cancelled(&self) {
        let mut rx = self.state.subscribe();
        // The sender lives as long as `self`, so this only returns on cancel.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}
