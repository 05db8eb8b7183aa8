//! Screen lifetimes.
//!
//! Every user-facing action runs inside a [`ScreenScope`]. Cancelling the
//! scope (the screen was dismissed, or the process got Ctrl+C) makes pending
//! operations return [`Cancelled`] instead of delivering a late result. Any
//! store transaction owned by a cancelled future is dropped and rolled back.

use std::future::Future;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// The scope ended before the operation completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operation cancelled")]
pub struct Cancelled;

/// Cancellation scope for one screen.
#[derive(Debug, Clone, Default)]
pub struct ScreenScope {
    token: CancellationToken,
}

impl ScreenScope {
    /// A new, live root scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A nested scope, cancelled together with `self` but cancellable on its own.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }

    /// End the scope.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether the scope has ended.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Drive `fut` to completion unless the scope ends first.
    ///
    /// A scope that is already cancelled never polls `fut`.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the scope ends before `fut` completes.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output, Cancelled> {
        tokio::select! {
            biased;
            () = self.token.cancelled() => {
                debug!("Operation dropped by cancelled scope");
                Err(Cancelled)
            }
            output = fut => Ok(output),
        }
    }
}
