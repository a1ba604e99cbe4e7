//! Cancellable execution context

use crate::error::Cancelled;
use anyhow::Result;
use tokio_util::sync::CancellationToken;

/// The execution context passed to completers and tools.
///
/// Cloning shares the cancellation state; [`Context::child`] derives a
/// context that is cancelled with its parent but can also be cancelled on
/// its own.
#[derive(Debug, Clone, Default)]
pub struct Context {
    token: CancellationToken,
}

impl Context {
    /// A fresh, uncancelled context.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context cancelled together with this one.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }

    /// Cancel this context and all of its children.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether the context has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Fail with [`Cancelled`] if the context has been cancelled.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(Cancelled.into());
        }
        Ok(())
    }

    /// Resolve once the context is cancelled.
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }

    /// The underlying token, for transports that select on it directly.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl From<CancellationToken> for Context {
    fn from(token: CancellationToken) -> Self {
        Self { token }
    }
}
