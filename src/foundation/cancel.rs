use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::foundation::error::{ReelError, ReelResult};

/// Shared cancellation flag checked by the compositor once per frame tick.
///
/// Clones observe the same flag, so a caller can keep one handle and give another to the
/// [`crate::Compositor`].
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Return `true` once [`CancelToken::cancel`] was called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Fail with [`ReelError::Cancelled`] when cancellation was requested.
    pub fn check(&self) -> ReelResult<()> {
        if self.is_cancelled() {
            return Err(ReelError::Cancelled);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/cancel.rs"]
mod tests;
