//! Cancellation and deadline carrier.
//!
//! A [`Context`] is handed unchanged to every hook and to the handler. The
//! engine never inspects it; long-running handlers poll it to stop early.
//!
//! ```
//! use std::time::Duration;
//! use command_tree_core::{Context, ContextError};
//!
//! let (ctx, cancel) = Context::with_cancel();
//! let child = ctx.with_timeout(Duration::from_secs(60));
//! assert!(!child.is_done());
//!
//! cancel.cancel();
//! assert_eq!(child.err(), Some(ContextError::Cancelled));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use thiserror::Error;

/// Why a context is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("context cancelled")]
    Cancelled,
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

/// Opaque cancellation/deadline carrier passed through every hook and the
/// handler.
#[derive(Debug, Clone, Default)]
pub struct Context {
    // Own flag last; derived contexts observe every ancestor's flag.
    cancel_flags: Vec<Arc<AtomicBool>>,
    deadline: Option<Instant>,
}

/// Cancels the context it was created with, and every context derived from
/// it.
#[derive(Debug, Clone)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl Context {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// Creates a cancellable root context.
    pub fn with_cancel() -> (Self, CancelHandle) {
        Self::background().child_with_cancel()
    }

    /// Derives a cancellable child. Cancelling the child leaves `self`
    /// untouched.
    pub fn child_with_cancel(&self) -> (Self, CancelHandle) {
        let flag = Arc::new(AtomicBool::new(false));
        let mut cancel_flags = self.cancel_flags.clone();
        cancel_flags.push(Arc::clone(&flag));
        let child = Self {
            cancel_flags,
            deadline: self.deadline,
        };
        (child, CancelHandle(flag))
    }

    /// Derives a child that expires at `deadline`, or at the parent's
    /// deadline if that is earlier.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        };
        Self {
            cancel_flags: self.cancel_flags.clone(),
            deadline: Some(deadline),
        }
    }

    /// Derives a child that expires after `timeout`.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_flags
            .iter()
            .any(|flag| flag.load(Ordering::SeqCst))
    }

    /// Returns why the context is done, or `None` while it is still live.
    pub fn err(&self) -> Option<ContextError> {
        if self.is_cancelled() {
            return Some(ContextError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(ContextError::DeadlineExceeded),
            _ => None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_is_never_done() {
        let ctx = Context::background();
        assert!(!ctx.is_done());
        assert!(ctx.deadline().is_none());
    }

    #[test]
    fn test_child_cancel_does_not_cancel_parent() {
        let (parent, _parent_cancel) = Context::with_cancel();
        let (child, child_cancel) = parent.child_with_cancel();

        child_cancel.cancel();
        assert!(child.is_cancelled());
        assert!(!parent.is_cancelled());
    }

    #[test]
    fn test_elapsed_deadline_is_reported() {
        let ctx = Context::background().with_deadline(Instant::now());
        assert_eq!(ctx.err(), Some(ContextError::DeadlineExceeded));
    }

    #[test]
    fn test_child_deadline_never_extends_parent() {
        let soon = Instant::now() + Duration::from_secs(1);
        let parent = Context::background().with_deadline(soon);
        let child = parent.with_timeout(Duration::from_secs(3_600));
        assert_eq!(child.deadline(), Some(soon));
    }
}
