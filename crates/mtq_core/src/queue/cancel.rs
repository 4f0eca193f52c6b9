//! Cooperative cancellation flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Handle for cancelling a running item.
///
/// The item stops at the next action boundary.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Check if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Clear a previous request (used when an item is reset).
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let handle = CancelHandle::new();
        let other = handle.clone();
        assert!(!other.is_cancelled());

        handle.cancel();
        assert!(other.is_cancelled());

        other.reset();
        assert!(!handle.is_cancelled());
    }
}
