use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared "view is stale" marker handed to tree change hooks.
///
/// Clones share one flag, so a hook registered with the host tree (or a file
/// watcher running on another thread) can mark the selector dirty without
/// borrowing it. Any number of marks between two frames cause one rebuild.
#[derive(Debug, Clone, Default)]
pub struct DirtyFlag {
    inner: Arc<AtomicBool>,
}

impl DirtyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&self) {
        self.inner.store(true, Ordering::Release);
    }

    pub fn is_marked(&self) -> bool {
        self.inner.load(Ordering::Acquire)
    }

    /// Clear the flag, returning whether it was set.
    pub(crate) fn take(&self) -> bool {
        self.inner.swap(false, Ordering::AcqRel)
    }
}
