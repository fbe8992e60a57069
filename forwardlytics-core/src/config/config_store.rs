//! Generic config store with synchronous reads.
//!
//! `ConfigStore<T>` wraps a `tokio::sync::watch` sender so that readers can
//! borrow the current value without awaiting, which lets integrations answer
//! `enabled()` from the latest reloaded settings.

use std::sync::Arc;
use tokio::sync::watch;

/// A shared configuration value that can be replaced at runtime.
///
/// Clones share the same underlying value.
pub struct ConfigStore<T> {
    inner: Arc<watch::Sender<T>>,
}

impl<T> ConfigStore<T> {
    /// Create a new `ConfigStore` with the given initial value.
    pub fn new(initial: T) -> Self {
        let (tx, _) = watch::channel(initial);
        Self {
            inner: Arc::new(tx),
        }
    }

    /// Replace the stored value.
    pub fn update(&self, value: T) {
        self.inner.send_replace(value);
    }

    /// Borrow the current value.
    ///
    /// The returned guard holds a read lock; drop it before any `.await`.
    pub fn read(&self) -> watch::Ref<'_, T> {
        self.inner.borrow()
    }
}

impl<T: Clone> ConfigStore<T> {
    /// Clone the current value out of the store.
    pub fn snapshot(&self) -> T {
        self.inner.borrow().clone()
    }
}

impl<T> Clone for ConfigStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
