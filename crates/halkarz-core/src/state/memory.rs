// # Memory Seen Store
//
// In-memory implementation of SeenStore.
//
// ## Crash Behavior
//
// Nothing survives a restart; every start is a fresh baseline. Useful for
// tests and for dry runs against a live page.

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

use crate::Error;
use crate::state::SeenSet;
use crate::traits::SeenStore;

/// In-memory seen store
///
/// Clones share the same storage, so a test can keep a handle and inspect what
/// the engine persisted.
#[derive(Debug, Clone, Default)]
pub struct MemorySeenStore {
    inner: Arc<RwLock<SeenSet>>,
    persist_count: Arc<AtomicUsize>,
}

impl MemorySeenStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `set`
    pub fn with_set(set: SeenSet) -> Self {
        Self {
            inner: Arc::new(RwLock::new(set)),
            persist_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Snapshot of the last persisted set
    pub async fn snapshot(&self) -> SeenSet {
        self.inner.read().await.clone()
    }

    /// Number of successful persist calls
    pub fn persist_count(&self) -> usize {
        self.persist_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SeenStore for MemorySeenStore {
    async fn load(&self) -> SeenSet {
        self.inner.read().await.clone()
    }

    async fn persist(&self, set: &SeenSet) -> Result<(), Error> {
        *self.inner.write().await = set.clone();
        self.persist_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
