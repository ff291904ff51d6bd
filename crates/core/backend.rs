//! Backend abstraction for queue storage.
//!
//! A queue lives in two collections of the backing store: the *index*, a
//! sorted collection mapping job id to due time, and the *store*, a hash
//! mapping job id to the encoded job. Every method of [`Backend`] is one
//! atomic unit against both collections; no other caller may observe a half
//! applied call. Backends that have server side scripting use it, the others
//! must serialize callers themselves.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;

/// One job as written to the backing store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Key in both collections.
    pub id: String,
    /// Index score: due time in nanoseconds since the Unix epoch.
    pub score: i64,
    /// Encoded job stored under `id`.
    pub payload: Vec<u8>,
}

/// A popped id with whatever payload the store held for it.
pub type Popped = (String, Option<Vec<u8>>);

/// Backend trait for queue storage operations.
///
/// Implementations must be thread-safe (Send + Sync). All operations take the
/// queue name, so a single backend connection can serve many queues.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Upsert every entry into the index and the store.
    ///
    /// Returns how many ids were newly added to the index. Entries whose id
    /// already existed are still written, overwriting score and payload.
    async fn push(&self, queue: &str, entries: &[Entry]) -> Result<usize>;

    /// Take up to `limit` entries with a score of at most `max_score`.
    ///
    /// Entries come back in ascending score order and are deleted from both
    /// collections. An id missing from the store yields `None`.
    async fn pop(&self, queue: &str, max_score: i64, limit: usize) -> Result<Vec<Popped>>;

    /// Delete ids from both collections.
    ///
    /// Returns how many of them were present in the index.
    async fn remove(&self, queue: &str, ids: &[String]) -> Result<usize>;

    /// Number of entries in the index, due or not.
    async fn pending(&self, queue: &str) -> Result<usize>;

    /// Drop both collections of the queue.
    async fn clear(&self, queue: &str) -> Result<()>;
}

/// A type-erased backend that can be shared across threads.
pub type DynBackend = Arc<dyn Backend>;

/// Wrapper around Arc<dyn Backend> for convenience.
#[derive(Clone)]
pub struct SharedBackend {
    inner: DynBackend,
}

impl SharedBackend {
    /// Create a new SharedBackend from any Backend implementation.
    pub fn new<B: Backend + 'static>(backend: B) -> Self {
        Self {
            inner: Arc::new(backend),
        }
    }

    /// Get a reference to the inner backend.
    pub fn inner(&self) -> &DynBackend {
        &self.inner
    }
}

#[async_trait]
impl Backend for SharedBackend {
    async fn push(&self, queue: &str, entries: &[Entry]) -> Result<usize> {
        self.inner.push(queue, entries).await
    }

    async fn pop(&self, queue: &str, max_score: i64, limit: usize) -> Result<Vec<Popped>> {
        self.inner.pop(queue, max_score, limit).await
    }

    async fn remove(&self, queue: &str, ids: &[String]) -> Result<usize> {
        self.inner.remove(queue, ids).await
    }

    async fn pending(&self, queue: &str) -> Result<usize> {
        self.inner.pending(queue).await
    }

    async fn clear(&self, queue: &str) -> Result<()> {
        self.inner.clear(queue).await
    }
}
