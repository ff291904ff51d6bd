//! Redis backend for the later job queue.
//!
//! A queue named `name` is a sorted set `name` (id scored by due time) and a
//! hash `name:values` (id to encoded job). Each [`Backend`] call runs as one
//! Lua script, so the two keys are always updated together.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use later_core::{Job, Queue, QueueConfig};
//! use later_redis::{RedisBackend, RedisConfig};
//!
//! #[tokio::main]
//! async fn main() -> later_core::Result<()> {
//!     let backend = RedisBackend::new(RedisConfig::new("redis://localhost")).await?;
//!     let queue = Queue::new(QueueConfig::new("emails"), backend)?;
//!     queue.push(vec![Job::new("welcome:42")]).await?;
//!     Ok(())
//! }
//! ```

mod connection;
mod scripts;

use std::sync::Arc;

use async_trait::async_trait;
use later_core::{Backend, Entry, LaterError, Popped, Result};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use scripts::Scripts;

pub use connection::{ConnectionProvider, RedisConfig};

/// Redis keys of one queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisKeys {
    name: String,
}

impl RedisKeys {
    /// Create a new RedisKeys instance for the given queue name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Key for the index (ZSET), scored by due time.
    pub fn index(&self) -> String {
        self.name.clone()
    }

    /// Key for the store (HASH) holding encoded jobs.
    pub fn store(&self) -> String {
        format!("{}:values", self.name)
    }
}

/// Redis backend for queue storage.
#[derive(Clone)]
pub struct RedisBackend {
    connections: ConnectionProvider,
    scripts: Arc<Scripts>,
}

impl RedisBackend {
    /// Create a new Redis backend.
    pub async fn new(config: RedisConfig) -> Result<Self> {
        let connections = ConnectionProvider::connect(&config).await?;
        Ok(Self::with_provider(connections))
    }

    /// Create a new Redis backend with an existing connection manager.
    pub fn with_connection(conn: ConnectionManager) -> Self {
        Self::with_provider(ConnectionProvider::from(conn))
    }

    /// Create a backend from an existing connection provider.
    pub fn with_provider(connections: ConnectionProvider) -> Self {
        Self {
            connections,
            scripts: Arc::new(Scripts::new()),
        }
    }
}

fn backend_err(e: redis::RedisError) -> LaterError {
    LaterError::Backend(e.to_string())
}

#[async_trait]
impl Backend for RedisBackend {
    async fn push(&self, queue: &str, entries: &[Entry]) -> Result<usize> {
        let keys = RedisKeys::new(queue);
        let mut conn = self.connections.checkout();

        let mut invocation = self.scripts.push.prepare_invoke();
        invocation.key(keys.index()).key(keys.store());
        for entry in entries {
            invocation
                .arg(&entry.id)
                .arg(entry.score)
                .arg(&entry.payload);
        }

        let added: usize = invocation
            .invoke_async(&mut conn)
            .await
            .map_err(backend_err)?;
        Ok(added)
    }

    async fn pop(&self, queue: &str, max_score: i64, limit: usize) -> Result<Vec<Popped>> {
        let keys = RedisKeys::new(queue);
        let mut conn = self.connections.checkout();

        let (ids, values): (Vec<String>, Vec<Option<Vec<u8>>>) = self
            .scripts
            .pop
            .key(keys.index())
            .key(keys.store())
            .arg(max_score)
            .arg(limit)
            .invoke_async(&mut conn)
            .await
            .map_err(backend_err)?;

        if ids.len() != values.len() {
            return Err(LaterError::Backend(format!(
                "pop script returned {} ids but {} values",
                ids.len(),
                values.len()
            )));
        }
        Ok(ids.into_iter().zip(values).collect())
    }

    async fn remove(&self, queue: &str, ids: &[String]) -> Result<usize> {
        let keys = RedisKeys::new(queue);
        let mut conn = self.connections.checkout();

        let mut invocation = self.scripts.remove.prepare_invoke();
        invocation.key(keys.index()).key(keys.store());
        for id in ids {
            invocation.arg(id);
        }

        let removed: usize = invocation
            .invoke_async(&mut conn)
            .await
            .map_err(backend_err)?;
        Ok(removed)
    }

    async fn pending(&self, queue: &str) -> Result<usize> {
        let keys = RedisKeys::new(queue);
        let mut conn = self.connections.checkout();

        let len: usize = conn.zcard(keys.index()).await.map_err(backend_err)?;
        Ok(len)
    }

    async fn clear(&self, queue: &str) -> Result<()> {
        let keys = RedisKeys::new(queue);
        let mut conn = self.connections.checkout();

        let mut pipe = redis::pipe();
        pipe.atomic().del(keys.index()).del(keys.store());

        let _: () = pipe.query_async(&mut conn).await.map_err(backend_err)?;
        Ok(())
    }
}


// ========== Integration Tests (require Redis) ==========
