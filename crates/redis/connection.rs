//! Connection configuration and checkout.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use later_core::{LaterError, Result};
use redis::aio::ConnectionManager;

/// Configuration for connecting to Redis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisConfig {
    /// Connection URL, e.g. `redis://127.0.0.1:6379`.
    pub url: String,
    /// Number of multiplexed connections to open.
    pub pool_size: usize,
}

impl RedisConfig {
    /// Config with a single connection.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            pool_size: 1,
        }
    }

    /// Set the number of connections.
    pub fn pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    /// Check the configuration without connecting.
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(LaterError::Config("Redis URL must not be empty".to_string()));
        }
        if self.pool_size == 0 {
            return Err(LaterError::Config(
                "Redis pool size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Hands out connections round-robin.
///
/// Every checkout is a clone of a `ConnectionManager`, which reconnects on its
/// own and is released when dropped.
#[derive(Clone)]
pub struct ConnectionProvider {
    managers: Arc<Vec<ConnectionManager>>,
    next: Arc<AtomicUsize>,
}

impl ConnectionProvider {
    /// Open `pool_size` connections to `url`.
    pub async fn connect(config: &RedisConfig) -> Result<Self> {
        config.validate()?;

        let client = redis::Client::open(config.url.as_str())
            .map_err(|e| LaterError::Config(format!("Invalid Redis URL: {}", e)))?;

        let mut managers = Vec::with_capacity(config.pool_size);
        for _ in 0..config.pool_size {
            let manager = ConnectionManager::new(client.clone())
                .await
                .map_err(|e| LaterError::Backend(e.to_string()))?;
            managers.push(manager);
        }

        tracing::debug!(pool_size = config.pool_size, "Connected to Redis");
        Self::from_managers(managers)
    }

    /// Build a provider from already opened connections.
    pub fn from_managers(managers: Vec<ConnectionManager>) -> Result<Self> {
        if managers.is_empty() {
            return Err(LaterError::Config(
                "Connection provider needs at least one connection".to_string(),
            ));
        }
        Ok(Self {
            managers: Arc::new(managers),
            next: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Number of underlying connections.
    pub fn len(&self) -> usize {
        self.managers.len()
    }

    /// Always false; a provider holds at least one connection.
    pub fn is_empty(&self) -> bool {
        self.managers.is_empty()
    }

    /// Take the next connection.
    pub fn checkout(&self) -> ConnectionManager {
        let slot = self.next.fetch_add(1, Ordering::Relaxed) % self.managers.len();
        self.managers[slot].clone()
    }
}

impl From<ConnectionManager> for ConnectionProvider {
    fn from(manager: ConnectionManager) -> Self {
        Self {
            managers: Arc::new(vec![manager]),
            next: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = RedisConfig::new("redis://localhost");
        assert_eq!(config.pool_size, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_rejects_empty_url() {
        let err = RedisConfig::new("  ").validate().unwrap_err();
        assert!(matches!(err, LaterError::Config(_)));
    }

    #[test]
    fn test_config_rejects_zero_pool() {
        let err = RedisConfig::new("redis://localhost")
            .pool_size(0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, LaterError::Config(_)));
    }

    #[tokio::test]
    async fn test_connect_rejects_bad_url() {
        let result = ConnectionProvider::connect(&RedisConfig::new("not a url")).await;
        assert!(matches!(result, Err(LaterError::Config(_))));
    }

    #[test]
    fn test_from_managers_rejects_empty() {
        let result = ConnectionProvider::from_managers(Vec::new());
        assert!(matches!(result, Err(LaterError::Config(_))));
    }
}
