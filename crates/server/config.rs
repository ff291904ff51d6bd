//! Server configuration.

use std::net::{Ipv4Addr, SocketAddr};

/// Store URL that selects the in-process backend.
pub const MEMORY_STORE_URL: &str = "memory://";

/// Configuration for the later server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the API server to.
    pub api_addr: SocketAddr,
    /// Name of the queue served.
    pub queue: String,
    /// Backing store URL; `memory://` keeps jobs in process.
    pub store_url: String,
    /// Number of store connections.
    pub pool_size: usize,
    /// Number of HTTP worker threads; `None` lets actix pick.
    pub workers: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 8888)),
            queue: "later".to_string(),
            store_url: "redis://127.0.0.1:6379".to_string(),
            pool_size: 1,
            workers: None,
        }
    }
}

impl ServerConfig {
    /// Create a new builder.
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::new()
    }

    /// Whether the store URL selects the in-process backend.
    pub fn uses_memory_store(&self) -> bool {
        self.store_url.trim() == MEMORY_STORE_URL
    }
}

/// Builder for ServerConfig.
#[derive(Debug, Default)]
pub struct ServerConfigBuilder {
    config: ServerConfig,
}

impl ServerConfigBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API bind address.
    pub fn api_addr(mut self, addr: SocketAddr) -> Self {
        self.config.api_addr = addr;
        self
    }

    /// Set the API bind address from a string.
    pub fn api_addr_str(mut self, addr: &str) -> Result<Self, std::net::AddrParseError> {
        self.config.api_addr = addr.parse()?;
        Ok(self)
    }

    /// Set the queue name.
    pub fn queue(mut self, queue: impl Into<String>) -> Self {
        self.config.queue = queue.into();
        self
    }

    /// Set the store URL.
    pub fn store_url(mut self, url: impl Into<String>) -> Self {
        self.config.store_url = url.into();
        self
    }

    /// Set the number of store connections.
    pub fn pool_size(mut self, size: usize) -> Self {
        self.config.pool_size = size;
        self
    }

    /// Set the number of HTTP workers.
    pub fn workers(mut self, num: usize) -> Self {
        self.config.workers = Some(num);
        self
    }

    /// Build the ServerConfig.
    pub fn build(self) -> ServerConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.api_addr, "127.0.0.1:8888".parse().unwrap());
        assert_eq!(config.queue, "later");
        assert_eq!(config.store_url, "redis://127.0.0.1:6379");
        assert_eq!(config.pool_size, 1);
        assert_eq!(config.workers, None);
        assert!(!config.uses_memory_store());
    }

    #[test]
    fn test_server_config_builder_api_addr_str_valid() {
        let config = ServerConfig::builder()
            .api_addr_str("0.0.0.0:9000")
            .unwrap()
            .build();
        assert_eq!(config.api_addr, "0.0.0.0:9000".parse().unwrap());
    }

    #[test]
    fn test_server_config_builder_api_addr_str_invalid() {
        let result = ServerConfig::builder().api_addr_str("not-an-address");
        assert!(result.is_err());
    }

    #[test]
    fn test_server_config_builder_fluent_chain() {
        let addr: SocketAddr = "10.0.0.1:80".parse().unwrap();
        let config = ServerConfig::builder()
            .api_addr(addr)
            .queue("emails")
            .store_url("redis://cache:6379/2")
            .pool_size(4)
            .workers(2)
            .build();

        assert_eq!(config.api_addr, addr);
        assert_eq!(config.queue, "emails");
        assert_eq!(config.store_url, "redis://cache:6379/2");
        assert_eq!(config.pool_size, 4);
        assert_eq!(config.workers, Some(2));
    }

    #[test]
    fn test_memory_store_detection() {
        let config = ServerConfig::builder().store_url("memory://").build();
        assert!(config.uses_memory_store());

        let config = ServerConfig::builder().store_url("memory://x").build();
        assert!(!config.uses_memory_store());
    }
}
