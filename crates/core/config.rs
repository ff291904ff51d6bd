//! Configuration types for the queue engine and the polling loop.

use std::time::Duration;

use crate::error::{LaterError, Result};

/// Configuration for a [`Queue`](crate::Queue).
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Queue name. The index lives under this key, the store under `<name>:values`.
    pub name: String,
}

impl QueueConfig {
    /// Create a new QueueConfig.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Check the configuration before a queue is built from it.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(LaterError::Config("Queue name is required".to_string()));
        }
        Ok(())
    }
}

/// Configuration for the [`Poller`](crate::Poller).
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Maximum number of jobs popped per iteration.
    pub batch_size: usize,
    /// How long to sleep after an empty poll.
    pub idle_sleep: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            idle_sleep: Duration::from_secs(3),
        }
    }
}

impl PollerConfig {
    /// Create a new builder.
    pub fn builder() -> PollerConfigBuilder {
        PollerConfigBuilder::new()
    }
}

/// Builder for PollerConfig.
#[derive(Debug, Default)]
pub struct PollerConfigBuilder {
    config: PollerConfig,
}

impl PollerConfigBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the batch size.
    pub fn batch_size(mut self, size: usize) -> Self {
        self.config.batch_size = size;
        self
    }

    /// Set the idle sleep duration.
    pub fn idle_sleep(mut self, sleep: Duration) -> Self {
        self.config.idle_sleep = sleep;
        self
    }

    /// Build the PollerConfig.
    pub fn build(self) -> PollerConfig {
        self.config
    }
}
