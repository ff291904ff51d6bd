//! # later-core - Core types and queue engine
//!
//! This crate provides the core of the later delayed job queue:
//! - `Job` and `ScheduledJob` types and the payload codec
//! - `Backend` trait for storage implementations, plus `MemoryBackend`
//! - `Queue`, the engine behind push, pop and remove
//! - `Poller`, a cancellable loop draining a queue into a handler
//! - Wire records shared by the HTTP server and client
//! - Error types
//!
//! ## Usage
//!
//! ```rust
//! use later_core::{Job, MemoryBackend, Queue, QueueConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> later_core::Result<()> {
//! let queue = Queue::new(QueueConfig::new("emails"), MemoryBackend::new())?;
//!
//! // Due immediately; the id is derived from the content
//! queue.push(vec![Job::new("welcome:42")]).await?;
//!
//! assert_eq!(queue.pop().await?.as_deref(), Some("welcome:42"));
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod wire;

mod backend;
mod config;
mod error;
mod job;
mod memory;
mod poller;
mod queue;

// Re-export main types
pub use backend::{Backend, DynBackend, Entry, Popped, SharedBackend};
pub use config::{PollerConfig, PollerConfigBuilder, QueueConfig};
pub use error::{LaterError, Result};
pub use job::{now_nanos, Job, ScheduledJob};
pub use memory::MemoryBackend;
pub use poller::Poller;
pub use queue::Queue;
pub use tokio_util::sync::CancellationToken;
