//! # later-server - HTTP API for a later queue
//!
//! This crate serves one delayed job queue over JSON/HTTP.
//!
//! ## Endpoints
//!
//! - Health check (`GET /health`)
//! - Push jobs (`POST /api/jobs`)
//! - Remove jobs (`DELETE /api/jobs`)
//! - Pop due jobs (`POST /api/jobs/pop`)
//! - Pending count (`GET /api/pending`)
//!
//! Failures answer with an [`ErrorResponse`](later_core::wire::ErrorResponse)
//! whose `code` is stable across releases.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use later_server::{Server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::builder()
//!         .api_addr_str("0.0.0.0:8888")?
//!         .queue("emails")
//!         .store_url("redis://localhost")
//!         .build();
//!
//!     let server = Server::open(config).await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

mod api;
mod config;
mod server;

pub use api::{configure, status_for, AppState};
pub use config::{ServerConfig, ServerConfigBuilder, MEMORY_STORE_URL};
pub use server::{open_backend, Server};
