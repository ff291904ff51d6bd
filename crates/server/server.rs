//! Server implementation that serves one queue over HTTP.

use std::future::Future;
use std::net::TcpListener;

use actix_web::{dev, web, App, HttpServer};
use later_core::{MemoryBackend, Queue, QueueConfig, SharedBackend};
use later_redis::{RedisBackend, RedisConfig};

use crate::api::{self, AppState};
use crate::config::ServerConfig;

/// The later server.
pub struct Server {
    config: ServerConfig,
    queue: Queue,
}

impl Server {
    /// Create a new server for an existing queue.
    pub fn new(config: ServerConfig, queue: Queue) -> Self {
        Self { config, queue }
    }

    /// Open the store named by `config.store_url` and create the server.
    pub async fn open(config: ServerConfig) -> later_core::Result<Self> {
        let backend = open_backend(&config).await?;
        let queue = Queue::new(QueueConfig::new(&config.queue), backend)?;
        Ok(Self::new(config, queue))
    }

    /// Get the served queue.
    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    /// Run the server until Ctrl+C.
    pub async fn run(self) -> std::io::Result<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
        })
        .await
    }

    /// Run the server until `shutdown` completes, then stop gracefully.
    pub async fn run_until<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()>,
    {
        let server = self.start(None)?;
        let handle = server.handle();

        tokio::select! {
            result = server => result?,
            _ = shutdown => {
                tracing::info!("Shutting down API server...");
                handle.stop(true).await;
            }
        }

        tracing::info!("Server stopped");
        Ok(())
    }

    /// Serve on an already bound listener.
    ///
    /// The returned server is not yet polled; spawn or await it.
    pub fn listen(self, listener: TcpListener) -> std::io::Result<dev::Server> {
        self.start(Some(listener))
    }

    fn start(self, listener: Option<TcpListener>) -> std::io::Result<dev::Server> {
        let queue_name = self.queue.name().to_string();
        let app_state = web::Data::new(AppState { queue: self.queue });

        let mut http = HttpServer::new(move || {
            App::new()
                .app_data(app_state.clone())
                .configure(api::configure)
        })
        .disable_signals();
        if let Some(workers) = self.config.workers {
            http = http.workers(workers);
        }

        let http = match listener {
            Some(listener) => http.listen(listener)?,
            None => http.bind(self.config.api_addr)?,
        };
        for addr in http.addrs() {
            tracing::info!(%addr, queue = %queue_name, "API server started");
        }

        Ok(http.run())
    }
}

/// Select the backend for `config.store_url`.
pub async fn open_backend(config: &ServerConfig) -> later_core::Result<SharedBackend> {
    if config.uses_memory_store() {
        tracing::warn!("Using in-memory store; jobs are lost on exit");
        return Ok(SharedBackend::new(MemoryBackend::new()));
    }

    let redis = RedisConfig::new(&config.store_url).pool_size(config.pool_size);
    let backend = RedisBackend::new(redis).await?;
    Ok(SharedBackend::new(backend))
}
