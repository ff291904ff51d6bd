use std::net::SocketAddr;

use anyhow::Context;
use clap::Parser;
use later_server::{Server, ServerConfig};
use tracing_subscriber::EnvFilter;

/// Serve a later delayed job queue over HTTP.
#[derive(Parser, Debug)]
#[command(name = "later-server", version, about)]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "LATER_LISTEN", default_value = "127.0.0.1:8888")]
    listen: SocketAddr,

    /// Backing store URL; `memory://` keeps jobs in process.
    #[arg(long, env = "LATER_STORE_URL", default_value = "redis://127.0.0.1:6379")]
    store_url: String,

    /// Queue name.
    #[arg(long, env = "LATER_QUEUE", default_value = "later")]
    queue: String,

    /// Number of store connections.
    #[arg(long, env = "LATER_POOL_SIZE", default_value_t = 1)]
    pool_size: usize,

    /// Number of HTTP worker threads.
    #[arg(long, env = "LATER_WORKERS")]
    workers: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let args = Args::parse();

    let mut builder = ServerConfig::builder()
        .api_addr(args.listen)
        .queue(args.queue)
        .store_url(args.store_url)
        .pool_size(args.pool_size);
    if let Some(workers) = args.workers {
        builder = builder.workers(workers);
    }
    let config = builder.build();

    let server = Server::open(config)
        .await
        .context("failed to open the backing store")?;
    server.run().await.context("API server failed")?;

    Ok(())
}
