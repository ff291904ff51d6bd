use std::time::Duration;

use clap::{Parser, Subcommand};
use later_client::{Client, Job};
use tracing_subscriber::EnvFilter;

/// Command line client for a later server.
#[derive(Parser, Debug)]
#[command(name = "later", version, about)]
struct Cli {
    /// Server base URL.
    #[arg(long, env = "LATER_SERVER", default_value = "http://127.0.0.1:8888")]
    server: String,

    /// Request timeout in milliseconds.
    #[arg(long, default_value_t = 10_000)]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Schedule a job and print its id.
    Push {
        /// Job content.
        #[arg(long)]
        content: String,
        /// Explicit job id.
        #[arg(long)]
        id: Option<String>,
        /// Generate a random id instead of deriving it from the content.
        #[arg(long)]
        unique: bool,
        /// Delay before the job is due.
        #[arg(long)]
        delay_ms: Option<u64>,
    },
    /// Remove jobs by id.
    Remove {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Print the number of queued jobs.
    Pending,
    /// Pop due jobs and print their contents.
    Pop {
        #[arg(long, default_value_t = 1)]
        limit: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = Client::with_timeout(&cli.server, Duration::from_millis(cli.timeout_ms))?;

    match cli.command {
        Command::Push {
            content,
            id,
            unique,
            delay_ms,
        } => {
            let mut job = Job::new(content);
            if let Some(id) = id {
                job = job.with_id(id);
            }
            if unique {
                job = job.unique();
            }
            if let Some(ms) = delay_ms {
                job = job.delay(Duration::from_millis(ms));
            }
            for id in client.push(&[job]).await? {
                println!("{}", id);
            }
        }
        Command::Remove { ids } => {
            client.remove(&ids).await?;
        }
        Command::Pending => {
            println!("{}", client.pending().await?);
        }
        Command::Pop { limit } => {
            for content in client.pop_jobs(limit).await? {
                println!("{}", content);
            }
        }
    }

    Ok(())
}
