//! # later-client - HTTP client for a later server
//!
//! [`Client`] speaks the JSON API of `later-server`. Failed requests come back
//! as [`ClientError::Api`] carrying the server's stable error `code`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use later_client::{Client, Job};
//!
//! #[tokio::main]
//! async fn main() -> later_client::Result<()> {
//!     let client = Client::new("http://127.0.0.1:8888")?;
//!
//!     let ids = client
//!         .push(&[Job::new("send-report").delay(Duration::from_secs(60))])
//!         .await?;
//!     println!("scheduled {:?}", ids);
//!
//!     for content in client.pop_jobs(10).await? {
//!         println!("due: {}", content);
//!     }
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use later_core::wire::{
    ErrorResponse, HealthResponse, IdList, JobMessage, PendingResponse, PopRequest, PopResponse,
    PushRequest,
};
use reqwest::{Response, StatusCode};
use thiserror::Error;

pub use later_core::Job;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors returned by [`Client`].
#[derive(Error, Debug)]
pub enum ClientError {
    /// The request could not be sent or the response not read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an error response.
    #[error("API error {status} ({code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
        /// Resolved ids of a partially applied push.
        ids: Option<Vec<String>>,
        /// Intact jobs popped alongside a corrupt one.
        jobs: Option<Vec<String>>,
    },
}

impl ClientError {
    /// The server's error code, if the server answered.
    pub fn code(&self) -> Option<&str> {
        match self {
            ClientError::Api { code, .. } => Some(code),
            ClientError::Http(_) => None,
        }
    }

    /// Whether the server applied only part of the request.
    pub fn is_partial(&self) -> bool {
        matches!(self.code(), Some("partial_push") | Some("partial_removal"))
    }
}

/// Result type alias using ClientError.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Client for the later HTTP API.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
}

impl Client {
    /// Create a client with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client whose requests fail after `timeout`.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    /// Get the server base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Check that the server is up.
    pub async fn health(&self) -> Result<String> {
        let response = self.http.get(self.url("/health")).send().await?;
        let health: HealthResponse = decode(response).await?;
        Ok(health.status)
    }

    /// Schedule jobs, returning their ids in input order.
    pub async fn push(&self, jobs: &[Job]) -> Result<Vec<String>> {
        let body = PushRequest {
            jobs: jobs.iter().map(JobMessage::from).collect(),
        };
        let response = self.http.post(self.url("/api/jobs")).json(&body).send().await?;
        let ids: IdList = decode(response).await?;
        tracing::debug!(count = ids.ids.len(), "Jobs pushed");
        Ok(ids.ids)
    }

    /// Remove jobs by id.
    pub async fn remove(&self, ids: &[String]) -> Result<()> {
        let body = IdList { ids: ids.to_vec() };
        let response = self
            .http
            .delete(self.url("/api/jobs"))
            .json(&body)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    /// Number of queued jobs, due or not.
    pub async fn pending(&self) -> Result<usize> {
        let response = self.http.get(self.url("/api/pending")).send().await?;
        let pending: PendingResponse = decode(response).await?;
        Ok(pending.count)
    }

    /// Pop up to `limit` due jobs, earliest first.
    pub async fn pop_jobs(&self, limit: i64) -> Result<Vec<String>> {
        let response = self
            .http
            .post(self.url("/api/jobs/pop"))
            .json(&PopRequest { limit })
            .send()
            .await?;
        let popped: PopResponse = decode(response).await?;
        Ok(popped.jobs)
    }

    /// Pop a single due job.
    pub async fn pop(&self) -> Result<Option<String>> {
        Ok(self.pop_jobs(1).await?.into_iter().next())
    }
}

async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await?;
    Err(api_error(status, &text))
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
    Ok(check(response).await?.json().await?)
}

fn api_error(status: StatusCode, body: &str) -> ClientError {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(err) => ClientError::Api {
            status: status.as_u16(),
            code: err.code,
            message: err.message,
            ids: err.ids,
            jobs: err.jobs,
        },
        Err(_) => ClientError::Api {
            status: status.as_u16(),
            code: "unknown".to_string(),
            message: if body.is_empty() {
                status.to_string()
            } else {
                body.to_string()
            },
            ids: None,
            jobs: None,
        },
    }
}
