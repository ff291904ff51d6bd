//! Request and response records exchanged with the HTTP facade.

use serde::{Deserialize, Serialize};

use crate::error::LaterError;
use crate::job::Job;

/// A job as sent by remote callers. An empty id or a zero `when` mean unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobMessage {
    #[serde(default)]
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub unique: bool,
    /// Due time in nanoseconds since the Unix epoch.
    #[serde(default)]
    pub when: i64,
}

impl From<JobMessage> for Job {
    fn from(msg: JobMessage) -> Self {
        Job {
            id: (!msg.id.is_empty()).then_some(msg.id),
            content: msg.content,
            unique: msg.unique,
            when: (msg.when != 0).then_some(msg.when),
        }
    }
}

impl From<&Job> for JobMessage {
    fn from(job: &Job) -> Self {
        JobMessage {
            id: job.id.clone().unwrap_or_default(),
            content: job.content.clone(),
            unique: job.unique,
            when: job.when.unwrap_or(0),
        }
    }
}

/// Request body for pushing a batch of jobs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PushRequest {
    pub jobs: Vec<JobMessage>,
}

/// A list of job ids, used both as push response and remove request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdList {
    pub ids: Vec<String>,
}

/// Request body for popping jobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopRequest {
    #[serde(default = "default_pop_limit")]
    pub limit: i64,
}

fn default_pop_limit() -> i64 {
    1
}

/// Contents of popped jobs, earliest due first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PopResponse {
    pub jobs: Vec<String>,
}

/// Response for the pending count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingResponse {
    pub count: usize,
}

/// Response for health check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Error body returned with every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable code, see [`LaterError::code`].
    pub code: String,
    pub message: String,
    /// Resolved ids of a partially applied push.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<String>>,
    /// Number of newly added jobs of a partially applied push.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added: Option<usize>,
    /// Number of removed jobs of a partially applied removal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub removed: Option<usize>,
    /// Contents of the intact jobs popped alongside a corrupt one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jobs: Option<Vec<String>>,
}

impl ErrorResponse {
    /// Error body without an underlying queue error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            ids: None,
            added: None,
            removed: None,
            jobs: None,
        }
    }
}

impl From<&LaterError> for ErrorResponse {
    fn from(err: &LaterError) -> Self {
        let mut response = ErrorResponse::new(err.code(), err.to_string());
        match err {
            LaterError::PartialPush { added, ids } => {
                response.added = Some(*added);
                response.ids = Some(ids.clone());
            }
            LaterError::PartialRemoval { removed, .. } => {
                response.removed = Some(*removed);
            }
            LaterError::CorruptPayload { recovered, .. } => {
                response.jobs = Some(recovered.clone());
            }
            _ => {}
        }
        response
    }
}
