//! Error types for the later job queue.

use thiserror::Error;

/// The main error type for the later library.
#[derive(Error, Debug)]
pub enum LaterError {
    /// Push was called with an empty batch.
    #[error("No jobs provided")]
    NoJobsProvided,

    /// Remove was called with an empty id list.
    #[error("No ids provided")]
    NoIdsProvided,

    /// Pop was called with a limit that is not strictly positive.
    #[error("Invalid limit: {0}")]
    InvalidLimit(i64),

    /// Some pushed ids already existed in the index.
    ///
    /// Every job of the batch was still written (last write wins); `ids` holds
    /// the resolved ids in input order.
    #[error("Partial push: {added} of {} jobs newly added", .ids.len())]
    PartialPush { added: usize, ids: Vec<String> },

    /// Fewer ids were removed than requested.
    #[error("Partial removal: {removed} of {expected} jobs removed")]
    PartialRemoval { removed: usize, expected: usize },

    /// The backing store failed or could not be reached.
    #[error("Backend error: {0}")]
    Backend(String),

    /// A stored payload could not be decoded.
    ///
    /// The entry is gone from the store. `recovered` holds the contents of the
    /// other jobs popped in the same batch, earliest due first.
    #[error("Corrupt payload for job {id}: {reason}")]
    CorruptPayload {
        id: String,
        reason: String,
        recovered: Vec<String>,
    },

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl LaterError {
    /// Stable, machine readable code used on the wire.
    pub fn code(&self) -> &'static str {
        match self {
            LaterError::NoJobsProvided => "no_jobs_provided",
            LaterError::NoIdsProvided => "no_ids_provided",
            LaterError::InvalidLimit(_) => "invalid_limit",
            LaterError::PartialPush { .. } => "partial_push",
            LaterError::PartialRemoval { .. } => "partial_removal",
            LaterError::Backend(_) => "store_unavailable",
            LaterError::CorruptPayload { .. } => "corrupt_payload",
            LaterError::Serialization(_) | LaterError::Config(_) => "internal",
        }
    }

    /// Whether the error was caused by invalid caller input.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            LaterError::NoJobsProvided | LaterError::NoIdsProvided | LaterError::InvalidLimit(_)
        )
    }

    /// Whether the store applied only part of the requested mutations.
    pub fn is_partial(&self) -> bool {
        matches!(
            self,
            LaterError::PartialPush { .. } | LaterError::PartialRemoval { .. }
        )
    }
}

/// Result type alias using LaterError.
pub type Result<T> = std::result::Result<T, LaterError>;
