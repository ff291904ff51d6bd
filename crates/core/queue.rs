//! The queue engine.

use crate::backend::{Backend, Entry, SharedBackend};
use crate::codec;
use crate::config::QueueConfig;
use crate::error::{LaterError, Result};
use crate::job::{now_nanos, Job};

/// A named delayed job queue on top of a [`Backend`].
///
/// The engine keeps no state besides its name: every call is one atomic
/// backend operation, so any number of `Queue` values, in this process or
/// others, may work on the same queue concurrently.
#[derive(Clone)]
pub struct Queue<B: Backend = SharedBackend> {
    name: String,
    backend: B,
}

impl Queue<SharedBackend> {
    /// Create a queue over a type-erased backend.
    pub fn shared(config: QueueConfig, backend: impl Backend + 'static) -> Result<Self> {
        Self::new(config, SharedBackend::new(backend))
    }
}

impl<B: Backend> Queue<B> {
    /// Create a queue with a specific backend.
    pub fn new(config: QueueConfig, backend: B) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            name: config.name,
            backend,
        })
    }

    /// Get the queue name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Schedule jobs and return their ids in input order.
    ///
    /// Jobs without an id get one from [`codec::new_id`]; jobs without a due
    /// time are due now. The whole batch is written atomically. When some ids
    /// were already queued their entries are overwritten and the call fails
    /// with [`LaterError::PartialPush`], which still carries every id.
    pub async fn push(&self, jobs: Vec<Job>) -> Result<Vec<String>> {
        if jobs.is_empty() {
            return Err(LaterError::NoJobsProvided);
        }

        let now = now_nanos();
        let mut ids = Vec::with_capacity(jobs.len());
        let mut entries = Vec::with_capacity(jobs.len());
        for job in jobs {
            let job = job.resolve(now);
            entries.push(Entry {
                payload: codec::encode(&job)?,
                id: job.id.clone(),
                score: job.when,
            });
            ids.push(job.id);
        }

        let added = self.backend.push(&self.name, &entries).await?;
        tracing::debug!(queue = %self.name, count = ids.len(), added, "Jobs pushed");

        if added < ids.len() {
            return Err(LaterError::PartialPush { added, ids });
        }
        Ok(ids)
    }

    /// Pop a single due job, returning its content.
    pub async fn pop(&self) -> Result<Option<String>> {
        Ok(self.pop_jobs(1).await?.into_iter().next())
    }

    /// Pop up to `limit` due jobs, earliest due time first.
    ///
    /// Selected jobs are removed in the same atomic step, so concurrent
    /// callers never receive the same job. When a popped payload is missing or
    /// cannot be decoded the call fails with [`LaterError::CorruptPayload`]
    /// for the first such job; the contents of every other job of the batch
    /// travel in its `recovered` field.
    pub async fn pop_jobs(&self, limit: usize) -> Result<Vec<String>> {
        if limit == 0 {
            return Err(LaterError::InvalidLimit(0));
        }

        let popped = self.backend.pop(&self.name, now_nanos(), limit).await?;
        if !popped.is_empty() {
            tracing::debug!(queue = %self.name, count = popped.len(), "Jobs popped");
        }

        let mut contents = Vec::with_capacity(popped.len());
        let mut corrupt: Option<(String, String)> = None;
        for (id, payload) in popped {
            let decoded = match payload {
                Some(payload) => codec::decode(&id, &payload),
                None => Err(LaterError::CorruptPayload {
                    id: id.clone(),
                    reason: "missing payload".to_string(),
                    recovered: Vec::new(),
                }),
            };
            match decoded {
                Ok(job) => contents.push(job.content),
                Err(e) => {
                    tracing::error!(queue = %self.name, id = %id, error = %e, "Dropped corrupt job");
                    if corrupt.is_none() {
                        let reason = match e {
                            LaterError::CorruptPayload { reason, .. } => reason,
                            other => other.to_string(),
                        };
                        corrupt = Some((id, reason));
                    }
                }
            }
        }

        match corrupt {
            Some((id, reason)) => Err(LaterError::CorruptPayload {
                id,
                reason,
                recovered: contents,
            }),
            None => Ok(contents),
        }
    }

    /// Remove jobs by id.
    ///
    /// Ids that were not queued make the call fail with
    /// [`LaterError::PartialRemoval`]; the others are removed regardless.
    pub async fn remove(&self, ids: &[String]) -> Result<()> {
        if ids.is_empty() {
            return Err(LaterError::NoIdsProvided);
        }

        let removed = self.backend.remove(&self.name, ids).await?;
        tracing::debug!(queue = %self.name, count = ids.len(), removed, "Jobs removed");

        if removed < ids.len() {
            return Err(LaterError::PartialRemoval {
                removed,
                expected: ids.len(),
            });
        }
        Ok(())
    }

    /// Number of queued jobs, including the ones not due yet.
    pub async fn pending(&self) -> Result<usize> {
        let count = self.backend.pending(&self.name).await?;
        tracing::debug!(queue = %self.name, count, "Pending jobs counted");
        Ok(count)
    }

    /// Delete every job of the queue.
    pub async fn clear(&self) -> Result<()> {
        self.backend.clear(&self.name).await?;
        tracing::debug!(queue = %self.name, "Queue cleared");
        Ok(())
    }
}
