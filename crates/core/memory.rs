//! In-process backend.
//!
//! Holds every queue behind one mutex, so each [`Backend`] call is applied as
//! a single unit just like a script on a real store. Equal scores are ordered
//! by id, which is how Redis orders sorted set members.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::backend::{Backend, Entry, Popped};
use crate::error::Result;

#[derive(Debug, Default)]
struct QueueData {
    /// (score, id) in dequeue order.
    index: BTreeSet<(i64, String)>,
    /// id -> score, to find index entries on update or removal.
    scores: HashMap<String, i64>,
    /// id -> payload.
    store: HashMap<String, Vec<u8>>,
}

impl QueueData {
    fn is_empty(&self) -> bool {
        self.scores.is_empty() && self.store.is_empty()
    }
}

/// In-memory backend for tests and local development.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    queues: Arc<Mutex<HashMap<String, QueueData>>>,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a raw payload without touching the index.
    #[cfg(test)]
    pub(crate) fn put_raw(&self, queue: &str, id: &str, score: i64, payload: Option<&[u8]>) {
        let mut queues = self.queues.lock();
        let data = queues.entry(queue.to_string()).or_default();
        data.index.insert((score, id.to_string()));
        data.scores.insert(id.to_string(), score);
        match payload {
            Some(p) => data.store.insert(id.to_string(), p.to_vec()),
            None => data.store.remove(id),
        };
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn push(&self, queue: &str, entries: &[Entry]) -> Result<usize> {
        let mut queues = self.queues.lock();
        let data = queues.entry(queue.to_string()).or_default();

        let mut added = 0;
        for entry in entries {
            match data.scores.insert(entry.id.clone(), entry.score) {
                Some(previous) => {
                    data.index.remove(&(previous, entry.id.clone()));
                }
                None => added += 1,
            }
            data.index.insert((entry.score, entry.id.clone()));
            data.store.insert(entry.id.clone(), entry.payload.clone());
        }
        Ok(added)
    }

    async fn pop(&self, queue: &str, max_score: i64, limit: usize) -> Result<Vec<Popped>> {
        let mut queues = self.queues.lock();
        let Some(data) = queues.get_mut(queue) else {
            return Ok(Vec::new());
        };

        let due: Vec<(i64, String)> = data
            .index
            .iter()
            .take_while(|(score, _)| *score <= max_score)
            .take(limit)
            .cloned()
            .collect();

        let mut popped = Vec::with_capacity(due.len());
        for key in due {
            data.index.remove(&key);
            data.scores.remove(&key.1);
            let payload = data.store.remove(&key.1);
            popped.push((key.1, payload));
        }

        if data.is_empty() {
            queues.remove(queue);
        }
        Ok(popped)
    }

    async fn remove(&self, queue: &str, ids: &[String]) -> Result<usize> {
        let mut queues = self.queues.lock();
        let Some(data) = queues.get_mut(queue) else {
            return Ok(0);
        };

        let mut removed = 0;
        for id in ids {
            if let Some(score) = data.scores.remove(id) {
                data.index.remove(&(score, id.clone()));
                removed += 1;
            }
            data.store.remove(id);
        }

        if data.is_empty() {
            queues.remove(queue);
        }
        Ok(removed)
    }

    async fn pending(&self, queue: &str) -> Result<usize> {
        let queues = self.queues.lock();
        Ok(queues.get(queue).map_or(0, |data| data.index.len()))
    }

    async fn clear(&self, queue: &str) -> Result<()> {
        self.queues.lock().remove(queue);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, score: i64) -> Entry {
        Entry {
            id: id.to_string(),
            score,
            payload: format!("payload-{id}").into_bytes(),
        }
    }

    #[tokio::test]
    async fn test_push_counts_new_ids_only() {
        let backend = MemoryBackend::new();
        assert_eq!(
            backend
                .push("q", &[entry("a", 1), entry("b", 2)])
                .await
                .unwrap(),
            2
        );
        assert_eq!(
            backend
                .push("q", &[entry("a", 5), entry("c", 3)])
                .await
                .unwrap(),
            1
        );
        assert_eq!(backend.pending("q").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_push_overwrites_score() {
        let backend = MemoryBackend::new();
        backend.push("q", &[entry("a", 1), entry("b", 2)]).await.unwrap();
        backend.push("q", &[entry("a", 10)]).await.unwrap();

        let popped = backend.pop("q", i64::MAX, 10).await.unwrap();
        let ids: Vec<_> = popped.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_pop_respects_max_score_and_limit() {
        let backend = MemoryBackend::new();
        backend
            .push("q", &[entry("a", 1), entry("b", 2), entry("c", 3), entry("d", 100)])
            .await
            .unwrap();

        let popped = backend.pop("q", 50, 2).await.unwrap();
        assert_eq!(popped.len(), 2);
        assert_eq!(popped[0], ("a".to_string(), Some(b"payload-a".to_vec())));
        assert_eq!(popped[1].0, "b");

        let popped = backend.pop("q", 50, 10).await.unwrap();
        assert_eq!(popped.len(), 1);
        assert_eq!(popped[0].0, "c");

        assert_eq!(backend.pending("q").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_equal_scores_ordered_by_id() {
        let backend = MemoryBackend::new();
        backend
            .push("q", &[entry("b", 1), entry("c", 1), entry("a", 1)])
            .await
            .unwrap();
        let popped = backend.pop("q", 1, 10).await.unwrap();
        let ids: Vec<_> = popped.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_pop_unknown_queue_is_empty() {
        let backend = MemoryBackend::new();
        assert!(backend.pop("missing", i64::MAX, 10).await.unwrap().is_empty());
        assert_eq!(backend.pending("missing").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_pop_reports_missing_payload() {
        let backend = MemoryBackend::new();
        backend.put_raw("q", "orphan", 1, None);
        let popped = backend.pop("q", 10, 10).await.unwrap();
        assert_eq!(popped, vec![("orphan".to_string(), None)]);
    }

    #[tokio::test]
    async fn test_remove_counts_present_ids() {
        let backend = MemoryBackend::new();
        backend.push("q", &[entry("a", 1), entry("b", 2)]).await.unwrap();
        let removed = backend
            .remove("q", &["a".to_string(), "zzz".to_string()])
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(backend.pending("q").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_queues_are_isolated() {
        let backend = MemoryBackend::new();
        backend.push("one", &[entry("a", 1)]).await.unwrap();
        backend.push("two", &[entry("a", 1), entry("b", 1)]).await.unwrap();
        backend.clear("two").await.unwrap();
        assert_eq!(backend.pending("one").await.unwrap(), 1);
        assert_eq!(backend.pending("two").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_drained_queue_is_dropped() {
        let backend = MemoryBackend::new();
        backend.push("q", &[entry("a", 1)]).await.unwrap();
        backend.pop("q", 1, 1).await.unwrap();
        assert!(backend.queues.lock().is_empty());
    }
}
