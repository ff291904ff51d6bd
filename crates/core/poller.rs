//! Polling loop that drains a queue into a handler.

use std::future::Future;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::backend::Backend;
use crate::config::PollerConfig;
use crate::error::Result;
use crate::queue::Queue;

/// Repeatedly pops batches of due jobs and hands them to a handler.
///
/// A non-empty batch or an error is passed to the handler right away and the
/// next poll follows without delay, so a full queue is drained back to back.
/// An empty poll sleeps for `idle_sleep` first.
///
/// A [`LaterError::CorruptPayload`](crate::LaterError::CorruptPayload) reaches
/// the handler with the rest of its batch in `recovered`.
pub struct Poller<B: Backend> {
    queue: Queue<B>,
    config: PollerConfig,
}

impl<B: Backend> Poller<B> {
    /// Create a new Poller.
    pub fn new(queue: Queue<B>, config: PollerConfig) -> Self {
        Self { queue, config }
    }

    /// Get the queue being polled.
    pub fn queue(&self) -> &Queue<B> {
        &self.queue
    }

    /// Run the loop until `cancel` is triggered.
    ///
    /// Cancellation is checked before every poll and interrupts the idle
    /// sleep; a handler call in progress is awaited to completion.
    pub async fn run<F, Fut>(&self, cancel: CancellationToken, mut handler: F)
    where
        F: FnMut(Result<Vec<String>>) -> Fut,
        Fut: Future<Output = ()>,
    {
        tracing::info!(
            queue = %self.queue.name(),
            batch_size = self.config.batch_size,
            "Poller started"
        );

        while !cancel.is_cancelled() {
            match self.queue.pop_jobs(self.config.batch_size).await {
                Ok(jobs) if jobs.is_empty() => {
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = time::sleep(self.config.idle_sleep) => {}
                    }
                }
                Ok(jobs) => {
                    tracing::debug!(queue = %self.queue.name(), count = jobs.len(), "Dispatching jobs");
                    handler(Ok(jobs)).await;
                }
                Err(e) => {
                    tracing::warn!(queue = %self.queue.name(), error = %e, "Poll failed");
                    handler(Err(e)).await;
                }
            }
        }

        tracing::info!(queue = %self.queue.name(), "Poller stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QueueConfig;
    use crate::error::LaterError;
    use crate::job::Job;
    use crate::memory::MemoryBackend;
    use std::sync::Arc;
    use std::time::Duration;

    fn poller(batch_size: usize, idle_sleep: Duration) -> Poller<MemoryBackend> {
        let queue = Queue::new(QueueConfig::new("poll"), MemoryBackend::new()).unwrap();
        Poller::new(
            queue,
            PollerConfig::builder()
                .batch_size(batch_size)
                .idle_sleep(idle_sleep)
                .build(),
        )
    }

    #[tokio::test]
    async fn test_drains_queue_in_batches() {
        let poller = poller(2, Duration::from_secs(60));
        let jobs: Vec<Job> = (0..5).map(|i| Job::new(format!("job-{i}")).at(i + 1)).collect();
        poller.queue().push(jobs).await.unwrap();

        let cancel = CancellationToken::new();
        let mut batches = Vec::new();
        let stop = cancel.clone();
        poller
            .run(cancel, |result| {
                let batch = result.unwrap();
                batches.push(batch);
                if batches.iter().map(Vec::len).sum::<usize>() == 5 {
                    stop.cancel();
                }
                async {}
            })
            .await;

        assert_eq!(
            batches,
            vec![
                vec!["job-0".to_string(), "job-1".to_string()],
                vec!["job-2".to_string(), "job-3".to_string()],
                vec!["job-4".to_string()],
            ]
        );
    }

    #[tokio::test]
    async fn test_cancel_interrupts_idle_sleep() {
        let poller = poller(10, Duration::from_secs(3600));
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = calls.clone();
        tokio::time::timeout(
            Duration::from_secs(5),
            poller.run(cancel, move |_| {
                counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                async {}
            }),
        )
        .await
        .expect("poller did not stop");

        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_returns_immediately_when_already_cancelled() {
        let poller = poller(10, Duration::from_secs(3600));
        poller.queue().push(vec![Job::new("x")]).await.unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();
        poller.run(cancel, |_| async {}).await;

        assert_eq!(poller.queue().pending().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_errors_reach_handler() {
        let poller = poller(0, Duration::from_secs(3600));
        let cancel = CancellationToken::new();
        let stop = cancel.clone();
        let mut errors = Vec::new();

        poller
            .run(cancel, |result| {
                errors.push(result.unwrap_err());
                stop.cancel();
                async {}
            })
            .await;

        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], LaterError::InvalidLimit(0)));
    }

    #[tokio::test]
    async fn test_picks_up_jobs_after_idle_sleep() {
        let poller = poller(10, Duration::from_millis(10));
        let queue = poller.queue().clone();
        let cancel = CancellationToken::new();
        let stop = cancel.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            queue.push(vec![Job::new("late")]).await.unwrap();
        });

        let mut seen = Vec::new();
        tokio::time::timeout(
            Duration::from_secs(5),
            poller.run(cancel, |result| {
                seen.extend(result.unwrap());
                stop.cancel();
                async {}
            }),
        )
        .await
        .expect("poller did not stop");

        assert_eq!(seen, vec!["late".to_string()]);
    }
}
