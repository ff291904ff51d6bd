//! Job definition and related types.

use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::codec;

/// A job submitted to a queue.
///
/// `id` and `when` are optional: a missing id is derived from the content (or
/// drawn at random when `unique` is set), a missing due time means "now".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Job {
    /// Caller supplied identifier.
    pub id: Option<String>,
    /// Opaque payload.
    pub content: String,
    /// Generate a random id instead of a content fingerprint.
    pub unique: bool,
    /// Due time in nanoseconds since the Unix epoch.
    pub when: Option<i64>,
}

impl Job {
    /// Create a job due immediately.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    /// Use an explicit id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Mark the job as unique so identical contents never collide.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Schedule the job at a timestamp in nanoseconds since the Unix epoch.
    ///
    /// Scheduling far in the past is the same as giving the job a high
    /// priority, since jobs are popped in order of due time.
    pub fn at(mut self, when: i64) -> Self {
        self.when = Some(when);
        self
    }

    /// Schedule the job at a wall clock time.
    pub fn at_time(self, time: SystemTime) -> Self {
        self.at(nanos_since_epoch(time))
    }

    /// Schedule the job after a delay from now.
    pub fn delay(self, delay: Duration) -> Self {
        let delay = i64::try_from(delay.as_nanos()).unwrap_or(i64::MAX);
        self.at(now_nanos().saturating_add(delay))
    }

    /// Fill in the id and due time, producing the record that gets stored.
    ///
    /// An empty id or a zero due time count as unset.
    pub fn resolve(self, now: i64) -> ScheduledJob {
        let id = match self.id {
            Some(id) if !id.is_empty() => id,
            _ => codec::new_id(&self.content, self.unique),
        };
        let when = match self.when {
            Some(when) if when != 0 => when,
            _ => now,
        };
        ScheduledJob {
            id,
            content: self.content,
            when,
        }
    }
}

/// A job with its id and due time resolved, as persisted in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScheduledJob {
    /// Key in both the index and the store.
    pub id: String,
    /// Opaque payload.
    pub content: String,
    /// Due time in nanoseconds since the Unix epoch.
    pub when: i64,
}

/// Current time in nanoseconds since the Unix epoch.
pub fn now_nanos() -> i64 {
    nanos_since_epoch(SystemTime::now())
}

fn nanos_since_epoch(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(d) => i64::try_from(d.as_nanos()).unwrap_or(i64::MAX),
        Err(e) => -i64::try_from(e.duration().as_nanos()).unwrap_or(i64::MAX),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_creation() {
        let job = Job::new("hello");
        assert_eq!(job.content, "hello");
        assert!(job.id.is_none());
        assert!(job.when.is_none());
        assert!(!job.unique);
    }

    #[test]
    fn test_job_builders() {
        let job = Job::new("x").with_id("custom").unique().at(42);
        assert_eq!(job.id.as_deref(), Some("custom"));
        assert!(job.unique);
        assert_eq!(job.when, Some(42));
    }

    #[test]
    fn test_resolve_defaults() {
        let scheduled = Job::new("payload").resolve(1_000);
        assert_eq!(scheduled.when, 1_000);
        assert_eq!(scheduled.id, codec::new_id("payload", false));
        assert_eq!(scheduled.content, "payload");
    }

    #[test]
    fn test_resolve_keeps_explicit_values() {
        let scheduled = Job::new("payload").with_id("abc").at(7).resolve(1_000);
        assert_eq!(scheduled.id, "abc");
        assert_eq!(scheduled.when, 7);
    }

    #[test]
    fn test_resolve_treats_empty_id_and_zero_when_as_unset() {
        let scheduled = Job::new("payload").with_id("").at(0).resolve(99);
        assert_eq!(scheduled.id, codec::new_id("payload", false));
        assert_eq!(scheduled.when, 99);
    }

    #[test]
    fn test_resolve_unique_ids_differ() {
        let a = Job::new("same").unique().resolve(1);
        let b = Job::new("same").unique().resolve(1);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_resolve_negative_when_is_kept() {
        let scheduled = Job::new("old").at(-5).resolve(99);
        assert_eq!(scheduled.when, -5);
    }

    #[test]
    fn test_delay_is_in_the_future() {
        let before = now_nanos();
        let job = Job::new("later").delay(Duration::from_secs(3600));
        let when = job.when.unwrap();
        assert!(when >= before + 3_600_000_000_000);
        assert!(when <= now_nanos() + 3_600_000_000_000);
    }

    #[test]
    fn test_at_time() {
        let time = UNIX_EPOCH + Duration::from_secs(2);
        assert_eq!(Job::new("x").at_time(time).when, Some(2_000_000_000));

        let before_epoch = UNIX_EPOCH - Duration::from_secs(1);
        assert_eq!(Job::new("x").at_time(before_epoch).when, Some(-1_000_000_000));
    }

    #[test]
    fn test_scheduled_job_rejects_unknown_fields() {
        let json = r#"{"id":"a","content":"b","when":1,"unique":true}"#;
        assert!(serde_json::from_str::<ScheduledJob>(json).is_err());
    }
}
