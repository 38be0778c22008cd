//! # Shared Submission State
//!
//! State shared by the coordinator and every worker of one `create_tasks` call:
//! the pending queue, the failure list, per-task retry counts, and counters.
//!
//! A task is in at most one of {pending queue, a worker's in-flight batch, failure
//! list} at any time. Workers remove tasks from the queue before submitting them and
//! either drop them (accepted), push them back (retryable or unsubmitted), or move
//! them to the failure list (rejected).

use crate::error::ServiceError;
use crate::models::{FailureRecord, TaskDescriptor};
use crate::submission::metrics::SubmissionCounters;
use crossbeam::queue::SegQueue;
use dashmap::DashMap;
use parking_lot::Mutex;

/// What to do with a task after a retryable failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    Requeue,
    /// The task reached its attempt cap after `attempts` server-side failures
    Exhausted { attempts: u32 },
}

#[derive(Debug)]
pub struct SubmissionState {
    job_id: String,
    pending: SegQueue<TaskDescriptor>,
    failures: Mutex<Vec<FailureRecord>>,
    retry_counts: DashMap<String, u32>,
    max_attempts_per_task: Option<u32>,
    counters: SubmissionCounters,
}

impl SubmissionState {
    pub fn new(
        job_id: impl Into<String>,
        tasks: impl IntoIterator<Item = TaskDescriptor>,
        max_attempts_per_task: Option<u32>,
    ) -> Self {
        let pending = SegQueue::new();
        for task in tasks {
            pending.push(task);
        }

        Self {
            job_id: job_id.into(),
            pending,
            failures: Mutex::new(Vec::new()),
            retry_counts: DashMap::new(),
            max_attempts_per_task,
            counters: SubmissionCounters::default(),
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn counters(&self) -> &SubmissionCounters {
        &self.counters
    }

    /// Pop up to `limit` tasks, stopping early if the queue empties
    pub fn dequeue_up_to(&self, limit: usize) -> Vec<TaskDescriptor> {
        let mut batch = Vec::with_capacity(limit.min(self.pending.len()));
        while batch.len() < limit {
            match self.pending.pop() {
                Some(task) => batch.push(task),
                None => break,
            }
        }
        batch
    }

    pub fn enqueue(&self, task: TaskDescriptor) {
        self.pending.push(task);
    }

    pub fn enqueue_all(&self, tasks: impl IntoIterator<Item = TaskDescriptor>) {
        for task in tasks {
            self.pending.push(task);
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn record_failure(&self, task_id: impl Into<String>, error: ServiceError) {
        self.counters.record_rejected();
        self.failures.lock().push(FailureRecord::new(task_id, error));
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.lock().is_empty()
    }

    /// Count a server-side failure for `task_id` and decide whether to retry it
    pub fn record_retryable_failure(&self, task_id: &str) -> RetryDecision {
        let attempts = {
            let mut entry = self.retry_counts.entry(task_id.to_string()).or_insert(0);
            *entry += 1;
            *entry
        };

        match self.max_attempts_per_task {
            Some(max) if attempts >= max => RetryDecision::Exhausted { attempts },
            _ => RetryDecision::Requeue,
        }
    }

    /// Drain the queue into a snapshot of tasks that were never confirmed
    pub fn take_pending(&self) -> Vec<TaskDescriptor> {
        let mut pending = Vec::with_capacity(self.pending.len());
        while let Some(task) = self.pending.pop() {
            pending.push(task);
        }
        pending
    }

    pub fn take_failures(&self) -> Vec<FailureRecord> {
        std::mem::take(&mut *self.failures.lock())
    }
}
