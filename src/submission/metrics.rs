//! # Submission Metrics
//!
//! Lock-free counters updated by workers during a `create_tasks` call, and the
//! summary snapshot returned to the caller when every task was accepted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct SubmissionCounters {
    batches_submitted: AtomicU64,
    tasks_accepted: AtomicU64,
    tasks_already_existed: AtomicU64,
    tasks_requeued: AtomicU64,
    tasks_rejected: AtomicU64,
    payload_splits: AtomicU64,
}

impl SubmissionCounters {
    pub fn record_batch_submitted(&self) {
        self.batches_submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_accepted(&self) {
        self.tasks_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_already_existed(&self) {
        self.tasks_already_existed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_requeued(&self) {
        self.tasks_requeued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected(&self) {
        self.tasks_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_payload_split(&self) {
        self.payload_splits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn batches_submitted(&self) -> u64 {
        self.batches_submitted.load(Ordering::Relaxed)
    }

    pub fn tasks_accepted(&self) -> u64 {
        self.tasks_accepted.load(Ordering::Relaxed)
    }

    pub fn tasks_already_existed(&self) -> u64 {
        self.tasks_already_existed.load(Ordering::Relaxed)
    }

    pub fn tasks_requeued(&self) -> u64 {
        self.tasks_requeued.load(Ordering::Relaxed)
    }

    pub fn tasks_rejected(&self) -> u64 {
        self.tasks_rejected.load(Ordering::Relaxed)
    }

    pub fn payload_splits(&self) -> u64 {
        self.payload_splits.load(Ordering::Relaxed)
    }
}

/// Summary of a `create_tasks` call that accepted every task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionSummary {
    pub job_id: String,
    pub total_tasks: usize,
    /// Remote calls that returned a per-task response
    pub batches_submitted: u64,
    pub tasks_accepted: u64,
    /// Tasks the service reported as already created by an earlier attempt
    pub tasks_already_existed: u64,
    /// Times a task was put back on the queue after a server-side error
    pub tasks_requeued: u64,
    /// Oversized requests that were bisected
    pub payload_splits: u64,
    /// Tasks-per-request bound when the call finished
    pub final_chunk_size: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SubmissionSummary {
    pub fn from_counters(
        job_id: impl Into<String>,
        total_tasks: usize,
        counters: &SubmissionCounters,
        final_chunk_size: usize,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            total_tasks,
            batches_submitted: counters.batches_submitted(),
            tasks_accepted: counters.tasks_accepted(),
            tasks_already_existed: counters.tasks_already_existed(),
            tasks_requeued: counters.tasks_requeued(),
            payload_splits: counters.payload_splits(),
            final_chunk_size,
            started_at,
            finished_at: Utc::now(),
        }
    }

    pub fn elapsed_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}
