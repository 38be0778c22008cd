//! # Submission Worker
//!
//! One unit of work for the coordinator: take up to the current chunk-size bound of
//! pending tasks, submit them, and sort the per-task results.
//!
//! ## Oversized requests
//!
//! A "payload too large" rejection of a multi-task batch splits it at the midpoint.
//! The shared bound is lowered to the midpoint, the upper half goes back on the
//! queue, and the lower half is resubmitted. A single task that is still too large
//! is fatal, which guarantees the split loop terminates.
//!
//! ## Fatal errors
//!
//! Any other endpoint error returns the whole attempted batch to the queue and ends
//! the worker with that error. The coordinator decides what to do with it. A batch
//! still held when the worker is dropped, as happens when the endpoint call panics,
//! is returned to the queue as well.

use crate::error::EndpointError;
use crate::models::{BatchResponse, SubmitOptions, TaskDescriptor};
use crate::submission::behaviors::ResolvedBehaviors;
use crate::submission::chunk_size::ChunkSizeController;
use crate::submission::classifier::{
    classify_batch_error, classify_task_result, BatchFailure, TaskOutcome,
};
use crate::submission::endpoint::SubmitEndpoint;
use crate::submission::state::{RetryDecision, SubmissionState};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, instrument, warn};

/// Collaborators shared by every worker of one call
pub struct WorkerContext {
    pub endpoint: Arc<dyn SubmitEndpoint>,
    pub chunk_size: Arc<ChunkSizeController>,
    pub behaviors: ResolvedBehaviors,
    pub request_timeout: Option<Duration>,
    pub return_client_request_id: bool,
    pub cancellation: CancellationToken,
}

impl WorkerContext {
    /// Fresh options for one remote call
    fn request_options(&self) -> SubmitOptions {
        let mut options = SubmitOptions::new();
        options.return_client_request_id = self.return_client_request_id;
        options.timeout = self.request_timeout;
        self.behaviors.apply_request_modifiers(&mut options);
        options
    }
}

/// How a worker finished when it did not hit a fatal error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerExit {
    /// The queue was empty; no call was made
    Idle,
    /// A batch of `submitted` tasks got a per-task response
    Completed { submitted: usize },
    /// Cancellation fired; the batch went back to the queue
    Cancelled,
}

/// Tasks handed to the endpoint and not yet settled. Whatever is still held on drop
/// goes back on the queue.
struct InFlightBatch {
    state: Arc<SubmissionState>,
    tasks: Vec<TaskDescriptor>,
}

impl InFlightBatch {
    fn take(&mut self) -> Vec<TaskDescriptor> {
        std::mem::take(&mut self.tasks)
    }
}

impl Drop for InFlightBatch {
    fn drop(&mut self) {
        if !self.tasks.is_empty() {
            warn!(
                restored = self.tasks.len(),
                "Worker stopped with a batch in flight, returning it to the queue"
            );
            let tasks = self.take();
            self.state.enqueue_all(tasks);
        }
    }
}

pub struct SubmissionWorker {
    worker_id: usize,
    state: Arc<SubmissionState>,
    context: Arc<WorkerContext>,
}

impl SubmissionWorker {
    pub fn new(worker_id: usize, state: Arc<SubmissionState>, context: Arc<WorkerContext>) -> Self {
        Self {
            worker_id,
            state,
            context,
        }
    }

    #[instrument(skip(self), fields(job_id = %self.state.job_id(), worker_id = self.worker_id))]
    pub async fn run(self) -> Result<WorkerExit, EndpointError> {
        let mut batch = InFlightBatch {
            state: self.state.clone(),
            tasks: self.state.dequeue_up_to(self.context.chunk_size.current()),
        };
        if batch.tasks.is_empty() {
            debug!("Queue empty, worker exiting without submitting");
            return Ok(WorkerExit::Idle);
        }

        loop {
            let options = self.context.request_options();
            debug!(
                batch_size = batch.tasks.len(),
                client_request_id = %options.client_request_id,
                "📤 WORKER: Submitting task batch"
            );

            let result = tokio::select! {
                biased;
                _ = self.context.cancellation.cancelled() => None,
                result = self.context.endpoint.submit_batch(self.state.job_id(), &batch.tasks, &options) => Some(result),
            };

            let Some(result) = result else {
                debug!(batch_size = batch.tasks.len(), "Cancelled, returning batch to queue");
                self.state.enqueue_all(batch.take());
                return Ok(WorkerExit::Cancelled);
            };

            match result {
                Ok(response) => {
                    let tasks = batch.take();
                    let submitted = tasks.len();
                    self.state.counters().record_batch_submitted();
                    self.process_response(tasks, response);
                    return Ok(WorkerExit::Completed { submitted });
                }
                Err(err) => match classify_batch_error(err) {
                    BatchFailure::PayloadTooLarge(err) if batch.tasks.len() > 1 => {
                        let midpoint = batch.tasks.len() / 2;
                        let chunk_size = &self.context.chunk_size;
                        chunk_size.lower_to(midpoint.min(chunk_size.current()));

                        let upper = batch.tasks.split_off(midpoint);
                        warn!(
                            attempted = midpoint + upper.len(),
                            resubmitting = batch.tasks.len(),
                            requeued = upper.len(),
                            chunk_size = chunk_size.current(),
                            error = %err,
                            "✂️ WORKER: Request too large, splitting batch"
                        );
                        self.state.counters().record_payload_split();
                        self.state.enqueue_all(upper);
                    }
                    failure => {
                        let err = failure.into_error();
                        error!(
                            batch_size = batch.tasks.len(),
                            endpoint = self.context.endpoint.endpoint_name(),
                            error = %err,
                            "❌ WORKER: Batch submission failed, returning batch to queue"
                        );
                        self.state.enqueue_all(batch.take());
                        return Err(err);
                    }
                },
            }
        }
    }

    fn process_response(&self, batch: Vec<TaskDescriptor>, response: BatchResponse) {
        let counters = self.state.counters();
        let mut in_flight: HashMap<String, TaskDescriptor> = batch
            .into_iter()
            .map(|task| (task.id().to_string(), task))
            .collect();

        for result in &response.results {
            let Some(task) = in_flight.remove(&result.task_id) else {
                warn!(task_id = %result.task_id, "Result for a task that was not in the batch");
                continue;
            };

            match classify_task_result(result) {
                TaskOutcome::Accepted => counters.record_accepted(),
                TaskOutcome::AlreadyExists => {
                    debug!(task_id = %result.task_id, "Task already exists, treating as created");
                    counters.record_already_existed();
                }
                TaskOutcome::Retryable(err) => {
                    match self.state.record_retryable_failure(&result.task_id) {
                        RetryDecision::Requeue => {
                            debug!(task_id = %result.task_id, error = %err, "🔁 WORKER: Requeueing task after server error");
                            counters.record_requeued();
                            self.state.enqueue(task);
                        }
                        RetryDecision::Exhausted { attempts } => {
                            warn!(
                                task_id = %result.task_id,
                                attempts = attempts,
                                error = %err,
                                "Task exhausted its retry attempts"
                            );
                            self.state.record_failure(result.task_id.clone(), err);
                        }
                    }
                }
                TaskOutcome::Rejected(err) => {
                    warn!(task_id = %result.task_id, error = %err, "🚫 WORKER: Task rejected by service");
                    self.state.record_failure(result.task_id.clone(), err);
                }
            }
        }

        if !in_flight.is_empty() {
            warn!(
                missing = in_flight.len(),
                "Service response omitted results for some tasks, treating them as created"
            );
        }
    }
}
