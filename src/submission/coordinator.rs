//! # Bulk Submission Coordinator
//!
//! Drives one `create_tasks` call to completion: keeps up to the configured degree
//! of parallelism of [`SubmissionWorker`]s running against a shared queue, reaps them
//! as they finish, and turns the final state into a [`SubmissionSummary`] or a
//! [`BulkSubmitError`].
//!
//! ## Stop conditions
//!
//! - The queue is empty and no worker is in flight: every task was accepted
//!   unless something ended up in the failure list.
//! - A worker returned a fatal endpoint error: stop starting workers, join the rest,
//!   and surface the first such error.
//! - The failure list became non-empty: stop starting workers, join the rest, and
//!   report a partial failure.
//! - The cancellation token fired or the deadline elapsed: same, reported as
//!   cancelled.

use crate::error::{BulkSubmitError, EndpointError, Result};
use crate::models::TaskDescriptor;
use crate::submission::metrics::SubmissionSummary;
use crate::submission::state::SubmissionState;
use crate::submission::worker::{SubmissionWorker, WorkerContext, WorkerExit};
use chrono::Utc;
use std::sync::Arc;
use tokio::task::{JoinError, JoinSet};
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn};

/// Why the main loop stopped before the queue drained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopReason {
    Fatal,
    Failures,
    Cancelled,
}

pub struct BulkSubmissionCoordinator {
    context: Arc<WorkerContext>,
    max_degree_of_parallelism: usize,
    max_attempts_per_task: Option<u32>,
}

impl BulkSubmissionCoordinator {
    pub fn new(
        context: WorkerContext,
        max_degree_of_parallelism: usize,
        max_attempts_per_task: Option<u32>,
    ) -> Self {
        Self {
            context: Arc::new(context),
            max_degree_of_parallelism: max_degree_of_parallelism.max(1),
            max_attempts_per_task,
        }
    }

    #[instrument(skip(self, tasks), fields(task_count = tasks.len(), parallelism = self.max_degree_of_parallelism))]
    pub async fn create_tasks(
        &self,
        job_id: &str,
        tasks: Vec<TaskDescriptor>,
    ) -> Result<SubmissionSummary> {
        let started_at = Utc::now();
        let total_tasks = tasks.len();
        let state = Arc::new(SubmissionState::new(
            job_id,
            tasks,
            self.max_attempts_per_task,
        ));

        info!(
            job_id = %job_id,
            total_tasks = total_tasks,
            chunk_size = self.context.chunk_size.current(),
            parallelism = self.max_degree_of_parallelism,
            "🚀 BULK SUBMIT: Starting task submission"
        );

        let deadline = self
            .context
            .behaviors
            .deadline
            .map(|duration| Instant::now() + duration);
        let cancellation = self.context.cancellation.clone();

        let mut workers: JoinSet<std::result::Result<WorkerExit, EndpointError>> = JoinSet::new();
        let mut fatal: Option<EndpointError> = None;
        let mut panicked: Option<JoinError> = None;
        let mut stop_reason: Option<StopReason> = None;
        let mut next_worker_id = 0usize;

        while state.has_pending() || !workers.is_empty() {
            if cancellation.is_cancelled() {
                stop_reason = Some(StopReason::Cancelled);
                break;
            }

            if state.has_pending() && workers.len() < self.max_degree_of_parallelism {
                let worker =
                    SubmissionWorker::new(next_worker_id, state.clone(), self.context.clone());
                next_worker_id += 1;
                workers.spawn(worker.run());
                continue;
            }

            let joined = tokio::select! {
                joined = workers.join_next() => joined,
                _ = cancellation.cancelled() => {
                    stop_reason = Some(StopReason::Cancelled);
                    break;
                }
                _ = sleep_until_deadline(deadline) => {
                    warn!(job_id = %job_id, "⏰ BULK SUBMIT: Deadline elapsed, cancelling workers");
                    cancellation.cancel();
                    stop_reason = Some(StopReason::Cancelled);
                    break;
                }
            };

            if let Some(joined) = joined {
                reap(joined, &mut fatal, &mut panicked);
            }

            if fatal.is_some() || panicked.is_some() {
                stop_reason = Some(StopReason::Fatal);
                break;
            }

            if state.has_failures() {
                stop_reason = Some(StopReason::Failures);
                break;
            }
        }

        if let Some(reason) = stop_reason {
            debug!(
                job_id = %job_id,
                reason = ?reason,
                in_flight = workers.len(),
                "Stopped starting workers, joining in-flight workers"
            );
        }

        while let Some(joined) = workers.join_next().await {
            reap(joined, &mut fatal, &mut panicked);
        }

        let failed_tasks = state.take_failures();
        let pending_tasks = state.take_pending();

        if let Some(source) = fatal {
            error!(
                job_id = %job_id,
                error = %source,
                failed = failed_tasks.len(),
                pending = pending_tasks.len(),
                "❌ BULK SUBMIT: Aborted by endpoint error"
            );
            return Err(BulkSubmitError::Fatal {
                job_id: job_id.to_string(),
                source,
                failed_tasks,
                pending_tasks,
            });
        }

        if let Some(join_error) = panicked {
            error!(
                job_id = %job_id,
                error = %join_error,
                failed = failed_tasks.len(),
                pending = pending_tasks.len(),
                "❌ BULK SUBMIT: Worker panicked"
            );
            return Err(BulkSubmitError::WorkerPanicked {
                job_id: job_id.to_string(),
                message: join_error.to_string(),
                failed_tasks,
                pending_tasks,
            });
        }

        if !failed_tasks.is_empty() {
            warn!(
                job_id = %job_id,
                failed = failed_tasks.len(),
                pending = pending_tasks.len(),
                "⚠️ BULK SUBMIT: Some tasks were rejected"
            );
            return Err(BulkSubmitError::PartialFailure {
                job_id: job_id.to_string(),
                failed_tasks,
                pending_tasks,
            });
        }

        if stop_reason == Some(StopReason::Cancelled) && !pending_tasks.is_empty() {
            warn!(
                job_id = %job_id,
                pending = pending_tasks.len(),
                "🛑 BULK SUBMIT: Cancelled before all tasks were submitted"
            );
            return Err(BulkSubmitError::Cancelled {
                job_id: job_id.to_string(),
                failed_tasks,
                pending_tasks,
            });
        }

        let summary = SubmissionSummary::from_counters(
            job_id,
            total_tasks,
            state.counters(),
            self.context.chunk_size.current(),
            started_at,
        );

        info!(
            job_id = %job_id,
            total_tasks = summary.total_tasks,
            batches = summary.batches_submitted,
            requeued = summary.tasks_requeued,
            already_existed = summary.tasks_already_existed,
            payload_splits = summary.payload_splits,
            chunk_size = summary.final_chunk_size,
            elapsed_ms = summary.elapsed_ms(),
            "✅ BULK SUBMIT: All tasks accepted"
        );

        Ok(summary)
    }
}

/// Record the first fatal outcome of a finished worker
fn reap(
    joined: std::result::Result<std::result::Result<WorkerExit, EndpointError>, JoinError>,
    fatal: &mut Option<EndpointError>,
    panicked: &mut Option<JoinError>,
) {
    match joined {
        Ok(Ok(exit)) => debug!(exit = ?exit, "Worker finished"),
        Ok(Err(err)) => {
            if fatal.is_none() {
                *fatal = Some(err);
            } else {
                debug!(error = %err, "Discarding additional worker error");
            }
        }
        Err(join_error) => {
            if panicked.is_none() {
                *panicked = Some(join_error);
            }
        }
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{EndpointResult, ServiceError};
    use crate::models::{BatchResponse, SubmitOptions, TaskAddResult};
    use crate::submission::behaviors::ResolvedBehaviors;
    use crate::submission::chunk_size::ChunkSizeController;
    use crate::submission::endpoint::SubmitEndpoint;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashSet;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    /// Accepts everything except a fixed set of task IDs it rejects
    struct RejectingEndpoint {
        rejected: HashSet<String>,
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl SubmitEndpoint for RejectingEndpoint {
        async fn submit_batch(
            &self,
            _job_id: &str,
            tasks: &[TaskDescriptor],
            _options: &SubmitOptions,
        ) -> EndpointResult<BatchResponse> {
            *self.calls.lock() += 1;
            Ok(BatchResponse::new(
                tasks
                    .iter()
                    .map(|task| {
                        if self.rejected.contains(task.id()) {
                            TaskAddResult::client_error(
                                task.id(),
                                ServiceError::client("InvalidPropertyValue", "rejected"),
                            )
                        } else {
                            TaskAddResult::success(task.id())
                        }
                    })
                    .collect(),
            ))
        }
    }

    /// Rejects `task-0`, panics on any batch holding `task-10`, accepts the rest
    #[derive(Default)]
    struct PanickingEndpoint {
        created: Mutex<HashSet<String>>,
    }

    #[async_trait]
    impl SubmitEndpoint for PanickingEndpoint {
        async fn submit_batch(
            &self,
            _job_id: &str,
            tasks: &[TaskDescriptor],
            _options: &SubmitOptions,
        ) -> EndpointResult<BatchResponse> {
            if tasks.iter().any(|task| task.id() == "task-10") {
                panic!("endpoint bug");
            }
            let mut created = self.created.lock();
            Ok(BatchResponse::new(
                tasks
                    .iter()
                    .map(|task| {
                        if task.id() == "task-0" {
                            TaskAddResult::client_error(
                                task.id(),
                                ServiceError::client("InvalidPropertyValue", "rejected"),
                            )
                        } else {
                            created.insert(task.id().to_string());
                            TaskAddResult::success(task.id())
                        }
                    })
                    .collect(),
            ))
        }
    }

    /// Never answers until cancelled
    struct HangingEndpoint;

    #[async_trait]
    impl SubmitEndpoint for HangingEndpoint {
        async fn submit_batch(
            &self,
            _job_id: &str,
            _tasks: &[TaskDescriptor],
            _options: &SubmitOptions,
        ) -> EndpointResult<BatchResponse> {
            std::future::pending().await
        }
    }

    fn context(endpoint: Arc<dyn SubmitEndpoint>, behaviors: ResolvedBehaviors) -> WorkerContext {
        let cancellation = behaviors.cancellation.clone().unwrap_or_default();
        WorkerContext {
            endpoint,
            chunk_size: Arc::new(ChunkSizeController::new(10)),
            behaviors,
            request_timeout: None,
            return_client_request_id: true,
            cancellation,
        }
    }

    fn tasks(count: usize) -> Vec<TaskDescriptor> {
        (0..count)
            .map(|i| TaskDescriptor::with_id(format!("task-{i}")))
            .collect()
    }

    #[tokio::test]
    async fn test_all_tasks_accepted() {
        let endpoint = Arc::new(RejectingEndpoint {
            rejected: HashSet::new(),
            calls: Mutex::new(0),
        });
        let coordinator = BulkSubmissionCoordinator::new(
            context(endpoint.clone(), ResolvedBehaviors::default()),
            3,
            None,
        );

        let summary = coordinator.create_tasks("job-1", tasks(35)).await.unwrap();

        assert_eq!(summary.total_tasks, 35);
        assert_eq!(summary.tasks_accepted, 35);
        assert_eq!(summary.batches_submitted, 4);
        assert_eq!(*endpoint.calls.lock(), 4);
    }

    #[tokio::test]
    async fn test_rejections_stop_the_call() {
        let endpoint = Arc::new(RejectingEndpoint {
            rejected: HashSet::from(["task-3".to_string()]),
            calls: Mutex::new(0),
        });
        let coordinator = BulkSubmissionCoordinator::new(
            context(endpoint.clone(), ResolvedBehaviors::default()),
            1,
            None,
        );

        let err = coordinator.create_tasks("job-1", tasks(25)).await.unwrap_err();

        assert!(err.is_partial_failure());
        assert_eq!(err.failed_tasks().len(), 1);
        assert_eq!(err.failed_tasks()[0].task_id, "task-3");
        // The first chunk of ten held the rejection, so nothing else was submitted.
        assert_eq!(err.pending_tasks().len(), 15);
        assert_eq!(*endpoint.calls.lock(), 1);
    }

    #[tokio::test]
    async fn test_worker_panic_keeps_failures_and_pending() {
        let endpoint = Arc::new(PanickingEndpoint::default());
        let coordinator = BulkSubmissionCoordinator::new(
            context(endpoint.clone(), ResolvedBehaviors::default()),
            2,
            None,
        );

        let err = coordinator.create_tasks("job-1", tasks(100)).await.unwrap_err();

        assert!(matches!(err, BulkSubmitError::WorkerPanicked { .. }));
        assert_eq!(err.failed_tasks().len(), 1);
        assert_eq!(err.failed_tasks()[0].task_id, "task-0");

        let created = endpoint.created.lock().clone();
        let pending: HashSet<String> = err
            .pending_tasks()
            .iter()
            .map(|task| task.id().to_string())
            .collect();
        assert!(pending.contains("task-10"));
        assert!(created.is_disjoint(&pending));
        assert_eq!(created.len() + pending.len() + 1, 100);
    }

    #[tokio::test]
    async fn test_cancellation_reports_pending() {
        let token = CancellationToken::new();
        let behaviors = ResolvedBehaviors {
            cancellation: Some(token.clone()),
            ..Default::default()
        };
        let coordinator =
            BulkSubmissionCoordinator::new(context(Arc::new(HangingEndpoint), behaviors), 2, None);

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            token.cancel();
        });

        let err = coordinator.create_tasks("job-1", tasks(30)).await.unwrap_err();
        canceller.await.unwrap();

        assert!(matches!(err, BulkSubmitError::Cancelled { .. }));
        assert_eq!(err.pending_tasks().len(), 30);
    }

    #[tokio::test]
    async fn test_deadline_cancels_submission() {
        let behaviors = ResolvedBehaviors {
            deadline: Some(Duration::from_millis(20)),
            ..Default::default()
        };
        let coordinator =
            BulkSubmissionCoordinator::new(context(Arc::new(HangingEndpoint), behaviors), 1, None);

        let err = coordinator.create_tasks("job-1", tasks(5)).await.unwrap_err();

        assert!(matches!(err, BulkSubmitError::Cancelled { .. }));
        assert_eq!(err.pending_tasks().len(), 5);
    }
}
