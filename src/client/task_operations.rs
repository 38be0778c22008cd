//! # Task Operations
//!
//! Client facade for adding tasks to jobs in bulk.

use crate::config::BulkSubmitConfig;
use crate::error::Result;
use crate::models::TaskDescriptor;
use crate::submission::metrics::SubmissionCounters;
use crate::submission::{
    BulkSubmissionCoordinator, ChunkSizeController, ResolvedBehaviors, SubmissionSummary,
    SubmitBehavior, SubmitEndpoint, WorkerContext,
};
use crate::validation::{validate_job_id, validate_parallelism, validate_tasks};
use chrono::Utc;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

pub struct TaskOperations {
    endpoint: Arc<dyn SubmitEndpoint>,
    chunk_size: Arc<ChunkSizeController>,
    behaviors: Vec<SubmitBehavior>,
    config: BulkSubmitConfig,
}

impl TaskOperations {
    /// Client with default configuration and its own chunk-size controller
    pub fn new(endpoint: Arc<dyn SubmitEndpoint>) -> Self {
        let config = BulkSubmitConfig::default();
        Self {
            endpoint,
            chunk_size: Arc::new(ChunkSizeController::new(config.initial_chunk_size)),
            behaviors: Vec::new(),
            config,
        }
    }

    pub fn with_config(endpoint: Arc<dyn SubmitEndpoint>, config: BulkSubmitConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            endpoint,
            chunk_size: Arc::new(ChunkSizeController::new(config.initial_chunk_size)),
            behaviors: Vec::new(),
            config,
        })
    }

    /// Share a chunk-size controller with other clients, e.g.
    /// [`ChunkSizeController::process_wide`]
    pub fn with_chunk_size_controller(mut self, chunk_size: Arc<ChunkSizeController>) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Add a behavior applied to every call made by this client
    pub fn with_behavior(mut self, behavior: SubmitBehavior) -> Self {
        self.behaviors.push(behavior);
        self
    }

    pub fn chunk_size_controller(&self) -> &Arc<ChunkSizeController> {
        &self.chunk_size
    }

    pub fn config(&self) -> &BulkSubmitConfig {
        &self.config
    }

    /// Add `tasks` to `job_id`.
    ///
    /// `additional_behaviors` are applied after the client's own behaviors. Succeeds
    /// when every task was created, counting tasks the service reports as already
    /// existing. Otherwise returns a [`BulkSubmitError`](crate::error::BulkSubmitError)
    /// listing rejected and unsubmitted tasks.
    #[instrument(skip(self, tasks, additional_behaviors), fields(task_count = tasks.len()))]
    pub async fn create_tasks(
        &self,
        job_id: &str,
        tasks: Vec<TaskDescriptor>,
        additional_behaviors: &[SubmitBehavior],
    ) -> Result<SubmissionSummary> {
        validate_job_id(job_id)?;
        validate_tasks(&tasks)?;

        let behaviors =
            ResolvedBehaviors::resolve(self.behaviors.iter().chain(additional_behaviors));
        let parallelism = behaviors
            .max_degree_of_parallelism
            .unwrap_or(self.config.max_degree_of_parallelism);
        validate_parallelism(parallelism)?;

        if tasks.is_empty() {
            debug!(job_id = %job_id, "No tasks to submit");
            return Ok(SubmissionSummary::from_counters(
                job_id,
                0,
                &SubmissionCounters::default(),
                self.chunk_size.current(),
                Utc::now(),
            ));
        }

        // A child token lets a deadline stop this call without cancelling the caller's token.
        let cancellation = behaviors
            .cancellation
            .as_ref()
            .map(CancellationToken::child_token)
            .unwrap_or_default();

        let context = WorkerContext {
            endpoint: self.endpoint.clone(),
            chunk_size: self.chunk_size.clone(),
            behaviors,
            request_timeout: self.config.request_timeout(),
            return_client_request_id: self.config.return_client_request_id,
            cancellation,
        };

        BulkSubmissionCoordinator::new(context, parallelism, self.config.max_attempts_per_task)
            .create_tasks(job_id, tasks)
            .await
    }
}
