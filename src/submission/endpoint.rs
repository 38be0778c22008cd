//! # Remote Submit Endpoint
//!
//! The seam between the submission pipeline and the batch service's protocol layer.
//! Implementations own transport, serialization, and authentication; the pipeline
//! only sees per-task results or an [`EndpointError`].

use crate::error::EndpointResult;
use crate::models::{BatchResponse, SubmitOptions, TaskDescriptor};
use async_trait::async_trait;

/// Adds a collection of tasks to a job in a single remote call
#[async_trait]
pub trait SubmitEndpoint: Send + Sync {
    /// Submit `tasks` to `job_id`.
    ///
    /// A successful response reports a result per task. A request whose body is too
    /// large must fail with a service error that reports
    /// [`is_payload_too_large`](crate::error::ServiceError::is_payload_too_large).
    async fn submit_batch(
        &self,
        job_id: &str,
        tasks: &[TaskDescriptor],
        options: &SubmitOptions,
    ) -> EndpointResult<BatchResponse>;

    /// Endpoint name for logging
    fn endpoint_name(&self) -> &str {
        "batch-service"
    }
}
