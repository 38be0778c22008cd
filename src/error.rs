//! # Error Types
//!
//! Structured errors for the bulk submission pipeline using thiserror.
//!
//! - [`ServiceError`]: an error body returned by the batch service, either for a
//!   whole request or for a single task inside a successful response
//! - [`EndpointError`]: everything a [`SubmitEndpoint`](crate::submission::SubmitEndpoint)
//!   call can fail with
//! - [`BulkSubmitError`]: the aggregated outcome handed back to `create_tasks` callers

use crate::config::ConfigurationError;
use crate::constants::{error_codes, PAYLOAD_TOO_LARGE_STATUS};
use crate::models::{FailureRecord, TaskDescriptor};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Who the service blames for a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// The request was invalid; resubmitting it unchanged will fail again
    ClientError,
    /// The service failed to process an otherwise valid request
    ServerError,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::ClientError => write!(f, "client_error"),
            ErrorCategory::ServerError => write!(f, "server_error"),
        }
    }
}

/// Error body reported by the batch service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{code} ({category}): {message}")]
pub struct ServiceError {
    pub code: String,
    pub message: String,
    pub category: ErrorCategory,
    /// HTTP status of the response, when the error covers a whole request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ServiceError {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        category: ErrorCategory,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            category,
            status: None,
        }
    }

    pub fn client(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(code, message, ErrorCategory::ClientError)
    }

    pub fn server(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(code, message, ErrorCategory::ServerError)
    }

    /// The error the service returns when a task ID is already taken in the job
    pub fn task_exists(task_id: &str) -> Self {
        Self::client(
            error_codes::TASK_EXISTS,
            format!("The specified task {task_id} already exists"),
        )
    }

    /// The error the service returns when an add-collection body is too large
    pub fn request_body_too_large() -> Self {
        Self::client(
            error_codes::REQUEST_BODY_TOO_LARGE,
            "The request body is too large and exceeds the maximum permissible limit",
        )
        .with_status(PAYLOAD_TOO_LARGE_STATUS)
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn is_task_exists(&self) -> bool {
        self.code == error_codes::TASK_EXISTS
    }

    pub fn is_payload_too_large(&self) -> bool {
        self.code == error_codes::REQUEST_BODY_TOO_LARGE
            || self.status == Some(PAYLOAD_TOO_LARGE_STATUS)
    }
}

/// Failures of a single remote add-collection call
#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Request timed out after {timeout_seconds}s")]
    Timeout { timeout_seconds: u64 },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EndpointError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// The service error carried by this failure, if the service produced one
    pub fn service_error(&self) -> Option<&ServiceError> {
        match self {
            EndpointError::Service(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_payload_too_large(&self) -> bool {
        self.service_error()
            .is_some_and(ServiceError::is_payload_too_large)
    }
}

impl From<serde_json::Error> for EndpointError {
    fn from(error: serde_json::Error) -> Self {
        EndpointError::serialization(error.to_string())
    }
}

/// Outcome of a bulk `create_tasks` call that did not accept every task
#[derive(Debug, Error)]
pub enum BulkSubmitError {
    /// A submission failed for a reason other than per-task classification.
    /// `source` is the endpoint's original error.
    #[error("Bulk task submission for job {job_id} aborted: {source}")]
    Fatal {
        job_id: String,
        #[source]
        source: EndpointError,
        failed_tasks: Vec<FailureRecord>,
        pending_tasks: Vec<TaskDescriptor>,
    },

    /// Some tasks were rejected by the service with non-retryable errors
    #[error(
        "Bulk task creation for job {job_id} partially failed: {} task(s) rejected, {} task(s) not submitted",
        failed_tasks.len(),
        pending_tasks.len()
    )]
    PartialFailure {
        job_id: String,
        failed_tasks: Vec<FailureRecord>,
        pending_tasks: Vec<TaskDescriptor>,
    },

    /// The caller's cancellation token fired or the deadline elapsed
    #[error(
        "Bulk task submission for job {job_id} cancelled with {} task(s) not submitted",
        pending_tasks.len()
    )]
    Cancelled {
        job_id: String,
        failed_tasks: Vec<FailureRecord>,
        pending_tasks: Vec<TaskDescriptor>,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// A worker panicked. Its in-flight batch was returned to the queue, so
    /// `pending_tasks` still covers every unconfirmed task.
    #[error("Submission worker for job {job_id} panicked: {message}")]
    WorkerPanicked {
        job_id: String,
        message: String,
        failed_tasks: Vec<FailureRecord>,
        pending_tasks: Vec<TaskDescriptor>,
    },
}

impl BulkSubmitError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Tasks the service rejected with a terminal error
    pub fn failed_tasks(&self) -> &[FailureRecord] {
        match self {
            BulkSubmitError::Fatal { failed_tasks, .. }
            | BulkSubmitError::PartialFailure { failed_tasks, .. }
            | BulkSubmitError::Cancelled { failed_tasks, .. }
            | BulkSubmitError::WorkerPanicked { failed_tasks, .. } => failed_tasks,
            _ => &[],
        }
    }

    /// Tasks that were still queued, and so not confirmed, when the call stopped
    pub fn pending_tasks(&self) -> &[TaskDescriptor] {
        match self {
            BulkSubmitError::Fatal { pending_tasks, .. }
            | BulkSubmitError::PartialFailure { pending_tasks, .. }
            | BulkSubmitError::Cancelled { pending_tasks, .. }
            | BulkSubmitError::WorkerPanicked { pending_tasks, .. } => pending_tasks,
            _ => &[],
        }
    }

    /// The endpoint error that aborted the call, if any
    pub fn endpoint_error(&self) -> Option<&EndpointError> {
        match self {
            BulkSubmitError::Fatal { source, .. } => Some(source),
            _ => None,
        }
    }

    pub fn is_partial_failure(&self) -> bool {
        matches!(self, BulkSubmitError::PartialFailure { .. })
    }
}

pub type EndpointResult<T> = std::result::Result<T, EndpointError>;
pub type Result<T> = std::result::Result<T, BulkSubmitError>;
