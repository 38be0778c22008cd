//! # Submission Outcome Classification
//!
//! Every response from the endpoint is classified exactly once, here, into tagged
//! outcomes. Workers then act on the tags with a plain `match` instead of inspecting
//! error types and codes themselves.
//!
//! ```text
//! TaskAddResult ──▶ TaskOutcome   { Accepted | AlreadyExists | Retryable | Rejected }
//! EndpointError ──▶ BatchFailure  { PayloadTooLarge | Fatal }
//! ```

use crate::error::{EndpointError, ServiceError};
use crate::models::{TaskAddResult, TaskAddStatus};

/// What happened to one task in a successful add-collection response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The service created the task
    Accepted,
    /// An earlier attempt created the task and its acknowledgement was lost
    AlreadyExists,
    /// The service failed on its side; submitting again may succeed
    Retryable(ServiceError),
    /// The service rejected the task itself; submitting again will not help
    Rejected(ServiceError),
}

/// Why a whole add-collection call failed
#[derive(Debug)]
pub enum BatchFailure {
    /// The request body was over the service's payload limit
    PayloadTooLarge(EndpointError),
    /// Anything else; the worker stops and the call is aborted
    Fatal(EndpointError),
}

impl BatchFailure {
    pub fn into_error(self) -> EndpointError {
        match self {
            BatchFailure::PayloadTooLarge(err) | BatchFailure::Fatal(err) => err,
        }
    }
}

pub fn classify_task_result(result: &TaskAddResult) -> TaskOutcome {
    match result.status {
        TaskAddStatus::Success => TaskOutcome::Accepted,
        TaskAddStatus::ServerError => TaskOutcome::Retryable(result.error_or_unknown()),
        TaskAddStatus::ClientError => {
            let error = result.error_or_unknown();
            if error.is_task_exists() {
                TaskOutcome::AlreadyExists
            } else {
                TaskOutcome::Rejected(error)
            }
        }
    }
}

pub fn classify_batch_error(error: EndpointError) -> BatchFailure {
    if error.is_payload_too_large() {
        BatchFailure::PayloadTooLarge(error)
    } else {
        BatchFailure::Fatal(error)
    }
}
