//! # Add-Collection Request and Response Types

use crate::constants::error_codes;
use crate::error::{ErrorCategory, ServiceError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use uuid::Uuid;

/// Per-task status reported by the service for one add-collection call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskAddStatus {
    Success,
    ClientError,
    ServerError,
}

/// Result for a single task inside a [`BatchResponse`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskAddResult {
    pub task_id: String,
    pub status: TaskAddStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ServiceError>,
}

impl TaskAddResult {
    pub fn success(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            status: TaskAddStatus::Success,
            error: None,
        }
    }

    pub fn client_error(task_id: impl Into<String>, error: ServiceError) -> Self {
        Self {
            task_id: task_id.into(),
            status: TaskAddStatus::ClientError,
            error: Some(error),
        }
    }

    pub fn server_error(task_id: impl Into<String>, error: ServiceError) -> Self {
        Self {
            task_id: task_id.into(),
            status: TaskAddStatus::ServerError,
            error: Some(error),
        }
    }

    /// The reported error, or a placeholder when the service sent a failure status
    /// without an error body
    pub fn error_or_unknown(&self) -> ServiceError {
        self.error.clone().unwrap_or_else(|| {
            let category = match self.status {
                TaskAddStatus::ServerError => ErrorCategory::ServerError,
                _ => ErrorCategory::ClientError,
            };
            ServiceError::new(
                error_codes::UNKNOWN,
                format!("Task {} reported {:?} without error details", self.task_id, self.status),
                category,
            )
        })
    }
}

/// Response to one add-collection call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResponse {
    #[serde(default)]
    pub results: Vec<TaskAddResult>,
}

impl BatchResponse {
    pub fn new(results: Vec<TaskAddResult>) -> Self {
        Self { results }
    }

    /// Response that accepts every task in `task_ids`
    pub fn all_succeeded<'a>(task_ids: impl IntoIterator<Item = &'a str>) -> Self {
        Self::new(task_ids.into_iter().map(TaskAddResult::success).collect())
    }
}

/// A task the service rejected with a terminal error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub task_id: String,
    pub error: ServiceError,
    pub recorded_at: DateTime<Utc>,
}

impl FailureRecord {
    pub fn new(task_id: impl Into<String>, error: ServiceError) -> Self {
        Self {
            task_id: task_id.into(),
            error,
            recorded_at: Utc::now(),
        }
    }
}

/// Options sent with each remote add-collection call.
///
/// A fresh instance (and client request ID) is built for every call, including
/// resubmissions of a bisected batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitOptions {
    /// Caller-generated identity of the request, for service-side tracing
    pub client_request_id: Uuid,
    /// Ask the service to echo `client_request_id` in the response
    pub return_client_request_id: bool,
    /// Server-side processing timeout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,
    /// Time the request was issued
    pub ocp_date: DateTime<Utc>,
    /// Additional headers to attach to the request
    #[serde(default)]
    pub custom_headers: HashMap<String, String>,
}

impl SubmitOptions {
    pub fn new() -> Self {
        Self {
            client_request_id: Uuid::new_v4(),
            return_client_request_id: true,
            timeout: None,
            ocp_date: Utc::now(),
            custom_headers: HashMap::new(),
        }
    }
}

impl Default for SubmitOptions {
    fn default() -> Self {
        Self::new()
    }
}
