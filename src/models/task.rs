//! # Task Descriptor
//!
//! The immutable description of a task to create. The pipeline only ever looks at
//! the task ID; the payload is forwarded to the endpoint untouched.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A task to be created in a job.
///
/// The `id` must be unique within the job. The `payload` carries the task's
/// configuration (command line, resource files, constraints, ...) in whatever shape
/// the endpoint serializes; it is opaque to the submission pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDescriptor {
    id: String,
    #[serde(default)]
    payload: Value,
}

impl TaskDescriptor {
    pub fn new(id: impl Into<String>, payload: Value) -> Self {
        Self {
            id: id.into(),
            payload,
        }
    }

    /// Descriptor with an empty payload
    pub fn with_id(id: impl Into<String>) -> Self {
        Self::new(id, Value::Null)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }
}

impl fmt::Display for TaskDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}
