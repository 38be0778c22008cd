//! # Submission Constants
//!
//! Service error codes and operational defaults that bound the bulk submission
//! pipeline.

/// Error codes returned by the batch service that drive submission decisions
pub mod error_codes {
    /// A task with the same ID already exists in the job
    pub const TASK_EXISTS: &str = "TaskExists";
    /// The request body exceeded the service's payload limit
    pub const REQUEST_BODY_TOO_LARGE: &str = "RequestBodyTooLarge";
    /// Used when the service reports a failure without an error body
    pub const UNKNOWN: &str = "Unknown";
}

/// HTTP status the service uses for oversized payloads
pub const PAYLOAD_TOO_LARGE_STATUS: u16 = 413;

/// Operational defaults
pub mod defaults {
    /// Largest number of tasks the service accepts in a single add-collection call
    pub const MAX_TASKS_PER_REQUEST: usize = 100;
    /// Number of concurrently running submission workers
    pub const MAX_DEGREE_OF_PARALLELISM: usize = 1;
}

/// Environment variable names read by configuration and logging
pub mod env {
    pub const ENVIRONMENT: &str = "BULK_SUBMIT_ENV";
    pub const LOG_FORMAT: &str = "BULK_SUBMIT_LOG_FORMAT";
    pub const INITIAL_CHUNK_SIZE: &str = "BULK_SUBMIT_INITIAL_CHUNK_SIZE";
    pub const MAX_DEGREE_OF_PARALLELISM: &str = "BULK_SUBMIT_MAX_DEGREE_OF_PARALLELISM";
    pub const MAX_ATTEMPTS_PER_TASK: &str = "BULK_SUBMIT_MAX_ATTEMPTS_PER_TASK";
    pub const REQUEST_TIMEOUT_SECONDS: &str = "BULK_SUBMIT_REQUEST_TIMEOUT_SECONDS";
    /// Prefix for layered `config` crate environment overrides (`BULK_SUBMIT__FIELD`)
    pub const CONFIG_PREFIX: &str = "BULK_SUBMIT";
}
