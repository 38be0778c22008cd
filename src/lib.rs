#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Bulk Task Submit
//!
//! Adaptive, concurrent bulk task submission for batch-compute job services.
//!
//! ## Overview
//!
//! Batch services accept a limited number of tasks per add-collection request. This
//! crate turns an arbitrarily long list of tasks into a series of concurrent,
//! adaptively sized requests, tolerates partial failure, and reports one aggregated
//! outcome.
//!
//! ## Key Features
//!
//! - **Adaptive chunking**: requests start at the service maximum of 100 tasks and
//!   shrink, for every worker at once, when the service rejects a payload as too large
//! - **Bounded parallelism**: a configurable number of concurrent requests per call
//! - **Idempotent retries**: server-side per-task failures are resubmitted, and
//!   "task already exists" counts as success
//! - **Partial failure reporting**: rejected and unsubmitted tasks are returned so
//!   callers can retry exactly what is left
//! - **Cancellation and deadlines**: stop a long submission cleanly
//!
//! ## Module Organization
//!
//! - [`client`] - `TaskOperations`, the caller-facing entry point
//! - [`submission`] - coordinator, workers, chunk-size controller, classification
//! - [`models`] - task descriptors, per-task results, request options
//! - [`config`] - configuration loading and validation
//! - [`error`] - structured error handling
//! - [`logging`] - structured logging setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bulk_task_submit::{TaskOperations, TaskDescriptor, SubmitBehavior, SubmitEndpoint};
//! use std::sync::Arc;
//!
//! # async fn example(endpoint: Arc<dyn SubmitEndpoint>) -> Result<(), Box<dyn std::error::Error>> {
//! bulk_task_submit::logging::init_structured_logging();
//!
//! let operations = TaskOperations::new(endpoint);
//! let tasks: Vec<_> = (0..500)
//!     .map(|i| TaskDescriptor::with_id(format!("task-{i}")))
//!     .collect();
//!
//! match operations.create_tasks("job-1", tasks, &[SubmitBehavior::parallelism(4)]).await {
//!     Ok(summary) => println!("accepted {} tasks", summary.total_tasks),
//!     Err(err) => {
//!         eprintln!("{err}");
//!         for failure in err.failed_tasks() {
//!             eprintln!("{}: {}", failure.task_id, failure.error);
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod models;
pub mod submission;
pub mod validation;

pub use client::TaskOperations;
pub use config::{BulkSubmitConfig, ConfigManager, ConfigurationError};
pub use error::{
    BulkSubmitError, EndpointError, EndpointResult, ErrorCategory, Result, ServiceError,
};
pub use models::{
    BatchResponse, FailureRecord, SubmitOptions, TaskAddResult, TaskAddStatus, TaskDescriptor,
};
pub use submission::{
    ChunkSizeController, ParallelOptions, SubmissionSummary, SubmitBehavior, SubmitEndpoint,
};
