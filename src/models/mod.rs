//! # Submission Models
//!
//! Data types exchanged between callers, the submission pipeline, and the remote
//! add-collection endpoint.
//!
//! - [`TaskDescriptor`]: a task the caller wants created in a job
//! - [`TaskAddResult`] / [`BatchResponse`]: per-task results of one remote call
//! - [`FailureRecord`]: a task the service rejected for good
//! - [`SubmitOptions`]: per-request options sent with every remote call

pub mod batch;
pub mod task;

pub use batch::{BatchResponse, FailureRecord, SubmitOptions, TaskAddResult, TaskAddStatus};
pub use task::TaskDescriptor;
