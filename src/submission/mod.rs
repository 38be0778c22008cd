//! # Bulk Task Submission
//!
//! Adaptive, concurrent submission of large task collections to a job.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐    ┌────────────────────┐    ┌──────────────────┐
//! │ BulkSubmission   │───▶│ SubmissionWorker   │───▶│ SubmitEndpoint   │
//! │ Coordinator      │    │ (up to N at once)  │    │ (batch service)  │
//! └──────────────────┘    └────────────────────┘    └──────────────────┘
//!          │                        │
//!          ▼                        ▼
//!   SubmissionState          ChunkSizeController
//!   (queue, failures)        (shared, only shrinks)
//! ```
//!
//! - [`ChunkSizeController`]: tasks-per-request bound, lowered on oversized requests
//! - [`SubmissionWorker`]: submits one chunk and sorts its per-task results
//! - [`BulkSubmissionCoordinator`]: bounded worker pool, stop conditions, outcome
//! - [`classifier`]: maps endpoint responses to tagged outcomes, once
//! - [`SubmitBehavior`]: per-call parallelism, request modifiers, cancellation

pub mod behaviors;
pub mod chunk_size;
pub mod classifier;
pub mod coordinator;
pub mod endpoint;
pub mod metrics;
pub mod state;
pub mod worker;

pub use behaviors::{ParallelOptions, RequestModifier, ResolvedBehaviors, SubmitBehavior};
pub use chunk_size::ChunkSizeController;
pub use classifier::{BatchFailure, TaskOutcome};
pub use coordinator::BulkSubmissionCoordinator;
pub use endpoint::SubmitEndpoint;
pub use metrics::SubmissionSummary;
pub use state::SubmissionState;
pub use worker::{SubmissionWorker, WorkerContext, WorkerExit};
