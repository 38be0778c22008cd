//! # Client Operations
//!
//! Caller-facing entry points. [`TaskOperations`] owns the endpoint, the chunk-size
//! controller, client-wide behaviors and configuration, and runs bulk submissions.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bulk_task_submit::client::TaskOperations;
//! use bulk_task_submit::models::TaskDescriptor;
//! use bulk_task_submit::submission::{SubmitBehavior, SubmitEndpoint};
//! use std::sync::Arc;
//!
//! # async fn example(endpoint: Arc<dyn SubmitEndpoint>) -> Result<(), Box<dyn std::error::Error>> {
//! let operations = TaskOperations::new(endpoint);
//!
//! let tasks = (0..1_000)
//!     .map(|i| TaskDescriptor::new(format!("frame-{i}"), serde_json::json!({
//!         "command_line": format!("render --frame {i}")
//!     })))
//!     .collect();
//!
//! let summary = operations
//!     .create_tasks("render-job", tasks, &[SubmitBehavior::parallelism(4)])
//!     .await?;
//! println!("submitted in {} requests", summary.batches_submitted);
//! # Ok(())
//! # }
//! ```

pub mod task_operations;

pub use task_operations::TaskOperations;
