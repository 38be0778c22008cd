//! Input validation for bulk submissions
//!
//! Checks the caller can get wrong before any remote call is made. Anything the
//! service itself validates (ID character sets, payload contents) is left to it and
//! comes back as a per-task rejection.

use crate::error::{BulkSubmitError, Result};
use crate::models::TaskDescriptor;
use std::collections::HashSet;

pub fn validate_job_id(job_id: &str) -> Result<()> {
    if job_id.trim().is_empty() {
        return Err(BulkSubmitError::invalid_input("job ID must not be empty"));
    }
    Ok(())
}

/// Task IDs must be present and unique within one call
pub fn validate_tasks(tasks: &[TaskDescriptor]) -> Result<()> {
    let mut seen = HashSet::with_capacity(tasks.len());

    for (index, task) in tasks.iter().enumerate() {
        if task.id().trim().is_empty() {
            return Err(BulkSubmitError::invalid_input(format!(
                "task at position {index} has an empty ID"
            )));
        }

        if !seen.insert(task.id()) {
            return Err(BulkSubmitError::invalid_input(format!(
                "task ID {} appears more than once",
                task.id()
            )));
        }
    }

    Ok(())
}

pub fn validate_parallelism(max_degree_of_parallelism: usize) -> Result<()> {
    if max_degree_of_parallelism == 0 {
        return Err(BulkSubmitError::invalid_input(
            "max degree of parallelism must be at least 1",
        ));
    }
    Ok(())
}
