//! Shared stub endpoints for integration tests

#![allow(dead_code)]

pub mod strategies;

use async_trait::async_trait;
use bulk_task_submit::{
    BatchResponse, EndpointError, EndpointResult, ServiceError, SubmitEndpoint, SubmitOptions,
    TaskAddResult, TaskDescriptor,
};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// In-memory batch service with scriptable failure modes.
///
/// Tasks it accepts are remembered, so a resubmission of a created task comes back as
/// `TaskExists` just like the real service.
#[derive(Default)]
pub struct StubEndpoint {
    payload_limit: Option<usize>,
    rejected: HashSet<String>,
    existing: HashSet<String>,
    flaky: HashSet<String>,
    always_busy: HashSet<String>,
    fail_first_call: bool,
    timeout_on_call: Option<usize>,
    delay: Duration,

    seen_flaky: Mutex<HashSet<String>>,
    created: Mutex<HashSet<String>>,
    answered_exists: Mutex<HashSet<String>>,
    attempts: Mutex<HashMap<String, usize>>,
    batch_sizes: Mutex<Vec<usize>>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl StubEndpoint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject any request with more than `limit` tasks as too large
    pub fn with_payload_limit(mut self, limit: usize) -> Self {
        self.payload_limit = Some(limit);
        self
    }

    /// Permanently reject these task IDs with a client error
    pub fn rejecting<'a>(mut self, ids: impl IntoIterator<Item = &'a str>) -> Self {
        self.rejected.extend(ids.into_iter().map(String::from));
        self
    }

    /// Pretend these tasks were created by an earlier, unacknowledged call
    pub fn with_existing<'a>(mut self, ids: impl IntoIterator<Item = &'a str>) -> Self {
        self.existing.extend(ids.into_iter().map(String::from));
        self
    }

    /// Fail these task IDs with a server error the first time they are seen
    pub fn flaky<'a>(mut self, ids: impl IntoIterator<Item = &'a str>) -> Self {
        self.flaky.extend(ids.into_iter().map(String::from));
        self
    }

    /// Fail these task IDs with a server error every time
    pub fn always_busy<'a>(mut self, ids: impl IntoIterator<Item = &'a str>) -> Self {
        self.always_busy.extend(ids.into_iter().map(String::from));
        self
    }

    /// Fail the first call with a transport error
    pub fn failing_first_call(mut self) -> Self {
        self.fail_first_call = true;
        self
    }

    /// Time out the `call_index`-th call (zero-based)
    pub fn timing_out_on_call(mut self, call_index: usize) -> Self {
        self.timeout_on_call = Some(call_index);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn created(&self) -> HashSet<String> {
        self.created.lock().clone()
    }

    /// Task IDs the stub answered with `TaskExists`
    pub fn answered_exists(&self) -> HashSet<String> {
        self.answered_exists.lock().clone()
    }

    pub fn attempts(&self, task_id: &str) -> usize {
        self.attempts.lock().get(task_id).copied().unwrap_or(0)
    }

    /// Sizes of requests that got a per-task response
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batch_sizes.lock().clone()
    }

    fn result_for(&self, task: &TaskDescriptor) -> TaskAddResult {
        let id = task.id();
        *self.attempts.lock().entry(id.to_string()).or_insert(0) += 1;

        if self.rejected.contains(id) {
            return TaskAddResult::client_error(
                id,
                ServiceError::client("InvalidPropertyValue", "The value provided is not valid"),
            );
        }

        if self.always_busy.contains(id) {
            return TaskAddResult::server_error(
                id,
                ServiceError::server("ServerBusy", "The server is busy"),
            );
        }

        if self.flaky.contains(id) && self.seen_flaky.lock().insert(id.to_string()) {
            return TaskAddResult::server_error(
                id,
                ServiceError::server("InternalError", "Transient failure"),
            );
        }

        if self.existing.contains(id) || !self.created.lock().insert(id.to_string()) {
            self.answered_exists.lock().insert(id.to_string());
            return TaskAddResult::client_error(id, ServiceError::task_exists(id));
        }

        TaskAddResult::success(id)
    }
}

struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl SubmitEndpoint for StubEndpoint {
    async fn submit_batch(
        &self,
        _job_id: &str,
        tasks: &[TaskDescriptor],
        _options: &SubmitOptions,
    ) -> EndpointResult<BatchResponse> {
        let now_in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = InFlightGuard(&self.in_flight);
        self.max_in_flight.fetch_max(now_in_flight, Ordering::SeqCst);

        let call_index = self.calls.fetch_add(1, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if self.fail_first_call && call_index == 0 {
            return Err(EndpointError::transport("connection reset by peer"));
        }

        if self.timeout_on_call == Some(call_index) {
            return Err(EndpointError::Timeout { timeout_seconds: 30 });
        }

        if let Some(limit) = self.payload_limit {
            if tasks.len() > limit {
                return Err(ServiceError::request_body_too_large().into());
            }
        }

        self.batch_sizes.lock().push(tasks.len());
        Ok(BatchResponse::new(
            tasks.iter().map(|task| self.result_for(task)).collect(),
        ))
    }

    fn endpoint_name(&self) -> &str {
        "stub"
    }
}

pub fn tasks(count: usize) -> Vec<TaskDescriptor> {
    (0..count)
        .map(|i| {
            TaskDescriptor::new(
                format!("task-{i}"),
                serde_json::json!({ "command_line": format!("process --item {i}") }),
            )
        })
        .collect()
}

pub fn ids(tasks: &[TaskDescriptor]) -> HashSet<String> {
    tasks.iter().map(|task| task.id().to_string()).collect()
}
