use proptest::prelude::*;
use proptest::sample::subsequence;

/// Stub behavior and call shape for one randomized bulk submission
#[derive(Debug, Clone)]
pub struct SubmissionScenario {
    pub task_count: usize,
    pub parallelism: usize,
    pub initial_chunk_size: usize,
    pub payload_limit: Option<usize>,
    /// Zero-based call that times out, aborting the submission
    pub timeout_on_call: Option<usize>,
    pub rejected: Vec<usize>,
    pub flaky: Vec<usize>,
    pub existing: Vec<usize>,
}

impl SubmissionScenario {
    pub fn task_id(index: usize) -> String {
        format!("task-{index}")
    }

    pub fn rejected_ids(&self) -> Vec<String> {
        self.rejected.iter().copied().map(Self::task_id).collect()
    }

    pub fn flaky_ids(&self) -> Vec<String> {
        self.flaky.iter().copied().map(Self::task_id).collect()
    }

    pub fn existing_ids(&self) -> Vec<String> {
        self.existing.iter().copied().map(Self::task_id).collect()
    }
}

/// Strategy for a subset of task indices, at most `max` of them
fn index_subset_strategy(task_count: usize, max: usize) -> impl Strategy<Value = Vec<usize>> {
    let indices: Vec<usize> = (0..task_count).collect();
    let max = max.min(task_count);
    subsequence(indices, 0..=max)
}

/// Strategy for randomized submission scenarios
pub fn submission_scenario_strategy() -> impl Strategy<Value = SubmissionScenario> {
    let shape = (
        1usize..250,
        1usize..6,
        1usize..=100,
        prop::option::of(1usize..60),
        prop::option::weighted(0.3, 0usize..8),
    );

    shape.prop_flat_map(
        |(task_count, parallelism, initial_chunk_size, payload_limit, timeout_on_call)| {
            (
                index_subset_strategy(task_count, 5),
                index_subset_strategy(task_count, 10),
                index_subset_strategy(task_count, 10),
            )
                .prop_map(move |(rejected, flaky, existing)| SubmissionScenario {
                    task_count,
                    parallelism,
                    initial_chunk_size,
                    payload_limit,
                    timeout_on_call,
                    rejected,
                    flaky,
                    existing,
                })
        },
    )
}

/// Strategy for a sequence of candidate chunk sizes offered to the controller
pub fn chunk_size_candidates_strategy() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0usize..200, 0..40)
}
