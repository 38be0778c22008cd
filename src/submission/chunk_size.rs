//! # Chunk Size Controller
//!
//! Shared upper bound on tasks per add-collection request. The bound starts at the
//! service maximum and only ever shrinks: a worker that gets a "payload too large"
//! rejection lowers it for every other worker sharing the controller, so the limit
//! is discovered once rather than per worker.

use crate::constants::defaults;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::info;

static PROCESS_WIDE: OnceLock<Arc<ChunkSizeController>> = OnceLock::new();

#[derive(Debug)]
pub struct ChunkSizeController {
    bound: AtomicUsize,
}

impl ChunkSizeController {
    /// Controller starting at `initial`, clamped to at least 1
    pub fn new(initial: usize) -> Self {
        Self {
            bound: AtomicUsize::new(initial.max(1)),
        }
    }

    /// Controller shared by every client in the process that opts into it
    pub fn process_wide() -> Arc<ChunkSizeController> {
        PROCESS_WIDE
            .get_or_init(|| Arc::new(ChunkSizeController::default()))
            .clone()
    }

    pub fn current(&self) -> usize {
        self.bound.load(Ordering::Acquire)
    }

    /// Lower the bound to `candidate` unless it is already at or below it.
    ///
    /// Returns `true` if this call changed the bound. Concurrent callers converge on
    /// the smallest candidate.
    pub fn lower_to(&self, candidate: usize) -> bool {
        let candidate = candidate.max(1);
        let mut current = self.current();

        while candidate < current {
            match self.bound.compare_exchange_weak(
                current,
                candidate,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(previous) => {
                    info!(
                        previous_bound = previous,
                        new_bound = candidate,
                        "📉 CHUNK SIZE: Lowered tasks-per-request bound"
                    );
                    return true;
                }
                Err(observed) => current = observed,
            }
        }

        false
    }
}

impl Default for ChunkSizeController {
    fn default() -> Self {
        Self::new(defaults::MAX_TASKS_PER_REQUEST)
    }
}
