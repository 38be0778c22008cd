//! # Submission Behaviors
//!
//! Behaviors customize a `create_tasks` call. Clients carry a list of default
//! behaviors; each call may append more. The lists are applied in order, so a later
//! single-valued setting (parallelism, deadline, cancellation) wins over an earlier
//! one, while request modifiers accumulate.

use crate::models::SubmitOptions;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Parallelism settings for a bulk submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParallelOptions {
    pub max_degree_of_parallelism: usize,
}

impl ParallelOptions {
    pub fn new(max_degree_of_parallelism: usize) -> Self {
        Self {
            max_degree_of_parallelism,
        }
    }
}

/// Adjusts the options of every remote call made on behalf of a submission
pub type RequestModifier = Arc<dyn Fn(&mut SubmitOptions) + Send + Sync>;

#[derive(Clone)]
pub enum SubmitBehavior {
    Parallel(ParallelOptions),
    ModifyRequest(RequestModifier),
    /// Stop the submission when the token is cancelled
    Cancellation(CancellationToken),
    /// Stop the submission once this much time has passed since it started
    Deadline(Duration),
}

impl SubmitBehavior {
    pub fn parallelism(max_degree_of_parallelism: usize) -> Self {
        Self::Parallel(ParallelOptions::new(max_degree_of_parallelism))
    }

    pub fn modify_request<F>(modifier: F) -> Self
    where
        F: Fn(&mut SubmitOptions) + Send + Sync + 'static,
    {
        Self::ModifyRequest(Arc::new(modifier))
    }
}

impl fmt::Debug for SubmitBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitBehavior::Parallel(options) => f.debug_tuple("Parallel").field(options).finish(),
            SubmitBehavior::ModifyRequest(_) => f.write_str("ModifyRequest(..)"),
            SubmitBehavior::Cancellation(token) => f
                .debug_tuple("Cancellation")
                .field(&token.is_cancelled())
                .finish(),
            SubmitBehavior::Deadline(duration) => {
                f.debug_tuple("Deadline").field(duration).finish()
            }
        }
    }
}

/// Effective settings after applying a behavior list
#[derive(Clone, Default)]
pub struct ResolvedBehaviors {
    pub max_degree_of_parallelism: Option<usize>,
    pub request_modifiers: Vec<RequestModifier>,
    pub cancellation: Option<CancellationToken>,
    pub deadline: Option<Duration>,
}

impl ResolvedBehaviors {
    pub fn resolve<'a>(behaviors: impl IntoIterator<Item = &'a SubmitBehavior>) -> Self {
        let mut resolved = Self::default();

        for behavior in behaviors {
            match behavior {
                SubmitBehavior::Parallel(options) => {
                    resolved.max_degree_of_parallelism = Some(options.max_degree_of_parallelism);
                }
                SubmitBehavior::ModifyRequest(modifier) => {
                    resolved.request_modifiers.push(modifier.clone());
                }
                SubmitBehavior::Cancellation(token) => {
                    resolved.cancellation = Some(token.clone());
                }
                SubmitBehavior::Deadline(duration) => {
                    resolved.deadline = Some(*duration);
                }
            }
        }

        resolved
    }

    pub fn apply_request_modifiers(&self, options: &mut SubmitOptions) {
        for modifier in &self.request_modifiers {
            modifier(options);
        }
    }
}

impl fmt::Debug for ResolvedBehaviors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedBehaviors")
            .field("max_degree_of_parallelism", &self.max_degree_of_parallelism)
            .field("request_modifiers", &self.request_modifiers.len())
            .field("cancellation", &self.cancellation.is_some())
            .field("deadline", &self.deadline)
            .finish()
    }
}
