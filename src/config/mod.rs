//! # Bulk Submission Configuration
//!
//! Client-wide defaults for the bulk submission pipeline. Per-call behaviors
//! (see [`crate::submission::SubmitBehavior`]) override these for a single call.
//!
//! ## Sources
//!
//! - [`BulkSubmitConfig::default`]: built-in defaults
//! - [`BulkSubmitConfig::from_env`]: flat `BULK_SUBMIT_*` environment variables
//! - [`ConfigManager::load`]: optional config file layered under `BULK_SUBMIT__*`
//!   environment overrides via the `config` crate
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bulk_task_submit::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load(Some("config/bulk-submit.toml"))?;
//! let parallelism = manager.config().max_degree_of_parallelism;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use crate::constants::{defaults, env};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulkSubmitConfig {
    /// Starting tasks-per-request bound for chunk-size controllers created by the client
    pub initial_chunk_size: usize,
    /// Default number of concurrent submission workers per `create_tasks` call
    pub max_degree_of_parallelism: usize,
    /// Cap on submissions of a single task that keep failing with server errors.
    /// `None` retries until the queue drains or the call stops for another reason.
    pub max_attempts_per_task: Option<u32>,
    /// Server-side timeout attached to every add-collection request
    pub request_timeout_seconds: Option<u64>,
    /// Ask the service to echo client request IDs
    pub return_client_request_id: bool,
}

impl Default for BulkSubmitConfig {
    fn default() -> Self {
        Self {
            initial_chunk_size: defaults::MAX_TASKS_PER_REQUEST,
            max_degree_of_parallelism: defaults::MAX_DEGREE_OF_PARALLELISM,
            max_attempts_per_task: None,
            request_timeout_seconds: None,
            return_client_request_id: true,
        }
    }
}

impl BulkSubmitConfig {
    pub fn from_env() -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(value) = read_env(env::INITIAL_CHUNK_SIZE) {
            config.initial_chunk_size = value.parse().map_err(|e| {
                ConfigurationError::invalid_value("initial_chunk_size", &value, format!("{e}"))
            })?;
        }

        if let Some(value) = read_env(env::MAX_DEGREE_OF_PARALLELISM) {
            config.max_degree_of_parallelism = value.parse().map_err(|e| {
                ConfigurationError::invalid_value(
                    "max_degree_of_parallelism",
                    &value,
                    format!("{e}"),
                )
            })?;
        }

        if let Some(value) = read_env(env::MAX_ATTEMPTS_PER_TASK) {
            config.max_attempts_per_task = Some(value.parse().map_err(|e| {
                ConfigurationError::invalid_value("max_attempts_per_task", &value, format!("{e}"))
            })?);
        }

        if let Some(value) = read_env(env::REQUEST_TIMEOUT_SECONDS) {
            config.request_timeout_seconds = Some(value.parse().map_err(|e| {
                ConfigurationError::invalid_value(
                    "request_timeout_seconds",
                    &value,
                    format!("{e}"),
                )
            })?);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.initial_chunk_size == 0 {
            return Err(ConfigurationError::invalid_value(
                "initial_chunk_size",
                self.initial_chunk_size,
                "must be at least 1",
            ));
        }

        if self.max_degree_of_parallelism == 0 {
            return Err(ConfigurationError::invalid_value(
                "max_degree_of_parallelism",
                self.max_degree_of_parallelism,
                "must be at least 1",
            ));
        }

        if self.max_attempts_per_task == Some(0) {
            return Err(ConfigurationError::invalid_value(
                "max_attempts_per_task",
                0,
                "must be at least 1 when set",
            ));
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_seconds.map(Duration::from_secs)
    }
}

fn read_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}
