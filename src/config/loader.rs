//! Configuration Loader
//!
//! Layers an optional configuration file under `BULK_SUBMIT__*` environment
//! overrides using the `config` crate, then validates the result.

use super::error::{ConfigResult, ConfigurationError};
use super::BulkSubmitConfig;
use crate::constants::env;
use config::{Config, Environment, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Loaded, validated configuration plus where it came from
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: BulkSubmitConfig,
    environment: String,
    source_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Load configuration from an optional file plus environment overrides
    pub fn load(path: Option<impl AsRef<Path>>) -> ConfigResult<Arc<ConfigManager>> {
        let source_path = path.map(|p| p.as_ref().to_path_buf());
        let config = Self::build(source_path.as_deref(), true)?;
        Ok(Arc::new(Self::from_parts(config, source_path)))
    }

    /// Load configuration from a file only, ignoring environment overrides.
    /// Useful in tests that must not depend on process-wide variables.
    pub fn load_file(path: impl AsRef<Path>) -> ConfigResult<Arc<ConfigManager>> {
        let source_path = path.as_ref().to_path_buf();
        if !source_path.is_file() {
            return Err(ConfigurationError::load_error(
                source_path.display().to_string(),
                "file not found",
            ));
        }
        let config = Self::build(Some(&source_path), false)?;
        Ok(Arc::new(Self::from_parts(config, Some(source_path))))
    }

    pub fn config(&self) -> &BulkSubmitConfig {
        &self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// Current deployment environment name
    pub fn detect_environment() -> String {
        std::env::var(env::ENVIRONMENT)
            .or_else(|_| std::env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string())
    }

    fn from_parts(config: BulkSubmitConfig, source_path: Option<PathBuf>) -> Self {
        let environment = Self::detect_environment();

        info!(
            environment = %environment,
            source = ?source_path,
            initial_chunk_size = config.initial_chunk_size,
            max_degree_of_parallelism = config.max_degree_of_parallelism,
            max_attempts_per_task = ?config.max_attempts_per_task,
            "⚙️ CONFIG: Bulk submission configuration loaded"
        );

        Self {
            config,
            environment,
            source_path,
        }
    }

    fn build(path: Option<&Path>, with_environment: bool) -> ConfigResult<BulkSubmitConfig> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            debug!(path = %path.display(), "Adding configuration file source");
            builder = builder.add_source(File::from(path).required(false));
        }

        if with_environment {
            builder = builder.add_source(
                Environment::with_prefix(env::CONFIG_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            );
        }

        let source_name = path
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "environment".to_string());

        let config: BulkSubmitConfig = builder
            .build()
            .and_then(|c| c.try_deserialize::<BulkSubmitConfig>())
            .map_err(|e| ConfigurationError::load_error(source_name, e))?;

        config.validate()?;
        Ok(config)
    }
}
