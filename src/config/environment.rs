// ABOUTME: Environment configuration for the analytics engine
// ABOUTME: Parses ASCEND_* variables into cache, task pool and sweep settings with validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ascend Analytics Contributors

//! Environment-based configuration management

use crate::constants::{cache, tasks, time};
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Result cache settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheSettings {
    /// Hours a computed analysis stays fresh
    pub ttl_hours: u64,
    /// Maximum number of cached analyses before LRU eviction
    pub max_entries: usize,
    /// Seconds between expired-entry purges
    pub purge_interval_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_hours: cache::DEFAULT_RESULT_TTL_HOURS,
            max_entries: cache::DEFAULT_CACHE_MAX_ENTRIES,
            purge_interval_secs: cache::DEFAULT_PURGE_INTERVAL_SECS,
        }
    }
}

/// Background task pool settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskSettings {
    /// Number of analyses allowed to run concurrently
    pub workers: usize,
    /// Seconds between finished-task cleanup sweeps
    pub cleanup_interval_secs: u64,
    /// Seconds a finished task's result stays retrievable
    pub result_retention_secs: u64,
}

impl Default for TaskSettings {
    fn default() -> Self {
        Self {
            workers: tasks::DEFAULT_TASK_WORKERS,
            cleanup_interval_secs: tasks::DEFAULT_TASK_CLEANUP_INTERVAL_SECS,
            result_retention_secs: tasks::DEFAULT_TASK_RESULT_RETENTION_SECS,
        }
    }
}

/// Periodic sweep settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SweepSettings {
    /// Whether `start_background_sweeps` installs anything
    pub enabled: bool,
    /// Seconds to wait before retrying a failed sweep iteration
    pub retry_secs: u64,
}

impl Default for SweepSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            retry_secs: tasks::DEFAULT_SWEEP_RETRY_SECS,
        }
    }
}

/// Top-level analytics configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalyticsConfig {
    /// Result cache
    pub cache: CacheSettings,
    /// Task pool
    pub tasks: TaskSettings,
    /// Maintenance sweeps
    pub sweeps: SweepSettings,
}

impl AnalyticsConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` if a variable is set but cannot be parsed, or
    /// if the resulting configuration fails validation
    pub fn from_env() -> AppResult<Self> {
        info!("Loading analytics configuration from environment variables");
        let config = Self::from_lookup(|key| env::var(key).ok())?;
        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Build configuration from an arbitrary key lookup
    ///
    /// # Errors
    ///
    /// Same as [`AnalyticsConfig::from_env`]
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            cache: CacheSettings {
                ttl_hours: parse_or(&lookup, "ASCEND_CACHE_TTL_HOURS", defaults.cache.ttl_hours)?,
                max_entries: parse_or(
                    &lookup,
                    "ASCEND_CACHE_MAX_ENTRIES",
                    defaults.cache.max_entries,
                )?,
                purge_interval_secs: parse_or(
                    &lookup,
                    "ASCEND_CACHE_PURGE_INTERVAL_SECS",
                    defaults.cache.purge_interval_secs,
                )?,
            },
            tasks: TaskSettings {
                workers: parse_or(&lookup, "ASCEND_TASK_WORKERS", defaults.tasks.workers)?,
                cleanup_interval_secs: parse_or(
                    &lookup,
                    "ASCEND_TASK_CLEANUP_INTERVAL_SECS",
                    defaults.tasks.cleanup_interval_secs,
                )?,
                result_retention_secs: parse_or(
                    &lookup,
                    "ASCEND_TASK_RESULT_RETENTION_SECS",
                    defaults.tasks.result_retention_secs,
                )?,
            },
            sweeps: SweepSettings {
                enabled: parse_or(
                    &lookup,
                    "ASCEND_ENABLE_BACKGROUND_SWEEPS",
                    defaults.sweeps.enabled,
                )?,
                retry_secs: parse_or(&lookup, "ASCEND_SWEEP_RETRY_SECS", defaults.sweeps.retry_secs)?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` for a zero worker pool, zero TTL, zero
    /// intervals, or a retry interval longer than either sweep interval
    pub fn validate(&self) -> AppResult<()> {
        if self.tasks.workers == 0 {
            return Err(AppError::config_invalid(
                "ASCEND_TASK_WORKERS must be at least 1",
            ));
        }

        if self.cache.ttl_hours == 0 {
            return Err(AppError::config_invalid(
                "ASCEND_CACHE_TTL_HOURS must be at least 1",
            ));
        }

        if self.cache.purge_interval_secs == 0 || self.tasks.cleanup_interval_secs == 0 {
            return Err(AppError::config_invalid(
                "Sweep intervals must be at least one second",
            ));
        }

        if self.sweeps.retry_secs == 0 {
            return Err(AppError::config_invalid(
                "ASCEND_SWEEP_RETRY_SECS must be at least 1",
            ));
        }

        let shortest_interval = self
            .cache
            .purge_interval_secs
            .min(self.tasks.cleanup_interval_secs);
        if self.sweeps.retry_secs > shortest_interval {
            return Err(AppError::config_invalid(format!(
                "ASCEND_SWEEP_RETRY_SECS ({}) must not exceed the sweep interval ({shortest_interval})",
                self.sweeps.retry_secs
            )));
        }

        Ok(())
    }

    /// Result TTL as a duration
    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_hours.saturating_mul(time::HOUR_SECONDS))
    }

    /// Get a summary of the configuration for logging
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Ascend Analytics Configuration: cache ttl {}h, {} max entries, purge every {}s; \
             {} task workers, cleanup every {}s, results kept {}s; background sweeps {} (retry {}s)",
            self.cache.ttl_hours,
            self.cache.max_entries,
            self.cache.purge_interval_secs,
            self.tasks.workers,
            self.tasks.cleanup_interval_secs,
            self.tasks.result_retention_secs,
            if self.sweeps.enabled {
                "enabled"
            } else {
                "disabled"
            },
            self.sweeps.retry_secs,
        )
    }
}

/// Parse a variable through `lookup`, falling back to `default` when unset
fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> AppResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e| {
            AppError::config_invalid(format!("Invalid {key} value '{raw}': {e}"))
                .with_resource_id(key)
        }),
        None => Ok(default),
    }
}
