// ABOUTME: Tracing subscriber setup and the engine's structured log events
// ABOUTME: Reads the filter and output style from the environment, logs to stderr
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ascend Analytics Contributors

//! Structured logging
//!
//! Logs go to stderr so the CLI's JSON reports on stdout stay parseable.
//! `RUST_LOG` holds filter directives (default `info`) and `LOG_FORMAT=json`
//! switches from human-readable lines to one JSON object per event.

use crate::constants::service_names;
use anyhow::{anyhow, Result};
use std::env;
use std::io;
use tracing::info;
use tracing_subscriber::fmt;
use tracing_subscriber::EnvFilter;

/// Subscriber settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// `EnvFilter` directives
    pub filter: String,
    /// One JSON object per event instead of text lines
    pub json: bool,
    /// Reported in the startup event
    pub service_name: String,
    /// Reported in the startup event
    pub environment: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl LoggingConfig {
    /// Read `RUST_LOG`, `LOG_FORMAT`, `SERVICE_NAME` and `ENVIRONMENT`
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            filter: lookup("RUST_LOG").unwrap_or_else(|| "info".to_owned()),
            json: lookup("LOG_FORMAT").is_some_and(|format| format.eq_ignore_ascii_case("json")),
            service_name: lookup("SERVICE_NAME")
                .unwrap_or_else(|| service_names::ASCEND_ANALYTICS.to_owned()),
            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_owned()),
        }
    }

    /// Install the global subscriber and log a startup event
    ///
    /// # Errors
    ///
    /// Returns an error if the filter does not parse or a global subscriber
    /// is already installed
    pub fn init(&self) -> Result<()> {
        let builder = fmt()
            .with_env_filter(EnvFilter::try_new(&self.filter)?)
            .with_writer(io::stderr);

        if self.json {
            builder.json().try_init()
        } else {
            builder.try_init()
        }
        .map_err(|e| anyhow!(e))?;

        info!(
            service.name = %self.service_name,
            service.version = env!("CARGO_PKG_VERSION"),
            environment = %self.environment,
            log.filter = %self.filter,
            log.json = self.json,
            "Logging initialized"
        );
        Ok(())
    }
}

/// Initialize logging from environment
///
/// # Errors
///
/// Returns an error if logging initialization fails
pub fn init_from_env() -> Result<()> {
    LoggingConfig::from_env().init()
}

/// Analytics-specific structured log events
pub struct AnalyticsLogger;

impl AnalyticsLogger {
    /// Log a finished analysis and whether it came from the cache
    pub fn log_analysis(
        user: &str,
        analysis_type: &str,
        window_days: u32,
        cache_hit: bool,
        duration_ms: u64,
    ) {
        info!(
            user = %user,
            analysis_type = %analysis_type,
            analysis.window_days = window_days,
            analysis.cache_hit = cache_hit,
            analysis.duration_ms = duration_ms,
            "Analysis served"
        );
    }

    /// Log a background task lifecycle event
    pub fn log_task_event(task_id: &str, event: &str, detail: Option<&str>) {
        info!(
            task.id = %task_id,
            task.event = %event,
            task.detail = detail.unwrap_or(""),
            "Background task event"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LoggingConfig::default();
        assert_eq!(config.filter, "info");
        assert!(!config.json);
        assert_eq!(config.service_name, "ascend-analytics");
        assert_eq!(config.environment, "development");
    }

    #[test]
    fn test_lookup_overrides() {
        let config = LoggingConfig::from_lookup(|key| match key {
            "RUST_LOG" => Some("ascend_analytics=debug".to_owned()),
            "LOG_FORMAT" => Some("JSON".to_owned()),
            _ => None,
        });
        assert_eq!(config.filter, "ascend_analytics=debug");
        assert!(config.json);
        assert!(EnvFilter::try_new(&config.filter).is_ok());
    }
}
