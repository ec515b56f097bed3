// ABOUTME: Main library entry point for the Ascend training analytics engine
// ABOUTME: Trend, correlation, and confidence statistics over longitudinal fitness data with caching
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ascend Analytics Contributors

#![deny(unsafe_code)]

//! # Ascend Analytics
//!
//! Computes trend, correlation, and confidence statistics over a user's
//! longitudinal fitness data (body weight, macro-nutrient intake, workout
//! performance) and caches the results.
//!
//! ## Architecture
//!
//! - **Store**: the `TimeSeriesStore` contract supplying ordered daily series,
//!   with an in-memory adapter
//! - **Intelligence**: `TrendAnalyzer`, `CorrelationAnalyzer`, performance
//!   modeling and prediction accuracy tracking on top of the pure statistics
//!   engine in `ascend-intelligence`
//! - **Cache**: `ResultCache` keyed by (user, analysis type, window) with TTL
//!   expiry and invalidation on raw data writes
//! - **Tasks**: `TaskScheduler`, a bounded worker pool with per-id admission
//!   control for expensive analyses
//! - **Maintenance**: periodic sweeps purging expired cache rows and finished
//!   task handles
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use ascend_analytics::config::environment::AnalyticsConfig;
//! use ascend_analytics::service::AnalyticsService;
//! use ascend_analytics::store::memory::InMemoryTimeSeriesStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), ascend_analytics::errors::AppError> {
//! let config = AnalyticsConfig::from_env()?;
//! let store = Arc::new(InMemoryTimeSeriesStore::new());
//! let service = AnalyticsService::new(store, &config);
//!
//! if let Some(report) = service.weight_trend("lifter@example.com", 30).await? {
//!     println!("{} {:?}", report.trend_direction, report.rate_of_change);
//! }
//! # Ok(())
//! # }
//! ```

/// Result cache for computed analyses
pub mod cache;

/// Environment-driven configuration
pub mod config;

/// Analysis thresholds, cache and task defaults
pub mod constants;

/// Unified error handling
pub mod errors;

/// Trend, correlation, performance and accuracy analyzers
pub mod intelligence;

/// Structured logging setup
pub mod logging;

/// Periodic background sweeps
pub mod maintenance;

/// Raw time-series data model
pub mod models;

/// High-level facade wiring store, cache, analyzers and scheduler together
pub mod service;

/// Time-series store contract and adapters
pub mod store;

/// Bounded worker pool for long-running analyses
pub mod tasks;
