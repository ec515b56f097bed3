// ABOUTME: Time-series store contract supplying ordered daily series to the analyzers
// ABOUTME: Abstracts the persistence layer behind async fetches of weight, macro and performance data
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ascend Analytics Contributors

//! # Time-Series Store
//!
//! The analytics core never reads raw records directly. It pulls ordered
//! daily series for a lookback window through [`TimeSeriesStore`], which the
//! persistence layer implements. A fetch that fails is an `Err` with
//! `ErrorCode::StoreUnavailable`; an empty history is an empty `Vec`.

/// In-memory store for tests, demos and single-process deployments
pub mod memory;
/// Deterministic synthetic history generator
pub mod synthetic;

pub use memory::InMemoryTimeSeriesStore;

use crate::errors::AppResult;
use crate::models::{DataPoint, MacroSample, PerformanceSample};
use async_trait::async_trait;

/// Source of ordered daily series for a user
///
/// Every series is sorted by date ascending with at most one record per
/// date. A window of `n` days covers records dated on or after
/// `today - n days`.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; analyzers and background tasks
/// share one store.
#[async_trait]
pub trait TimeSeriesStore: Send + Sync {
    /// Daily body weight
    async fn fetch_weight_series(&self, user: &str, window_days: u32)
        -> AppResult<Vec<DataPoint>>;

    /// Daily macro totals, aggregated across meals
    async fn fetch_macro_series(&self, user: &str, window_days: u32)
        -> AppResult<Vec<MacroSample>>;

    /// Daily training volume and optional estimated one-rep max
    async fn fetch_performance_series(
        &self,
        user: &str,
        window_days: u32,
    ) -> AppResult<Vec<PerformanceSample>>;
}
