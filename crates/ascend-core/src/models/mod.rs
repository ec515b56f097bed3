// ABOUTME: Raw time-series models supplied by the persistence layer
// ABOUTME: Weight points, daily macro totals, and training performance samples
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ascend Analytics Contributors

//! Raw data model
//!
//! Every series is ordered by date ascending with at most one record per
//! calendar date. The persistence layer is responsible for aggregation
//! (for example summing every meal of a day into one [`MacroSample`]).

mod series;

pub use series::{AlignedDataPoint, DataPoint, Macro, MacroSample, PerformanceSample};
