// ABOUTME: Raw time-series data model re-exported from ascend-core
// ABOUTME: Daily weight points, macro totals, performance samples and their date-aligned join
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ascend Analytics Contributors

pub use ascend_core::models::{AlignedDataPoint, DataPoint, Macro, MacroSample, PerformanceSample};
