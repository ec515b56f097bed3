// ABOUTME: Statistics engine for trend fitting, correlation testing, and accuracy scoring
// ABOUTME: Pure synchronous functions that are safe to call from any worker without locking
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ascend Analytics Contributors

#![deny(unsafe_code)]

//! # Ascend Intelligence
//!
//! Every function in this crate is total: degenerate input (too few points,
//! mismatched lengths, zero variance) yields a neutral value rather than an
//! error, because those cases are routine at the low-data edge.

/// Prediction accuracy and reliability scoring
pub mod accuracy;
/// Pearson correlation with significance testing
pub mod correlation;
/// Linear regression trends, R² confidence, and descriptive statistics
pub mod statistical_analysis;

pub use correlation::{
    CorrelationDirection, CorrelationResult, CorrelationStrength, PairFilter, SignificanceLevel,
};
pub use statistical_analysis::{DescriptiveStats, StatisticalAnalyzer, TrendDirection};
