// ABOUTME: Intelligence module wiring the statistics engine to the store and result cache
// ABOUTME: Trend, correlation, performance model and prediction accuracy analyzers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ascend Analytics Contributors

//! # Intelligence Module
//!
//! Stateful analyzers built on the pure statistics engine in the
//! `ascend-intelligence` crate. Each analyzer pulls series through a
//! `TimeSeriesStore` and, where results are reusable, goes through the
//! `ResultCache` first.

pub use ascend_intelligence::{
    accuracy, correlation, statistical_analysis, CorrelationDirection, CorrelationResult,
    CorrelationStrength, DescriptiveStats, PairFilter, SignificanceLevel, StatisticalAnalyzer,
    TrendDirection,
};

/// Prediction accuracy log
pub mod accuracy_tracker;
/// Nutrition/performance correlation analysis
pub mod correlation_analyzer;
/// Trend overviews and combined insights
pub mod insights;
/// Training performance model with projections
pub mod performance_model;
/// Weight and macro trend analysis
pub mod trend_analyzer;

pub use accuracy_tracker::AccuracyTracker;
pub use correlation_analyzer::{CorrelationAnalyzer, CorrelationOutcome, DataSufficiency};
pub use performance_model::{PerformanceModel, PerformanceModeler};
pub use trend_analyzer::{TrendAnalyzer, TrendReport};
