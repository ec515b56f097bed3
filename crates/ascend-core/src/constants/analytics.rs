// ABOUTME: Statistical thresholds and minimum-sample gates for trend and correlation analysis
// ABOUTME: Shared by the statistics engine and the analyzers so gates stay consistent
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ascend Analytics Contributors

/// Absolute slope (units/day) at or below which a trend is reported as stable
pub const TREND_STABLE_THRESHOLD: f64 = 0.01;

/// Point count at which the data-sufficiency factor reaches 1.0
pub const FULL_CONFIDENCE_POINTS: f64 = 14.0;

/// Minimum points for any regression slope
pub const MIN_POINTS_FOR_SLOPE: usize = 2;

/// Minimum points for an R²-based confidence score
pub const MIN_POINTS_FOR_CONFIDENCE: usize = 3;

/// Minimum valid pairs for a Pearson coefficient
pub const MIN_PAIRS_FOR_CORRELATION: usize = 2;

/// Minimum valid pairs for a significance test
pub const MIN_PAIRS_FOR_SIGNIFICANCE: usize = 3;

/// Minimum weight entries for a weight trend
pub const MIN_WEIGHT_POINTS: usize = 7;

/// Minimum logged days for macro pattern analysis
pub const MIN_MACRO_DAYS_FOR_TRENDS: usize = 7;

/// Minimum nutrition days for correlation analysis
pub const MIN_MACRO_DAYS_FOR_CORRELATION: usize = 14;

/// Minimum performance days for correlation analysis
pub const MIN_PERFORMANCE_DAYS_FOR_CORRELATION: usize = 14;

/// Minimum date-aligned points for correlation analysis
pub const MIN_ALIGNED_POINTS: usize = 10;

/// Minimum performance points for performance modeling
pub const MIN_PERFORMANCE_POINTS_FOR_MODEL: usize = 7;

/// Aligned points at which correlations contribute fully to data quality
pub const FULL_QUALITY_ALIGNED_POINTS: f64 = 30.0;

/// Weight-trend confidence that must be exceeded before it counts toward data quality
pub const WEIGHT_QUALITY_MIN_CONFIDENCE: f64 = 0.5;

/// Added to the standard deviation when computing trend strength
pub const TREND_STRENGTH_EPSILON: f64 = 0.001;

/// Default trend window in days
pub const DEFAULT_TREND_WINDOW_DAYS: u32 = 30;

/// Default correlation window in days
pub const DEFAULT_CORRELATION_WINDOW_DAYS: u32 = 60;

/// Default performance model window in days
pub const DEFAULT_PERFORMANCE_WINDOW_DAYS: u32 = 30;

/// Standard windows swept by the multi-window trend analysis
pub const MULTI_WINDOW_TREND_DAYS: [u32; 5] = [7, 14, 30, 60, 90];

/// Standard windows swept by the comprehensive correlation analysis
pub const COMPREHENSIVE_CORRELATION_DAYS: [u32; 4] = [30, 60, 90, 180];

/// Projection horizons (days after the last observation) for performance modeling
pub const PERFORMANCE_PROJECTION_DAYS: [i64; 3] = [7, 14, 30];

/// Prediction accuracy: daily groups considered by the trend
pub const ACCURACY_TREND_MAX_DAYS: usize = 30;

/// Prediction accuracy: size of the recent and older comparison halves
pub const ACCURACY_TREND_HALF: usize = 7;

/// Prediction accuracy: groups required in each half
pub const ACCURACY_TREND_MIN_GROUPS: usize = 3;

/// Prediction accuracy: change in mean score that counts as improving/declining
pub const ACCURACY_TREND_DELTA: f64 = 0.05;

/// Prediction count at which reliability reaches full weight
pub const RELIABILITY_FULL_PREDICTIONS: f64 = 20.0;
