// ABOUTME: Linear regression trend engine for dated fitness series
// ABOUTME: Implements least-squares slope, R²-based confidence, and descriptive statistics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ascend Analytics Contributors
#![allow(clippy::cast_precision_loss)] // Safe: point counts and day offsets are far below 2^52

use ascend_core::constants::analytics::{
    FULL_CONFIDENCE_POINTS, MIN_POINTS_FOR_CONFIDENCE, MIN_POINTS_FOR_SLOPE,
    TREND_STABLE_THRESHOLD, TREND_STRENGTH_EPSILON,
};
use ascend_core::models::DataPoint;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a fitted trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    /// Slope above the stability threshold
    Increasing,
    /// Slope below the negative stability threshold
    Decreasing,
    /// Slope within the stability threshold
    Stable,
}

impl TrendDirection {
    /// Stable lowercase name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Increasing => "increasing",
            Self::Decreasing => "decreasing",
            Self::Stable => "stable",
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary statistics for a single series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveStats {
    /// Number of points summarized
    pub count: usize,
    /// Arithmetic mean
    pub mean: f64,
    /// Median value
    pub median: f64,
    /// Sample standard deviation (0 with fewer than 2 points)
    pub std_dev: f64,
    /// Population standard deviation (0 with fewer than 2 points)
    pub population_std_dev: f64,
    /// Smallest value
    pub min: f64,
    /// Largest value
    pub max: f64,
    /// `max - min`
    pub range: f64,
    /// `std_dev / |mean|`, 0 when the mean is 0
    pub coefficient_of_variation: f64,
    /// Least-squares slope per day
    pub slope: f64,
    /// `|slope| / (std_dev + 0.001)`
    pub trend_strength: f64,
}

/// Stateless trend statistics over dated series
pub struct StatisticalAnalyzer;

impl StatisticalAnalyzer {
    /// Ordinary least-squares slope of value against days since the first point
    ///
    /// Returns 0.0 with fewer than two points or when every point shares the
    /// same day offset.
    #[must_use]
    pub fn linear_slope(points: &[DataPoint]) -> f64 {
        if points.len() < MIN_POINTS_FOR_SLOPE {
            return 0.0;
        }

        let n = points.len() as f64;
        let (sum_x, sum_y, sum_xy, sum_xx) = day_offsets(points).zip(points).fold(
            (0.0, 0.0, 0.0, 0.0),
            |(sx, sy, sxy, sxx), (x, point)| {
                (
                    sx + x,
                    sy + point.value,
                    x.mul_add(point.value, sxy),
                    x.mul_add(x, sxx),
                )
            },
        );

        let denominator = n.mul_add(sum_xx, -(sum_x * sum_x));
        if denominator.abs() < f64::EPSILON {
            return 0.0;
        }

        n.mul_add(sum_xy, -(sum_x * sum_y)) / denominator
    }

    /// Classify a slope using the default stability threshold
    #[must_use]
    pub fn trend_direction(slope: f64) -> TrendDirection {
        Self::trend_direction_with_threshold(slope, TREND_STABLE_THRESHOLD)
    }

    /// Classify a slope: stable when `|slope| <= threshold`
    #[must_use]
    pub fn trend_direction_with_threshold(slope: f64, threshold: f64) -> TrendDirection {
        if slope.abs() <= threshold {
            TrendDirection::Stable
        } else if slope > 0.0 {
            TrendDirection::Increasing
        } else {
            TrendDirection::Decreasing
        }
    }

    /// R² of the line anchored at the first value with the given slope,
    /// scaled by `min(1, n / 14)` and clamped to `[0, 1]`
    ///
    /// Returns 0.0 with fewer than three points.
    #[must_use]
    pub fn trend_confidence(points: &[DataPoint], slope: f64) -> f64 {
        if points.len() < MIN_POINTS_FOR_CONFIDENCE {
            return 0.0;
        }

        let n = points.len() as f64;
        let intercept = points[0].value;
        let mean_y = points.iter().map(|p| p.value).sum::<f64>() / n;

        let (ss_res, ss_tot) =
            day_offsets(points)
                .zip(points)
                .fold((0.0, 0.0), |(res, tot), (x, point)| {
                    let residual = point.value - slope.mul_add(x, intercept);
                    let deviation = point.value - mean_y;
                    (
                        residual.mul_add(residual, res),
                        deviation.mul_add(deviation, tot),
                    )
                });

        if ss_tot.abs() < f64::EPSILON {
            // Constant series: only a flat prediction is a perfect fit
            return if ss_res.abs() < f64::EPSILON { 1.0 } else { 0.0 };
        }

        let r_squared = (1.0 - ss_res / ss_tot).max(0.0);
        let sufficiency = (n / FULL_CONFIDENCE_POINTS).min(1.0);

        (r_squared * sufficiency).clamp(0.0, 1.0)
    }

    /// Mean, median, spread, and trend summary of a series
    ///
    /// Returns `None` for an empty series.
    #[must_use]
    pub fn descriptive_stats(points: &[DataPoint]) -> Option<DescriptiveStats> {
        if points.is_empty() {
            return None;
        }

        let values: Vec<f64> = points.iter().map(|p| p.value).collect();
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let (std_dev, population_std_dev) = if values.len() < 2 {
            (0.0, 0.0)
        } else {
            let squared: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            ((squared / (n - 1.0)).sqrt(), (squared / n).sqrt())
        };

        let coefficient_of_variation = if mean == 0.0 {
            0.0
        } else {
            std_dev / mean.abs()
        };

        let slope = Self::linear_slope(points);

        Some(DescriptiveStats {
            count: values.len(),
            mean,
            median: median(&values),
            std_dev,
            population_std_dev,
            min,
            max,
            range: max - min,
            coefficient_of_variation,
            slope,
            trend_strength: slope.abs() / (std_dev + TREND_STRENGTH_EPSILON),
        })
    }

    /// Value the fitted line predicts `days_ahead` days after the last point
    ///
    /// The line passes through the series mean at the mean day offset, so the
    /// projection is stable against noise in the final observation.
    #[must_use]
    pub fn project(points: &[DataPoint], slope: f64, days_ahead: i64) -> Option<f64> {
        let first = points.first()?;
        let last = points.last()?;
        let n = points.len() as f64;
        let mean_x = day_offsets(points).sum::<f64>() / n;
        let mean_y = points.iter().map(|p| p.value).sum::<f64>() / n;
        let target_x = ((last.date - first.date).num_days() + days_ahead) as f64;

        Some(slope.mul_add(target_x - mean_x, mean_y))
    }
}

/// Day offsets from the first point's date (first point is offset 0)
fn day_offsets(points: &[DataPoint]) -> impl Iterator<Item = f64> + '_ {
    let origin = points.first().map(|p| p.date);
    points.iter().map(move |p| {
        origin.map_or(0.0, |first| (p.date - first).num_days() as f64)
    })
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let len = sorted.len();
    if len % 2 == 0 {
        f64::midpoint(sorted[len / 2 - 1], sorted[len / 2])
    } else {
        sorted[len / 2]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn series(values: &[f64]) -> Vec<DataPoint> {
        let start = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, v)| DataPoint::new(start + Duration::days(i as i64), *v))
            .collect()
    }

    #[test]
    fn test_slope_of_half_unit_steps() {
        let points = series(&[70.0, 70.5, 71.0, 71.5, 72.0, 72.5, 73.0]);
        let slope = StatisticalAnalyzer::linear_slope(&points);
        assert!((slope - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_slope_flat_and_short_series() {
        assert_eq!(StatisticalAnalyzer::linear_slope(&series(&[80.0; 6])), 0.0);
        assert_eq!(StatisticalAnalyzer::linear_slope(&series(&[80.0])), 0.0);
        assert_eq!(StatisticalAnalyzer::linear_slope(&[]), 0.0);
    }

    #[test]
    fn test_slope_duplicate_dates() {
        let date = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        let points = vec![DataPoint::new(date, 70.0), DataPoint::new(date, 75.0)];
        assert_eq!(StatisticalAnalyzer::linear_slope(&points), 0.0);
    }

    #[test]
    fn test_slope_uses_calendar_gaps() {
        let start = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        let points = vec![
            DataPoint::new(start, 100.0),
            DataPoint::new(start + Duration::days(2), 101.0),
            DataPoint::new(start + Duration::days(4), 102.0),
        ];
        assert!((StatisticalAnalyzer::linear_slope(&points) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_trend_direction_threshold() {
        assert_eq!(StatisticalAnalyzer::trend_direction(0.01), TrendDirection::Stable);
        assert_eq!(StatisticalAnalyzer::trend_direction(-0.005), TrendDirection::Stable);
        assert_eq!(StatisticalAnalyzer::trend_direction(0.2), TrendDirection::Increasing);
        assert_eq!(StatisticalAnalyzer::trend_direction(-0.2), TrendDirection::Decreasing);
        assert_eq!(
            StatisticalAnalyzer::trend_direction_with_threshold(0.2, 0.5),
            TrendDirection::Stable
        );
    }

    #[test]
    fn test_confidence_perfect_line_scaled_by_sufficiency() {
        let points = series(&[70.0, 70.5, 71.0, 71.5, 72.0, 72.5, 73.0]);
        let slope = StatisticalAnalyzer::linear_slope(&points);
        let confidence = StatisticalAnalyzer::trend_confidence(&points, slope);
        assert!(confidence > 0.4 && confidence <= 0.6, "got {confidence}");

        let long: Vec<f64> = (0..20).map(|i| 60.0 + f64::from(i)).collect();
        let long_points = series(&long);
        let long_slope = StatisticalAnalyzer::linear_slope(&long_points);
        let long_confidence = StatisticalAnalyzer::trend_confidence(&long_points, long_slope);
        assert!((long_confidence - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_noisy_series() {
        let points = series(&[70.0, 74.0, 70.0, 74.0, 70.0, 74.0, 70.0, 74.0]);
        let slope = StatisticalAnalyzer::linear_slope(&points);
        assert!(StatisticalAnalyzer::trend_confidence(&points, slope) < 0.5);
    }

    #[test]
    fn test_confidence_edges() {
        let short = series(&[70.0, 71.0]);
        assert_eq!(StatisticalAnalyzer::trend_confidence(&short, 1.0), 0.0);

        let constant = series(&[75.0; 14]);
        assert_eq!(StatisticalAnalyzer::trend_confidence(&constant, 0.0), 1.0);
        assert_eq!(StatisticalAnalyzer::trend_confidence(&constant, 0.3), 0.0);
    }

    #[test]
    fn test_descriptive_stats() {
        let stats = StatisticalAnalyzer::descriptive_stats(&series(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]))
            .unwrap();
        assert_eq!(stats.count, 8);
        assert!((stats.mean - 5.0).abs() < 1e-12);
        assert!((stats.median - 4.5).abs() < 1e-12);
        assert!((stats.population_std_dev - 2.0).abs() < 1e-12);
        assert!((stats.std_dev - 2.138_089_935).abs() < 1e-6);
        assert!((stats.range - 7.0).abs() < 1e-12);
        assert!((stats.coefficient_of_variation - stats.std_dev / 5.0).abs() < 1e-12);
        assert!(stats.trend_strength > 0.0);
    }

    #[test]
    fn test_descriptive_stats_degenerate() {
        assert!(StatisticalAnalyzer::descriptive_stats(&[]).is_none());

        let single = StatisticalAnalyzer::descriptive_stats(&series(&[0.0])).unwrap();
        assert_eq!(single.std_dev, 0.0);
        assert_eq!(single.coefficient_of_variation, 0.0);
        assert_eq!(single.slope, 0.0);
    }

    #[test]
    fn test_projection_follows_line() {
        let points = series(&[10.0, 12.0, 14.0, 16.0]);
        let slope = StatisticalAnalyzer::linear_slope(&points);
        let projected = StatisticalAnalyzer::project(&points, slope, 7).unwrap();
        assert!((projected - 30.0).abs() < 1e-9);
        assert!(StatisticalAnalyzer::project(&[], slope, 7).is_none());
    }
}
