// ABOUTME: Weight and macro trend analysis over a lookback window with cache-first reads
// ABOUTME: Fits least-squares trends per metric and stores reports in the result cache
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ascend Analytics Contributors

use crate::cache::{AnalysisType, ResultCache};
use crate::constants::analytics::{MIN_MACRO_DAYS_FOR_TRENDS, MIN_WEIGHT_POINTS};
use crate::errors::AppResult;
use crate::models::{DataPoint, Macro, MacroSample};
use crate::store::TimeSeriesStore;
use ascend_intelligence::{StatisticalAnalyzer, TrendDirection};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Metric name used for body weight reports
pub const BODY_WEIGHT_METRIC: &str = "body_weight";

/// Trend of one metric over a window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    /// Metric the trend describes (`body_weight`, `calories`, ...)
    pub metric_name: String,
    /// Lookback window in days
    pub time_period: u32,
    /// Increasing, decreasing or stable
    pub trend_direction: TrendDirection,
    /// Least-squares slope in units per day
    pub rate_of_change: f64,
    /// R²-based fit quality scaled by data sufficiency, in `[0, 1]`
    pub confidence_level: f64,
    /// Number of points the trend was fitted on
    pub data_points: usize,
    /// First observation date
    pub start_date: NaiveDate,
    /// Last observation date
    pub end_date: NaiveDate,
}

/// Orchestrates the statistics engine over weight and macro series
#[derive(Clone)]
pub struct TrendAnalyzer {
    store: Arc<dyn TimeSeriesStore>,
    cache: Arc<ResultCache>,
}

impl TrendAnalyzer {
    /// Create an analyzer reading from `store` and caching into `cache`
    #[must_use]
    pub fn new(store: Arc<dyn TimeSeriesStore>, cache: Arc<ResultCache>) -> Self {
        Self { store, cache }
    }

    /// Body weight trend over the last `window_days` days
    ///
    /// Returns `Ok(None)` with fewer than seven weigh-ins. A fresh cached
    /// report is returned without touching the store.
    ///
    /// # Errors
    ///
    /// Propagates store failures
    pub async fn weight_trend(&self, user: &str, window_days: u32) -> AppResult<Option<TrendReport>> {
        if let Some(report) = self
            .cache
            .get_as::<TrendReport>(user, AnalysisType::WeightTrends, window_days)
            .await
        {
            return Ok(Some(report));
        }

        let generation = self.cache.generation(user).await;
        let series = self.store.fetch_weight_series(user, window_days).await?;
        let Some(report) =
            Self::analyze_series(BODY_WEIGHT_METRIC, window_days, &series, MIN_WEIGHT_POINTS)
        else {
            debug!(
                user = %user,
                window_days,
                points = series.len(),
                "Not enough weigh-ins for a weight trend"
            );
            return Ok(None);
        };

        self.cache
            .put_serialized(
                user,
                AnalysisType::WeightTrends,
                window_days,
                &report,
                report.confidence_level,
                generation,
            )
            .await?;

        Ok(Some(report))
    }

    /// Independent trend per macro over the last `window_days` days
    ///
    /// Returns an empty map with fewer than seven logged days. The map is
    /// cached as one entry whose quality is the mean of the per-macro
    /// confidences.
    ///
    /// # Errors
    ///
    /// Propagates store failures
    pub async fn macro_patterns(
        &self,
        user: &str,
        window_days: u32,
    ) -> AppResult<BTreeMap<Macro, TrendReport>> {
        if let Some(patterns) = self
            .cache
            .get_as::<BTreeMap<Macro, TrendReport>>(user, AnalysisType::MacroPatterns, window_days)
            .await
        {
            return Ok(patterns);
        }

        let generation = self.cache.generation(user).await;
        let samples = self.store.fetch_macro_series(user, window_days).await?;
        let patterns = Self::analyze_macros(&samples, window_days);
        if patterns.is_empty() {
            debug!(
                user = %user,
                window_days,
                days = samples.len(),
                "Not enough logged days for macro patterns"
            );
            return Ok(patterns);
        }

        let confidence = mean_confidence(patterns.values());
        self.cache
            .put_serialized(
                user,
                AnalysisType::MacroPatterns,
                window_days,
                &patterns,
                confidence,
                generation,
            )
            .await?;

        Ok(patterns)
    }

    /// One report per macro, or an empty map below the minimum day count
    #[must_use]
    pub fn analyze_macros(samples: &[MacroSample], window_days: u32) -> BTreeMap<Macro, TrendReport> {
        if samples.len() < MIN_MACRO_DAYS_FOR_TRENDS {
            return BTreeMap::new();
        }

        Macro::ALL
            .iter()
            .filter_map(|nutrient| {
                let series = MacroSample::series(samples, *nutrient);
                Self::analyze_series(
                    nutrient.as_str(),
                    window_days,
                    &series,
                    MIN_MACRO_DAYS_FOR_TRENDS,
                )
                .map(|report| (*nutrient, report))
            })
            .collect()
    }

    /// Fit a trend to one series; `None` below `min_points`
    #[must_use]
    pub fn analyze_series(
        metric_name: &str,
        window_days: u32,
        series: &[DataPoint],
        min_points: usize,
    ) -> Option<TrendReport> {
        if series.len() < min_points {
            return None;
        }
        let (first, last) = (series.first()?, series.last()?);

        let slope = StatisticalAnalyzer::linear_slope(series);
        Some(TrendReport {
            metric_name: metric_name.to_owned(),
            time_period: window_days,
            trend_direction: StatisticalAnalyzer::trend_direction(slope),
            rate_of_change: slope,
            confidence_level: StatisticalAnalyzer::trend_confidence(series, slope),
            data_points: series.len(),
            start_date: first.date,
            end_date: last.date,
        })
    }
}

/// Arithmetic mean of report confidences, 0 for none
#[must_use]
pub fn mean_confidence<'a>(reports: impl Iterator<Item = &'a TrendReport>) -> f64 {
    let (sum, count) = reports.fold((0.0, 0_usize), |(sum, count), report| {
        (sum + report.confidence_level, count + 1)
    });
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;

    fn series(values: &[f64]) -> Vec<DataPoint> {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, v)| DataPoint::new(start + Days::new(i as u64), *v))
            .collect()
    }

    #[test]
    fn test_analyze_series_requires_minimum() {
        let short = series(&[70.0, 70.5, 71.0]);
        assert!(TrendAnalyzer::analyze_series("body_weight", 30, &short, 7).is_none());
    }

    #[test]
    fn test_analyze_series_fields() {
        let points = series(&[70.0, 70.5, 71.0, 71.5, 72.0, 72.5, 73.0]);
        let report = TrendAnalyzer::analyze_series("body_weight", 30, &points, 7).unwrap();

        assert_eq!(report.trend_direction, TrendDirection::Increasing);
        assert!((report.rate_of_change - 0.5).abs() < 1e-9);
        assert!(report.confidence_level > 0.4 && report.confidence_level <= 0.6);
        assert_eq!(report.data_points, 7);
        assert_eq!(report.start_date, points[0].date);
        assert_eq!(report.end_date, points[6].date);
    }

    #[test]
    fn test_analyze_macros_reports_every_macro() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let samples: Vec<MacroSample> = (0..10_u32)
            .map(|i| {
                let day = f64::from(i);
                MacroSample::new(
                    start + Days::new(u64::from(i)),
                    2_000.0 + day * 10.0,
                    150.0,
                    250.0 - day * 5.0,
                    70.0,
                )
            })
            .collect();

        let patterns = TrendAnalyzer::analyze_macros(&samples, 30);
        assert_eq!(patterns.len(), 4);
        assert_eq!(patterns[&Macro::Calories].trend_direction, TrendDirection::Increasing);
        assert_eq!(patterns[&Macro::Protein].trend_direction, TrendDirection::Stable);
        assert_eq!(patterns[&Macro::Carbs].trend_direction, TrendDirection::Decreasing);
        assert_eq!(patterns[&Macro::Carbs].metric_name, "carbs");

        assert!(TrendAnalyzer::analyze_macros(&samples[..6], 30).is_empty());
    }
}
