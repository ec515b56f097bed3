// ABOUTME: Training performance model over volume and estimated one-rep max with linear projections
// ABOUTME: Combines descriptive statistics, trend fits and forward projections, cached per window
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ascend Analytics Contributors

use super::trend_analyzer::{mean_confidence, TrendAnalyzer, TrendReport};
use crate::cache::{AnalysisType, ResultCache};
use crate::constants::analytics::{MIN_PERFORMANCE_POINTS_FOR_MODEL, PERFORMANCE_PROJECTION_DAYS};
use crate::errors::AppResult;
use crate::models::{DataPoint, PerformanceSample};
use crate::store::TimeSeriesStore;
use ascend_intelligence::{DescriptiveStats, StatisticalAnalyzer};
use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::iter;
use std::sync::Arc;
use tracing::debug;

/// Metric name of the training volume model
pub const VOLUME_METRIC: &str = "total_volume";
/// Metric name of the estimated one-rep-max model
pub const ESTIMATED_1RM_METRIC: &str = "estimated_1rm";

/// Value the fitted line predicts on a future date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    /// Days after the last observation
    pub days_ahead: i64,
    /// Projected calendar date
    pub date: NaiveDate,
    /// Projected value
    pub value: f64,
}

/// Trend, summary statistics and projections of one performance metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricModel {
    /// Fitted trend
    pub trend: TrendReport,
    /// Summary statistics
    pub statistics: DescriptiveStats,
    /// Projections at +7, +14 and +30 days
    pub projections: Vec<Projection>,
}

/// Performance model over a window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceModel {
    /// Lookback window in days
    pub window_days: u32,
    /// Training days in the window
    pub data_points: usize,
    /// Total training volume model
    pub volume: MetricModel,
    /// Estimated one-rep-max model, when enough sessions carried an estimate
    pub estimated_1rm: Option<MetricModel>,
    /// Mean trend confidence of the modeled metrics
    pub confidence_level: f64,
    /// When the model was built
    pub generated_at: DateTime<Utc>,
}

/// Builds and caches performance models
#[derive(Clone)]
pub struct PerformanceModeler {
    store: Arc<dyn TimeSeriesStore>,
    cache: Arc<ResultCache>,
}

impl PerformanceModeler {
    /// Create a modeler reading from `store` and caching into `cache`
    #[must_use]
    pub fn new(store: Arc<dyn TimeSeriesStore>, cache: Arc<ResultCache>) -> Self {
        Self { store, cache }
    }

    /// Performance model over the last `window_days` days
    ///
    /// Returns `Ok(None)` with fewer than seven training days.
    ///
    /// # Errors
    ///
    /// Propagates store failures
    pub async fn model(&self, user: &str, window_days: u32) -> AppResult<Option<PerformanceModel>> {
        if let Some(model) = self
            .cache
            .get_as::<PerformanceModel>(user, AnalysisType::PerformanceModel, window_days)
            .await
        {
            return Ok(Some(model));
        }

        let generation = self.cache.generation(user).await;
        let samples = self
            .store
            .fetch_performance_series(user, window_days)
            .await?;
        let Some(model) = Self::build(&samples, window_days) else {
            debug!(
                user = %user,
                window_days,
                days = samples.len(),
                "Not enough training days for a performance model"
            );
            return Ok(None);
        };

        self.cache
            .put_serialized(
                user,
                AnalysisType::PerformanceModel,
                window_days,
                &model,
                model.confidence_level,
                generation,
            )
            .await?;

        Ok(Some(model))
    }

    /// Build a model from raw samples; `None` below the minimum day count
    #[must_use]
    pub fn build(samples: &[PerformanceSample], window_days: u32) -> Option<PerformanceModel> {
        let volume = Self::metric_model(
            VOLUME_METRIC,
            window_days,
            &PerformanceSample::volume_series(samples),
        )?;
        let estimated_1rm = Self::metric_model(
            ESTIMATED_1RM_METRIC,
            window_days,
            &PerformanceSample::estimated_1rm_series(samples),
        );

        let confidence_level = mean_confidence(
            iter::once(&volume.trend).chain(estimated_1rm.as_ref().map(|m| &m.trend)),
        );

        Some(PerformanceModel {
            window_days,
            data_points: samples.len(),
            volume,
            estimated_1rm,
            confidence_level,
            generated_at: Utc::now(),
        })
    }

    fn metric_model(metric: &str, window_days: u32, series: &[DataPoint]) -> Option<MetricModel> {
        let trend = TrendAnalyzer::analyze_series(
            metric,
            window_days,
            series,
            MIN_PERFORMANCE_POINTS_FOR_MODEL,
        )?;
        let statistics = StatisticalAnalyzer::descriptive_stats(series)?;
        let last_date = series.last()?.date;

        let projections = PERFORMANCE_PROJECTION_DAYS
            .iter()
            .filter_map(|days_ahead| {
                let date = last_date.checked_add_signed(TimeDelta::days(*days_ahead))?;
                let value = StatisticalAnalyzer::project(series, trend.rate_of_change, *days_ahead)?;
                Some(Projection {
                    days_ahead: *days_ahead,
                    date,
                    value,
                })
            })
            .collect();

        Some(MetricModel {
            trend,
            statistics,
            projections,
        })
    }
}
