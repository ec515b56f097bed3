// ABOUTME: Expensive multi-window analyses executed on the background task scheduler
// ABOUTME: Sweeps standard windows for trends and correlations and builds the performance model
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ascend Analytics Contributors

use crate::cache::{AnalysisType, ResultCache};
use crate::constants::analytics::{
    COMPREHENSIVE_CORRELATION_DAYS, FULL_QUALITY_ALIGNED_POINTS, MIN_PERFORMANCE_POINTS_FOR_MODEL,
    MULTI_WINDOW_TREND_DAYS,
};
use crate::errors::{AppError, AppResult};
use crate::intelligence::trend_analyzer::mean_confidence;
use crate::intelligence::{
    CorrelationAnalyzer, CorrelationOutcome, PerformanceModel, PerformanceModeler, TrendAnalyzer,
    TrendReport,
};
use crate::models::Macro;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

/// Analyses too slow for the request path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpensiveAnalysis {
    /// Weight and macro trends for every standard window
    MultiWindowTrends,
    /// Nutrition/performance correlations for every standard window
    ComprehensiveCorrelation,
    /// Volume and 1RM model with projections
    PerformanceModel,
}

impl ExpensiveAnalysis {
    /// Stable name used in task ids and logs
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MultiWindowTrends => "multi_window_trends",
            Self::ComprehensiveCorrelation => "comprehensive_correlation",
            Self::PerformanceModel => "performance_model",
        }
    }

    /// Task id `{kind}:{user}:{days}`
    #[must_use]
    pub fn task_id(self, user: &str, days: u32) -> String {
        format!("{}:{user}:{days}", self.as_str())
    }

    /// Windows swept for a request of `days`: every standard window not
    /// exceeding it, plus `days` itself
    #[must_use]
    pub fn windows(self, days: u32) -> Vec<u32> {
        let standard: &[u32] = match self {
            Self::MultiWindowTrends => &MULTI_WINDOW_TREND_DAYS,
            Self::ComprehensiveCorrelation => &COMPREHENSIVE_CORRELATION_DAYS,
            Self::PerformanceModel => &[],
        };
        standard
            .iter()
            .copied()
            .filter(|window| *window <= days)
            .chain([days])
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl fmt::Display for ExpensiveAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpensiveAnalysis {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "multi_window_trends" => Ok(Self::MultiWindowTrends),
            "comprehensive_correlation" => Ok(Self::ComprehensiveCorrelation),
            "performance_model" => Ok(Self::PerformanceModel),
            other => Err(AppError::invalid_input(format!(
                "Unknown analysis kind: {other}"
            ))),
        }
    }
}

/// Trends computed for one window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowTrends {
    /// Body weight trend
    pub weight: Option<TrendReport>,
    /// Per-macro trends
    pub macros: BTreeMap<Macro, TrendReport>,
}

/// Trends across several windows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiWindowTrendsReport {
    /// Largest window requested
    pub requested_days: u32,
    /// Trends keyed by window length
    pub windows: BTreeMap<u32, WindowTrends>,
    /// When the sweep finished
    pub generated_at: DateTime<Utc>,
}

/// Correlation outcomes across several windows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComprehensiveCorrelationReport {
    /// Largest window requested
    pub requested_days: u32,
    /// Outcome keyed by window length
    pub windows: BTreeMap<u32, CorrelationOutcome>,
    /// When the sweep finished
    pub generated_at: DateTime<Utc>,
}

impl ComprehensiveCorrelationReport {
    /// Mean aligned-point coverage of the computed windows, 0 when none computed
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Safe: aligned point and window counts are small
    pub fn quality(&self) -> f64 {
        let coverage: Vec<f64> = self
            .windows
            .values()
            .filter_map(CorrelationOutcome::computed)
            .map(|computed| {
                (computed.metadata.data_points as f64 / FULL_QUALITY_ALIGNED_POINTS).min(1.0)
            })
            .collect();
        if coverage.is_empty() {
            0.0
        } else {
            coverage.iter().sum::<f64>() / coverage.len() as f64
        }
    }
}

/// Performance model task payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PerformanceModelOutcome {
    /// Model built
    Modeled(Box<PerformanceModel>),
    /// Too few training days
    InsufficientData {
        /// Guidance
        message: String,
        /// Training days needed
        required_data_points: usize,
    },
}

/// Everything an expensive analysis needs, cheap to clone into a task
#[derive(Clone)]
pub struct AnalysisContext {
    trends: TrendAnalyzer,
    correlations: CorrelationAnalyzer,
    performance: PerformanceModeler,
    cache: Arc<ResultCache>,
}

impl AnalysisContext {
    /// Bundle the analyzers a task runs against
    #[must_use]
    pub const fn new(
        trends: TrendAnalyzer,
        correlations: CorrelationAnalyzer,
        performance: PerformanceModeler,
        cache: Arc<ResultCache>,
    ) -> Self {
        Self {
            trends,
            correlations,
            performance,
            cache,
        }
    }

    /// Run `kind` for `user` and return its JSON payload
    ///
    /// # Errors
    ///
    /// Propagates store and serialization failures
    pub async fn run(self, kind: ExpensiveAnalysis, user: String, days: u32) -> AppResult<Value> {
        let payload = match kind {
            ExpensiveAnalysis::MultiWindowTrends => {
                serde_json::to_value(self.multi_window_trends(&user, days).await?)?
            }
            ExpensiveAnalysis::ComprehensiveCorrelation => {
                serde_json::to_value(self.comprehensive_correlation(&user, days).await?)?
            }
            ExpensiveAnalysis::PerformanceModel => {
                serde_json::to_value(self.performance_model(&user, days).await?)?
            }
        };
        info!(
            user = %user,
            analysis_type = %kind,
            window_days = days,
            "Expensive analysis finished"
        );
        Ok(payload)
    }

    /// Weight and macro trends for every window up to `days`, cached per request
    ///
    /// # Errors
    ///
    /// Propagates store failures
    pub async fn multi_window_trends(
        &self,
        user: &str,
        days: u32,
    ) -> AppResult<MultiWindowTrendsReport> {
        if let Some(report) = self
            .cache
            .get_as::<MultiWindowTrendsReport>(user, AnalysisType::MultiWindowTrends, days)
            .await
        {
            return Ok(report);
        }

        let generation = self.cache.generation(user).await;
        let mut windows = BTreeMap::new();
        for window in ExpensiveAnalysis::MultiWindowTrends.windows(days) {
            let weight = self.trends.weight_trend(user, window).await?;
            let macros = self.trends.macro_patterns(user, window).await?;
            windows.insert(window, WindowTrends { weight, macros });
        }

        let report = MultiWindowTrendsReport {
            requested_days: days,
            windows,
            generated_at: Utc::now(),
        };
        let confidence = mean_confidence(
            report
                .windows
                .values()
                .flat_map(|trends| trends.weight.iter().chain(trends.macros.values())),
        );
        self.cache
            .put_serialized(
                user,
                AnalysisType::MultiWindowTrends,
                days,
                &report,
                confidence,
                generation,
            )
            .await?;
        Ok(report)
    }

    /// Correlation outcomes for every window up to `days`, cached per request
    ///
    /// # Errors
    ///
    /// Propagates store failures
    pub async fn comprehensive_correlation(
        &self,
        user: &str,
        days: u32,
    ) -> AppResult<ComprehensiveCorrelationReport> {
        if let Some(report) = self
            .cache
            .get_as::<ComprehensiveCorrelationReport>(
                user,
                AnalysisType::ComprehensiveCorrelation,
                days,
            )
            .await
        {
            return Ok(report);
        }

        let generation = self.cache.generation(user).await;
        let mut windows = BTreeMap::new();
        for window in ExpensiveAnalysis::ComprehensiveCorrelation.windows(days) {
            let outcome = self
                .correlations
                .nutrition_performance_correlations(user, window)
                .await?;
            windows.insert(window, outcome);
        }

        let report = ComprehensiveCorrelationReport {
            requested_days: days,
            windows,
            generated_at: Utc::now(),
        };
        self.cache
            .put_serialized(
                user,
                AnalysisType::ComprehensiveCorrelation,
                days,
                &report,
                report.quality(),
                generation,
            )
            .await?;
        Ok(report)
    }

    /// Performance model over `days`
    ///
    /// # Errors
    ///
    /// Propagates store failures
    pub async fn performance_model(
        &self,
        user: &str,
        days: u32,
    ) -> AppResult<PerformanceModelOutcome> {
        Ok(match self.performance.model(user, days).await? {
            Some(model) => PerformanceModelOutcome::Modeled(Box::new(model)),
            None => PerformanceModelOutcome::InsufficientData {
                message: format!(
                    "Need at least {MIN_PERFORMANCE_POINTS_FOR_MODEL} logged workout days for a performance model"
                ),
                required_data_points: MIN_PERFORMANCE_POINTS_FOR_MODEL,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_id_format() {
        assert_eq!(
            ExpensiveAnalysis::ComprehensiveCorrelation.task_id("a@x.com", 90),
            "comprehensive_correlation:a@x.com:90"
        );
    }

    #[test]
    fn test_windows_include_request() {
        assert_eq!(
            ExpensiveAnalysis::MultiWindowTrends.windows(45),
            vec![7, 14, 30, 45]
        );
        assert_eq!(
            ExpensiveAnalysis::MultiWindowTrends.windows(30),
            vec![7, 14, 30]
        );
        assert_eq!(
            ExpensiveAnalysis::ComprehensiveCorrelation.windows(20),
            vec![20]
        );
        assert_eq!(ExpensiveAnalysis::PerformanceModel.windows(30), vec![30]);
    }

    #[test]
    fn test_kind_parses_back() {
        for kind in [
            ExpensiveAnalysis::MultiWindowTrends,
            ExpensiveAnalysis::ComprehensiveCorrelation,
            ExpensiveAnalysis::PerformanceModel,
        ] {
            assert_eq!(kind.as_str().parse::<ExpensiveAnalysis>().unwrap(), kind);
        }
        assert!("nope".parse::<ExpensiveAnalysis>().is_err());
    }
}
