// ABOUTME: Combined trend overviews and dashboard insights with a data quality score
// ABOUTME: Turns analyzer outputs into either a report or actionable insufficient-data guidance
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ascend Analytics Contributors

use super::correlation_analyzer::CorrelationOutcome;
use super::performance_model::PerformanceModel;
use super::trend_analyzer::{mean_confidence, TrendReport};
use crate::constants::analytics::{
    DEFAULT_CORRELATION_WINDOW_DAYS, DEFAULT_PERFORMANCE_WINDOW_DAYS, DEFAULT_TREND_WINDOW_DAYS,
    FULL_QUALITY_ALIGNED_POINTS, MIN_WEIGHT_POINTS, WEIGHT_QUALITY_MIN_CONFIDENCE,
};
use crate::models::Macro;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Weight trend and macro patterns over one window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendsSnapshot {
    /// Body weight trend, when enough weigh-ins exist
    pub weight_trends: Option<TrendReport>,
    /// Per-macro trends, empty when too few days were logged
    pub macro_trends: BTreeMap<Macro, TrendReport>,
    /// Lookback window in days
    pub analysis_period_days: u32,
    /// When the overview was assembled
    pub generated_at: DateTime<Utc>,
}

/// Guidance returned instead of a trend overview
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendsGuidance {
    /// What is missing
    pub message: String,
    /// Points needed per series
    pub required_data_points: usize,
    /// Next steps for the user
    pub suggestions: Vec<String>,
}

/// Result of a trend overview request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TrendsOverview {
    /// At least one trend was computed
    Available(TrendsSnapshot),
    /// Neither weight nor macro trends could be computed
    InsufficientData(TrendsGuidance),
}

impl TrendsOverview {
    /// Combine weight and macro results for a `days` window
    #[must_use]
    pub fn from_parts(
        weight_trends: Option<TrendReport>,
        macro_trends: BTreeMap<Macro, TrendReport>,
        days: u32,
    ) -> Self {
        if weight_trends.is_none() && macro_trends.is_empty() {
            return Self::InsufficientData(Self::guidance(days));
        }

        Self::Available(TrendsSnapshot {
            weight_trends,
            macro_trends,
            analysis_period_days: days,
            generated_at: Utc::now(),
        })
    }

    fn guidance(days: u32) -> TrendsGuidance {
        let remaining = usize::try_from(days)
            .ok()
            .and_then(|days| MIN_WEIGHT_POINTS.checked_sub(days))
            .filter(|remaining| *remaining > 0)
            .map_or_else(|| "a few more".to_owned(), |remaining| remaining.to_string());

        TrendsGuidance {
            message: format!(
                "Need at least {MIN_WEIGHT_POINTS} days of data for trend analysis. Please log more weight and nutrition data."
            ),
            required_data_points: MIN_WEIGHT_POINTS,
            suggestions: vec![
                "Continue logging weight daily".to_owned(),
                "Log your meals and nutrition intake".to_owned(),
                format!("Come back after logging data for {remaining} days"),
            ],
        }
    }
}

/// Which analyses produced data, and how good that data is
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InsightsSummary {
    /// A weight trend was computed
    pub has_weight_trends: bool,
    /// At least one macro trend was computed
    pub has_macro_trends: bool,
    /// Correlations passed the minimum-data gates
    pub has_correlations: bool,
    /// A performance model was built
    pub has_performance_model: bool,
    /// Weighted data quality in `[0, 1]`, 2 decimals
    pub data_quality_score: f64,
}

/// Trend section of the insights report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightTrends {
    /// Body weight trend
    pub weight: Option<TrendReport>,
    /// Per-macro trends
    pub macros: BTreeMap<Macro, TrendReport>,
}

/// Windows the insights were computed over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisPeriod {
    /// Trend window
    pub trends_days: u32,
    /// Correlation window
    pub correlations_days: u32,
    /// Performance model window
    pub performance_days: u32,
}

impl Default for AnalysisPeriod {
    fn default() -> Self {
        Self {
            trends_days: DEFAULT_TREND_WINDOW_DAYS,
            correlations_days: DEFAULT_CORRELATION_WINDOW_DAYS,
            performance_days: DEFAULT_PERFORMANCE_WINDOW_DAYS,
        }
    }
}

/// Dashboard report combining every analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightsReport {
    /// Availability flags and quality score
    pub summary: InsightsSummary,
    /// Weight and macro trends
    pub trends: InsightTrends,
    /// Correlation outcome, including insufficient-data details
    pub correlations: CorrelationOutcome,
    /// Performance model, when enough training days exist
    pub performance: Option<PerformanceModel>,
    /// When the report was assembled
    pub generated_at: DateTime<Utc>,
    /// Windows used
    pub analysis_period: AnalysisPeriod,
}

/// Thresholds each analysis needs, in words
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightRequirements {
    /// Trend requirement
    pub for_trends: String,
    /// Correlation requirement
    pub for_correlations: String,
    /// Performance model requirement
    pub for_performance: String,
}

/// Guidance returned instead of an insights report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightsGuidance {
    /// What is missing
    pub message: String,
    /// Requirement per analysis
    pub requirements: InsightRequirements,
    /// Next steps for the user
    pub suggestions: Vec<String>,
}

/// Result of an insights request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Insights {
    /// At least one analysis produced data
    Available(Box<InsightsReport>),
    /// Nothing could be computed
    InsufficientData(InsightsGuidance),
}

impl Insights {
    /// Combine analyzer outputs into a report or guidance
    #[must_use]
    pub fn from_parts(
        weight: Option<TrendReport>,
        macros: BTreeMap<Macro, TrendReport>,
        correlations: CorrelationOutcome,
        performance: Option<PerformanceModel>,
    ) -> Self {
        let has_correlations = correlations.computed().is_some();
        if weight.is_none() && macros.is_empty() && !has_correlations && performance.is_none() {
            return Self::InsufficientData(Self::guidance());
        }

        let summary = InsightsSummary {
            has_weight_trends: weight.is_some(),
            has_macro_trends: !macros.is_empty(),
            has_correlations,
            has_performance_model: performance.is_some(),
            data_quality_score: data_quality_score(
                weight.as_ref(),
                &macros,
                &correlations,
                performance.as_ref(),
            ),
        };

        Self::Available(Box::new(InsightsReport {
            summary,
            trends: InsightTrends { weight, macros },
            correlations,
            performance,
            generated_at: Utc::now(),
            analysis_period: AnalysisPeriod::default(),
        }))
    }

    fn guidance() -> InsightsGuidance {
        InsightsGuidance {
            message: "Need more data to generate meaningful insights".to_owned(),
            requirements: InsightRequirements {
                for_trends: "At least 7 days of weight and nutrition data".to_owned(),
                for_correlations: "At least 14 days of nutrition and workout data".to_owned(),
                for_performance: "At least 7 logged workout days".to_owned(),
            },
            suggestions: [
                "Start by logging your daily weight",
                "Track your meals and nutrition intake",
                "Record your workout sessions",
                "Be consistent with data logging for best results",
                "Check back after 1-2 weeks of consistent logging",
            ]
            .into_iter()
            .map(str::to_owned)
            .collect(),
        }
    }
}

/// Data quality in `[0, 1]`, each analysis contributing a quarter
///
/// The weight trend only counts once its confidence exceeds 0.5, and
/// correlations count by aligned points up to 30.
#[must_use]
pub fn data_quality_score(
    weight: Option<&TrendReport>,
    macros: &BTreeMap<Macro, TrendReport>,
    correlations: &CorrelationOutcome,
    performance: Option<&PerformanceModel>,
) -> f64 {
    let weight_component = weight
        .map(|report| report.confidence_level)
        .filter(|confidence| *confidence > WEIGHT_QUALITY_MIN_CONFIDENCE)
        .unwrap_or(0.0);

    let macro_component = mean_confidence(macros.values());

    #[allow(clippy::cast_precision_loss)] // Safe: aligned point counts are small
    let correlation_component = correlations.computed().map_or(0.0, |computed| {
        (computed.metadata.data_points as f64 / FULL_QUALITY_ALIGNED_POINTS).min(1.0)
    });

    let performance_component = performance.map_or(0.0, |model| model.confidence_level);

    let score =
        0.25 * (weight_component + macro_component + correlation_component + performance_component);
    (score * 100.0).round() / 100.0
}
