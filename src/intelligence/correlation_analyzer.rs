// ABOUTME: Nutrition/performance correlation analysis with date alignment and minimum-data gates
// ABOUTME: Produces significance-annotated correlation maps or a structured insufficient-data verdict
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ascend Analytics Contributors

use crate::constants::analytics::{
    MIN_ALIGNED_POINTS, MIN_MACRO_DAYS_FOR_CORRELATION, MIN_PERFORMANCE_DAYS_FOR_CORRELATION,
};
use crate::errors::AppResult;
use crate::models::{AlignedDataPoint, Macro, MacroSample, PerformanceSample};
use crate::store::TimeSeriesStore;
use ascend_intelligence::{CorrelationResult, StatisticalAnalyzer};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Current counts against the thresholds correlation analysis needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SufficiencyRequirements {
    /// Days of nutrition data required
    pub minimum_macro_days: usize,
    /// Days of performance data required
    pub minimum_performance_days: usize,
    /// Days with both kinds of data required
    pub minimum_aligned_points: usize,
    /// Days of nutrition data available
    pub current_macro_days: usize,
    /// Days of performance data available
    pub current_performance_days: usize,
    /// Days with both kinds of data available
    pub current_aligned_points: usize,
}

/// Verdict on whether a correlation analysis can run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSufficiency {
    /// Every threshold is met
    pub valid: bool,
    /// Guidance naming the first unmet threshold
    pub message: String,
    /// Counts versus thresholds
    pub requirements: SufficiencyRequirements,
}

impl DataSufficiency {
    /// Check counts against the thresholds, in order macro, performance, aligned
    #[must_use]
    pub fn evaluate(macro_days: usize, performance_days: usize, aligned_points: usize) -> Self {
        let requirements = SufficiencyRequirements {
            minimum_macro_days: MIN_MACRO_DAYS_FOR_CORRELATION,
            minimum_performance_days: MIN_PERFORMANCE_DAYS_FOR_CORRELATION,
            minimum_aligned_points: MIN_ALIGNED_POINTS,
            current_macro_days: macro_days,
            current_performance_days: performance_days,
            current_aligned_points: aligned_points,
        };

        let failure = if macro_days < MIN_MACRO_DAYS_FOR_CORRELATION {
            Some(format!(
                "Need at least {MIN_MACRO_DAYS_FOR_CORRELATION} days of nutrition data for correlation analysis"
            ))
        } else if performance_days < MIN_PERFORMANCE_DAYS_FOR_CORRELATION {
            Some(format!(
                "Need at least {MIN_PERFORMANCE_DAYS_FOR_CORRELATION} days of workout performance data for correlation analysis"
            ))
        } else if aligned_points < MIN_ALIGNED_POINTS {
            Some(format!(
                "Need at least {MIN_ALIGNED_POINTS} days with both nutrition and performance data for correlation analysis"
            ))
        } else {
            None
        };

        match failure {
            Some(message) => Self {
                valid: false,
                message,
                requirements,
            },
            None => Self {
                valid: true,
                message: "Sufficient data for correlation analysis".to_owned(),
                requirements,
            },
        }
    }
}

/// Context of a computed correlation map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMetadata {
    /// Aligned days the correlations were computed on
    pub data_points: usize,
    /// Lookback window in days
    pub analysis_period_days: u32,
    /// Days of nutrition data in the window
    pub macro_data_points: usize,
    /// Days of performance data in the window
    pub performance_data_points: usize,
    /// When the analysis ran
    pub analysis_date: DateTime<Utc>,
}

/// Correlations keyed `{macro}_vs_volume` / `{macro}_vs_1rm`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionPerformanceCorrelations {
    /// One result per macro/performance pair
    pub correlations: BTreeMap<String, CorrelationResult>,
    /// Analysis context
    pub metadata: CorrelationMetadata,
}

/// Result of a correlation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CorrelationOutcome {
    /// Thresholds met, correlations computed
    Computed(NutritionPerformanceCorrelations),
    /// A threshold was not met
    InsufficientData(DataSufficiency),
}

impl CorrelationOutcome {
    /// The computed correlations, if any
    #[must_use]
    pub const fn computed(&self) -> Option<&NutritionPerformanceCorrelations> {
        match self {
            Self::Computed(correlations) => Some(correlations),
            Self::InsufficientData(_) => None,
        }
    }
}

/// Aligns nutrition with performance and correlates every macro against it
#[derive(Clone)]
pub struct CorrelationAnalyzer {
    store: Arc<dyn TimeSeriesStore>,
}

impl CorrelationAnalyzer {
    /// Create an analyzer reading from `store`
    #[must_use]
    pub fn new(store: Arc<dyn TimeSeriesStore>) -> Self {
        Self { store }
    }

    /// Check the minimum-data thresholds for `user` over `window_days`
    ///
    /// # Errors
    ///
    /// Propagates store failures
    pub async fn validate_data_sufficiency(
        &self,
        user: &str,
        window_days: u32,
    ) -> AppResult<DataSufficiency> {
        let (macros, performance) = self.fetch_series(user, window_days).await?;
        let aligned = Self::align_by_date(&macros, &performance);
        Ok(DataSufficiency::evaluate(
            macros.len(),
            performance.len(),
            aligned.len(),
        ))
    }

    /// Correlate every macro with training volume, and with estimated 1RM
    /// when any aligned day carries one
    ///
    /// # Errors
    ///
    /// Propagates store failures; missing data is an `InsufficientData` outcome
    pub async fn nutrition_performance_correlations(
        &self,
        user: &str,
        window_days: u32,
    ) -> AppResult<CorrelationOutcome> {
        let (macros, performance) = self.fetch_series(user, window_days).await?;
        let aligned = Self::align_by_date(&macros, &performance);

        let sufficiency = DataSufficiency::evaluate(macros.len(), performance.len(), aligned.len());
        if !sufficiency.valid {
            debug!(
                user = %user,
                window_days,
                reason = %sufficiency.message,
                "Correlation analysis skipped"
            );
            return Ok(CorrelationOutcome::InsufficientData(sufficiency));
        }

        Ok(CorrelationOutcome::Computed(Self::correlate_aligned(
            &aligned,
            window_days,
            macros.len(),
            performance.len(),
        )))
    }

    /// Inner join on exact date; output ascending by date
    #[must_use]
    pub fn align_by_date(
        macros: &[MacroSample],
        performance: &[PerformanceSample],
    ) -> Vec<AlignedDataPoint> {
        let by_date: BTreeMap<NaiveDate, &PerformanceSample> =
            performance.iter().map(|sample| (sample.date, sample)).collect();

        let mut aligned: Vec<AlignedDataPoint> = macros
            .iter()
            .filter_map(|nutrition| {
                by_date
                    .get(&nutrition.date)
                    .map(|workout| AlignedDataPoint::merge(nutrition, workout))
            })
            .collect();
        aligned.sort_by_key(|point| point.date);
        aligned
    }

    /// Correlation map over already aligned rows
    #[must_use]
    pub fn correlate_aligned(
        aligned: &[AlignedDataPoint],
        window_days: u32,
        macro_data_points: usize,
        performance_data_points: usize,
    ) -> NutritionPerformanceCorrelations {
        let volume: Vec<f64> = aligned.iter().map(|point| point.total_volume).collect();
        let include_1rm = aligned.iter().any(AlignedDataPoint::has_estimated_1rm);
        let one_rep_max: Vec<f64> = aligned
            .iter()
            .map(|point| point.estimated_1rm.unwrap_or(0.0))
            .collect();

        let mut pairs = Vec::with_capacity(Macro::ALL.len() * 2);
        for nutrient in Macro::ALL {
            let intake: Vec<f64> = aligned
                .iter()
                .map(|point| point.macro_value(nutrient))
                .collect();
            if include_1rm {
                pairs.push((
                    format!("{nutrient}_vs_1rm"),
                    intake.clone(),
                    one_rep_max.clone(),
                ));
            }
            pairs.push((format!("{nutrient}_vs_volume"), intake, volume.clone()));
        }

        NutritionPerformanceCorrelations {
            correlations: StatisticalAnalyzer::correlation_batch(&pairs)
                .into_iter()
                .collect(),
            metadata: CorrelationMetadata {
                data_points: aligned.len(),
                analysis_period_days: window_days,
                macro_data_points,
                performance_data_points,
                analysis_date: Utc::now(),
            },
        }
    }

    async fn fetch_series(
        &self,
        user: &str,
        window_days: u32,
    ) -> AppResult<(Vec<MacroSample>, Vec<PerformanceSample>)> {
        let macros = self.store.fetch_macro_series(user, window_days).await?;
        let performance = self
            .store
            .fetch_performance_series(user, window_days)
            .await?;
        Ok((macros, performance))
    }
}
