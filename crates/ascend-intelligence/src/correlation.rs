// ABOUTME: Pearson correlation with t-statistic significance testing for paired series
// ABOUTME: Classifies significance, strength, and direction into serializable tiers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ascend Analytics Contributors
#![allow(clippy::cast_precision_loss)] // Safe: sample sizes are small

use crate::statistical_analysis::StatisticalAnalyzer;
use ascend_core::constants::analytics::{MIN_PAIRS_FOR_CORRELATION, MIN_PAIRS_FOR_SIGNIFICANCE};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// |r| within this distance of 1 is treated as a perfect correlation
const PERFECT_CORRELATION_EPSILON: f64 = 1e-12;

/// Degrees of freedom below which no p-value tier is assigned
const MIN_DEGREES_OF_FREEDOM: usize = 3;

/// Degrees of freedom up to which the conservative small-sample table applies
const SMALL_SAMPLE_MAX_DF: usize = 10;

/// Two-tailed critical t-values for small samples, strictest tier first
const SMALL_SAMPLE_CRITICAL_VALUES: [(f64, f64); 4] =
    [(4.587, 0.001), (3.169, 0.01), (2.228, 0.05), (1.812, 0.10)];

/// Two-tailed critical t-values for larger samples, strictest tier first
const STANDARD_CRITICAL_VALUES: [(f64, f64); 4] =
    [(3.291, 0.001), (2.576, 0.01), (1.960, 0.05), (1.645, 0.10)];

/// p-value reported when |t| clears no critical value
const NOT_SIGNIFICANT_P_VALUE: f64 = 0.20;

/// Which pairs are dropped before computing a correlation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairFilter {
    /// Drop non-finite values and pairs whose y-value is exactly zero.
    /// A zero performance value means "nothing logged" in the upstream store.
    #[default]
    ZeroYAsMissing,
    /// Drop only non-finite (missing) values
    MissingOnly,
}

impl PairFilter {
    fn keeps(self, x: f64, y: f64) -> bool {
        let present = x.is_finite() && y.is_finite();
        match self {
            Self::ZeroYAsMissing => present && y != 0.0,
            Self::MissingOnly => present,
        }
    }

    /// Pairs surviving the filter, or `None` when lengths differ
    #[must_use]
    pub fn clean(self, xs: &[f64], ys: &[f64]) -> Option<Vec<(f64, f64)>> {
        if xs.len() != ys.len() {
            return None;
        }
        Some(
            xs.iter()
                .zip(ys)
                .filter(|(x, y)| self.keeps(**x, **y))
                .map(|(x, y)| (*x, *y))
                .collect(),
        )
    }
}

/// Statistical confidence that a correlation is not due to chance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignificanceLevel {
    /// Not enough data to test
    None,
    /// p >= 0.05
    Low,
    /// p < 0.05
    Moderate,
    /// p < 0.01
    High,
    /// p < 0.001
    VeryHigh,
}

impl SignificanceLevel {
    /// Create significance level from a p-value
    #[must_use]
    pub fn from_p_value(p_value: f64) -> Self {
        if p_value < 0.001 {
            Self::VeryHigh
        } else if p_value < 0.01 {
            Self::High
        } else if p_value < 0.05 {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    /// Conventional star notation
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::VeryHigh => "***",
            Self::High => "**",
            Self::Moderate => "*",
            Self::Low | Self::None => "",
        }
    }
}

/// Magnitude tier of |r|
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationStrength {
    /// |r| < 0.1
    Negligible,
    /// |r| >= 0.1
    Weak,
    /// |r| >= 0.3
    Moderate,
    /// |r| >= 0.7
    Strong,
}

impl CorrelationStrength {
    /// Classify an absolute coefficient
    #[must_use]
    pub fn from_coefficient(r: f64) -> Self {
        let magnitude = r.abs();
        if magnitude >= 0.7 {
            Self::Strong
        } else if magnitude >= 0.3 {
            Self::Moderate
        } else if magnitude >= 0.1 {
            Self::Weak
        } else {
            Self::Negligible
        }
    }

    /// Stable lowercase name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Negligible => "negligible",
            Self::Weak => "weak",
            Self::Moderate => "moderate",
            Self::Strong => "strong",
        }
    }
}

/// Sign of the coefficient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationDirection {
    /// r == 0
    None,
    /// r > 0
    Positive,
    /// r < 0
    Negative,
}

impl CorrelationDirection {
    /// Classify the sign of a coefficient
    #[must_use]
    pub fn from_coefficient(r: f64) -> Self {
        if r > 0.0 {
            Self::Positive
        } else if r < 0.0 {
            Self::Negative
        } else {
            Self::None
        }
    }

    /// Stable lowercase name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Positive => "positive",
            Self::Negative => "negative",
        }
    }
}

/// Significance-annotated correlation between two series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResult {
    /// Pearson coefficient rounded to 4 decimals, in `[-1, 1]`
    pub correlation: f64,
    /// Approximate two-tailed p-value rounded to 4 decimals, in `[0, 1]`
    pub p_value: f64,
    /// `p_value < 0.05`
    pub significant: bool,
    /// Significance tier
    pub confidence_level: SignificanceLevel,
    /// Star notation for the significance tier
    pub significance_symbol: String,
    /// Magnitude tier
    pub strength: CorrelationStrength,
    /// Sign of the coefficient
    pub direction: CorrelationDirection,
    /// Pairs that survived filtering
    pub sample_size: usize,
    /// `"{strength}_{direction}"`, `"no_correlation"`, or `"insufficient_data"`
    pub interpretation: String,
}

impl CorrelationResult {
    /// Result used when fewer than three valid pairs exist
    #[must_use]
    pub fn insufficient(sample_size: usize) -> Self {
        Self {
            correlation: 0.0,
            p_value: 1.0,
            significant: false,
            confidence_level: SignificanceLevel::None,
            significance_symbol: String::new(),
            strength: CorrelationStrength::Negligible,
            direction: CorrelationDirection::None,
            sample_size,
            interpretation: "insufficient_data".to_owned(),
        }
    }
}

impl StatisticalAnalyzer {
    /// Pearson correlation using the default pair filter
    #[must_use]
    pub fn pearson_correlation(xs: &[f64], ys: &[f64]) -> f64 {
        Self::pearson_correlation_filtered(xs, ys, PairFilter::default())
    }

    /// Pearson correlation after dropping pairs rejected by `filter`
    ///
    /// Returns 0.0 for mismatched lengths, fewer than two valid pairs, or
    /// zero variance in either series. The result is clamped to `[-1, 1]`.
    #[must_use]
    pub fn pearson_correlation_filtered(xs: &[f64], ys: &[f64], filter: PairFilter) -> f64 {
        filter
            .clean(xs, ys)
            .map_or(0.0, |pairs| pearson_of_pairs(&pairs))
    }

    /// Correlation with significance using the default pair filter
    #[must_use]
    pub fn correlation_significance(xs: &[f64], ys: &[f64]) -> CorrelationResult {
        Self::correlation_significance_filtered(xs, ys, PairFilter::default())
    }

    /// Correlation with significance after dropping pairs rejected by `filter`
    #[must_use]
    pub fn correlation_significance_filtered(
        xs: &[f64],
        ys: &[f64],
        filter: PairFilter,
    ) -> CorrelationResult {
        let Some(pairs) = filter.clean(xs, ys) else {
            return CorrelationResult::insufficient(0);
        };
        let n = pairs.len();
        if n < MIN_PAIRS_FOR_SIGNIFICANCE {
            return CorrelationResult::insufficient(n);
        }

        let correlation = pearson_of_pairs(&pairs);
        let p_value = if 1.0 - correlation.abs() <= PERFECT_CORRELATION_EPSILON {
            0.0
        } else {
            let t_stat =
                correlation * ((n - 2) as f64 / correlation.mul_add(-correlation, 1.0)).sqrt();
            p_value_from_t(t_stat.abs(), n - 2)
        };

        let confidence_level = SignificanceLevel::from_p_value(p_value);
        let strength = CorrelationStrength::from_coefficient(correlation);
        let direction = CorrelationDirection::from_coefficient(correlation);
        let interpretation = if correlation == 0.0 {
            "no_correlation".to_owned()
        } else {
            format!("{}_{}", strength.as_str(), direction.as_str())
        };

        CorrelationResult {
            correlation: round4(correlation),
            p_value: round4(p_value),
            significant: p_value < 0.05,
            confidence_level,
            significance_symbol: confidence_level.symbol().to_owned(),
            strength,
            direction,
            sample_size: n,
            interpretation,
        }
    }

    /// Significance-test many labelled series pairs in parallel
    ///
    /// Output order matches input order.
    #[must_use]
    pub fn correlation_batch<L>(pairs: &[(L, Vec<f64>, Vec<f64>)]) -> Vec<(L, CorrelationResult)>
    where
        L: Clone + Send + Sync,
    {
        pairs
            .par_iter()
            .map(|(label, xs, ys)| (label.clone(), Self::correlation_significance(xs, ys)))
            .collect()
    }
}

fn pearson_of_pairs(pairs: &[(f64, f64)]) -> f64 {
    if pairs.len() < MIN_PAIRS_FOR_CORRELATION {
        return 0.0;
    }

    let n = pairs.len() as f64;
    let (sum_x, sum_y, sum_xy, sum_xx, sum_yy) = pairs.iter().fold(
        (0.0, 0.0, 0.0, 0.0, 0.0),
        |(sx, sy, sxy, sxx, syy), (x, y)| {
            (
                sx + x,
                sy + y,
                x.mul_add(*y, sxy),
                x.mul_add(*x, sxx),
                y.mul_add(*y, syy),
            )
        },
    );

    let numerator = n.mul_add(sum_xy, -(sum_x * sum_y));
    let variance_x = n.mul_add(sum_xx, -(sum_x * sum_x));
    let variance_y = n.mul_add(sum_yy, -(sum_y * sum_y));
    let denominator = (variance_x * variance_y).sqrt();

    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }

    (numerator / denominator).clamp(-1.0, 1.0)
}

/// Approximate two-tailed p-value by critical-value lookup
fn p_value_from_t(t_stat: f64, degrees_of_freedom: usize) -> f64 {
    if degrees_of_freedom < MIN_DEGREES_OF_FREEDOM {
        return 1.0;
    }

    let table = if degrees_of_freedom <= SMALL_SAMPLE_MAX_DF {
        &SMALL_SAMPLE_CRITICAL_VALUES
    } else {
        &STANDARD_CRITICAL_VALUES
    };

    table
        .iter()
        .find(|(critical, _)| t_stat >= *critical)
        .map_or(NOT_SIGNIFICANT_P_VALUE, |(_, p)| *p)
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
