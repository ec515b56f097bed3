// ABOUTME: Prediction accuracy scoring and reliability weighting
// ABOUTME: Normalized absolute error scores and recent-vs-older accuracy trend classification
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ascend Analytics Contributors
#![allow(clippy::cast_precision_loss)] // Safe: prediction counts are small

use ascend_core::constants::analytics::{
    ACCURACY_TREND_DELTA, ACCURACY_TREND_MIN_GROUPS, RELIABILITY_FULL_PREDICTIONS,
};
use serde::{Deserialize, Serialize};

/// Direction of prediction accuracy over time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccuracyTrendDirection {
    /// Recent accuracy exceeds older accuracy by more than the delta
    Improving,
    /// Recent accuracy trails older accuracy by more than the delta
    Declining,
    /// Within the delta
    Stable,
    /// Not enough daily groups in either half
    InsufficientData,
}

/// `1 - |predicted - actual| / max(|actual|, 1)`, floored at 0
#[must_use]
pub fn accuracy_score(predicted: f64, actual: f64) -> f64 {
    let scale = actual.abs().max(1.0);
    (1.0 - (predicted - actual).abs() / scale).max(0.0)
}

/// Average accuracy weighted by how many predictions back it, rounded to 3 decimals
#[must_use]
pub fn reliability_score(total_predictions: usize, average_accuracy: f64) -> f64 {
    let weight = (total_predictions as f64 / RELIABILITY_FULL_PREDICTIONS).min(1.0);
    (average_accuracy * weight * 1_000.0).round() / 1_000.0
}

/// Compare the mean of recent daily accuracies against the mean of older ones
#[must_use]
pub fn classify_accuracy_trend(recent: &[f64], older: &[f64]) -> AccuracyTrendDirection {
    if recent.len() < ACCURACY_TREND_MIN_GROUPS || older.len() < ACCURACY_TREND_MIN_GROUPS {
        return AccuracyTrendDirection::InsufficientData;
    }

    let recent_avg = mean(recent);
    let older_avg = mean(older);

    if recent_avg > older_avg + ACCURACY_TREND_DELTA {
        AccuracyTrendDirection::Improving
    } else if recent_avg < older_avg - ACCURACY_TREND_DELTA {
        AccuracyTrendDirection::Declining
    } else {
        AccuracyTrendDirection::Stable
    }
}

/// Arithmetic mean, 0 for an empty slice
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}
