// ABOUTME: Append-only prediction accuracy log with per-type reliability and trend reporting
// ABOUTME: Scores each prediction once at write time against the observed value
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ascend Analytics Contributors

use crate::constants::analytics::{ACCURACY_TREND_HALF, ACCURACY_TREND_MAX_DAYS};
use crate::errors::{AppError, AppResult};
use ascend_intelligence::accuracy::{
    accuracy_score, classify_accuracy_trend, mean, reliability_score, AccuracyTrendDirection,
};
use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::Mutex;
use tracing::debug;

/// One scored prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracyRecord {
    /// User the prediction was made for
    pub user: String,
    /// Prediction kind (`weight_change`, `workout_performance`, ...)
    pub prediction_type: String,
    /// Predicted value
    pub predicted_value: f64,
    /// Observed value
    pub actual_value: f64,
    /// When the prediction was made
    pub prediction_date: DateTime<Utc>,
    /// When the actual value was observed
    pub actual_date: DateTime<Utc>,
    /// `max(0, 1 - |predicted - actual| / max(|actual|, 1))`
    pub accuracy_score: f64,
}

/// Aggregate accuracy of a user's predictions
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AccuracyStats {
    /// Mean score
    pub average_accuracy: f64,
    /// Lowest score
    pub min_accuracy: f64,
    /// Highest score
    pub max_accuracy: f64,
    /// Number of predictions
    pub total_predictions: usize,
}

/// A recent record with its absolute error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentAccuracy {
    /// The stored record
    #[serde(flatten)]
    pub record: AccuracyRecord,
    /// `|predicted - actual|`
    pub error_magnitude: f64,
}

/// Mean accuracy of one observation day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyAccuracy {
    /// Observation day
    pub date: NaiveDate,
    /// Mean score that day
    pub accuracy: f64,
    /// Predictions scored that day
    pub predictions: usize,
}

/// Whether predictions are getting more accurate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracyTrend {
    /// Improving, declining, stable or insufficient data
    pub trend: AccuracyTrendDirection,
    /// Mean of the newest daily accuracies
    pub recent_average_accuracy: f64,
    /// Mean of the daily accuracies before those
    pub older_average_accuracy: f64,
    /// Predictions across every day considered
    pub total_predictions: usize,
    /// Number of days considered
    pub analysis_period_days: usize,
    /// Daily accuracies, newest first
    pub daily_data: Vec<DailyAccuracy>,
}

/// Accuracy breakdown for one prediction type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypePerformance {
    /// Prediction kind
    pub prediction_type: String,
    /// Number of predictions
    pub total_predictions: usize,
    /// Mean score
    pub average_accuracy: f64,
    /// Lowest score
    pub min_accuracy: f64,
    /// Highest score
    pub max_accuracy: f64,
    /// Mean absolute error
    pub average_error: f64,
    /// Mean score weighted by prediction count, 3 decimals
    pub reliability_score: f64,
}

/// In-process prediction accuracy log
#[derive(Default)]
pub struct AccuracyTracker {
    records: Mutex<Vec<AccuracyRecord>>,
}

impl AccuracyTracker {
    /// Create an empty log
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Score and append a prediction; `actual_date` defaults to now
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for non-finite values or an empty prediction type
    pub async fn log_prediction(
        &self,
        user: &str,
        prediction_type: &str,
        predicted_value: f64,
        actual_value: f64,
        prediction_date: DateTime<Utc>,
        actual_date: Option<DateTime<Utc>>,
    ) -> AppResult<AccuracyRecord> {
        if !predicted_value.is_finite() || !actual_value.is_finite() {
            return Err(AppError::invalid_input(
                "Predicted and actual values must be finite numbers",
            )
            .with_user(user));
        }
        if prediction_type.trim().is_empty() {
            return Err(AppError::invalid_input("Prediction type must not be empty").with_user(user));
        }

        let record = AccuracyRecord {
            user: user.to_owned(),
            prediction_type: prediction_type.to_owned(),
            predicted_value,
            actual_value,
            prediction_date,
            actual_date: actual_date.unwrap_or_else(Utc::now),
            accuracy_score: accuracy_score(predicted_value, actual_value),
        };

        self.records.lock().await.push(record.clone());
        debug!(
            user = %user,
            prediction_type = %prediction_type,
            accuracy = record.accuracy_score,
            "Prediction accuracy logged"
        );
        Ok(record)
    }

    /// Aggregate accuracy, optionally for one prediction type; zeros when empty
    pub async fn stats(&self, user: &str, prediction_type: Option<&str>) -> AccuracyStats {
        let records = self.records.lock().await;
        let scores: Vec<f64> = records
            .iter()
            .filter(|r| matches_filter(r, user, prediction_type))
            .map(|r| r.accuracy_score)
            .collect();
        drop(records);

        if scores.is_empty() {
            return AccuracyStats::default();
        }

        AccuracyStats {
            average_accuracy: mean(&scores),
            min_accuracy: scores.iter().copied().fold(f64::INFINITY, f64::min),
            max_accuracy: scores.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            total_predictions: scores.len(),
        }
    }

    /// Records observed within the last `days` days, newest first
    pub async fn recent(&self, user: &str, days: u32) -> Vec<RecentAccuracy> {
        let cutoff = Utc::now() - TimeDelta::days(i64::from(days));
        let records = self.records.lock().await;
        let mut recent: Vec<RecentAccuracy> = records
            .iter()
            .filter(|r| r.user == user && r.actual_date >= cutoff)
            .map(|r| RecentAccuracy {
                error_magnitude: (r.predicted_value - r.actual_value).abs(),
                record: r.clone(),
            })
            .collect();
        drop(records);

        recent.sort_by(|a, b| b.record.actual_date.cmp(&a.record.actual_date));
        recent
    }

    /// Compare the newest week of daily accuracy against the week before
    pub async fn accuracy_trend(&self, user: &str, prediction_type: Option<&str>) -> AccuracyTrend {
        let mut by_day: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
        {
            let records = self.records.lock().await;
            for record in records
                .iter()
                .filter(|r| matches_filter(r, user, prediction_type))
            {
                by_day
                    .entry(record.actual_date.date_naive())
                    .or_default()
                    .push(record.accuracy_score);
            }
        }

        let daily_data: Vec<DailyAccuracy> = by_day
            .iter()
            .rev()
            .take(ACCURACY_TREND_MAX_DAYS)
            .map(|(date, scores)| DailyAccuracy {
                date: *date,
                accuracy: mean(scores),
                predictions: scores.len(),
            })
            .collect();

        let daily_means: Vec<f64> = daily_data.iter().map(|day| day.accuracy).collect();
        let recent = &daily_means[..daily_means.len().min(ACCURACY_TREND_HALF)];
        let older = daily_means
            .get(ACCURACY_TREND_HALF..daily_means.len().min(ACCURACY_TREND_HALF * 2))
            .unwrap_or(&[]);

        AccuracyTrend {
            trend: classify_accuracy_trend(recent, older),
            recent_average_accuracy: mean(recent),
            older_average_accuracy: mean(older),
            total_predictions: daily_data.iter().map(|day| day.predictions).sum(),
            analysis_period_days: daily_data.len(),
            daily_data,
        }
    }

    /// Accuracy per prediction type, most used type first
    pub async fn type_performance(&self, user: &str) -> Vec<TypePerformance> {
        let mut by_type: HashMap<String, Vec<(f64, f64)>> = HashMap::new();
        {
            let records = self.records.lock().await;
            for record in records.iter().filter(|r| r.user == user) {
                by_type
                    .entry(record.prediction_type.clone())
                    .or_default()
                    .push((
                        record.accuracy_score,
                        (record.predicted_value - record.actual_value).abs(),
                    ));
            }
        }

        let mut performance: Vec<TypePerformance> = by_type
            .into_iter()
            .map(|(prediction_type, rows)| {
                let scores: Vec<f64> = rows.iter().map(|(score, _)| *score).collect();
                let errors: Vec<f64> = rows.iter().map(|(_, error)| *error).collect();
                let average_accuracy = mean(&scores);
                TypePerformance {
                    prediction_type,
                    total_predictions: scores.len(),
                    average_accuracy,
                    min_accuracy: scores.iter().copied().fold(f64::INFINITY, f64::min),
                    max_accuracy: scores.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                    average_error: mean(&errors),
                    reliability_score: reliability_score(scores.len(), average_accuracy),
                }
            })
            .collect();

        performance.sort_by(|a, b| {
            b.total_predictions
                .cmp(&a.total_predictions)
                .then_with(|| a.prediction_type.cmp(&b.prediction_type))
        });
        performance
    }
}

fn matches_filter(record: &AccuracyRecord, user: &str, prediction_type: Option<&str>) -> bool {
    record.user == user && prediction_type.is_none_or(|wanted| record.prediction_type == wanted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_score_is_computed_at_write_time() {
        let tracker = AccuracyTracker::new();
        let record = tracker
            .log_prediction("a@x.com", "weight_change", 79.0, 80.0, Utc::now(), None)
            .await
            .unwrap();
        assert!((record.accuracy_score - (1.0 - 1.0 / 80.0)).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_rejects_non_finite() {
        let tracker = AccuracyTracker::new();
        let result = tracker
            .log_prediction("a@x.com", "weight_change", f64::NAN, 80.0, Utc::now(), None)
            .await;
        assert!(result.is_err());
        assert_eq!(tracker.stats("a@x.com", None).await.total_predictions, 0);
    }

    #[tokio::test]
    async fn test_stats_filter_by_type() {
        let tracker = AccuracyTracker::new();
        let now = Utc::now();
        tracker
            .log_prediction("a@x.com", "weight_change", 80.0, 80.0, now, None)
            .await
            .unwrap();
        tracker
            .log_prediction("a@x.com", "volume", 50.0, 100.0, now, None)
            .await
            .unwrap();

        let all = tracker.stats("a@x.com", None).await;
        assert_eq!(all.total_predictions, 2);
        assert!((all.average_accuracy - 0.75).abs() < 1e-12);

        let volume = tracker.stats("a@x.com", Some("volume")).await;
        assert_eq!(volume.total_predictions, 1);
        assert!((volume.max_accuracy - 0.5).abs() < 1e-12);

        assert_eq!(tracker.stats("b@x.com", None).await, AccuracyStats::default());
    }

    #[tokio::test]
    async fn test_trend_compares_newest_week_with_previous() {
        let tracker = AccuracyTracker::new();
        let now = Utc::now();
        for days_ago in 0..14_i64 {
            let actual_date = now - TimeDelta::days(days_ago);
            // Newest week predicts exactly, the week before misses by 20%
            let predicted = if days_ago < 7 { 100.0 } else { 80.0 };
            tracker
                .log_prediction("a@x.com", "volume", predicted, 100.0, actual_date, Some(actual_date))
                .await
                .unwrap();
        }

        let trend = tracker.accuracy_trend("a@x.com", None).await;
        assert_eq!(trend.trend, AccuracyTrendDirection::Improving);
        assert_eq!(trend.analysis_period_days, 14);
        assert_eq!(trend.total_predictions, 14);
        assert!((trend.recent_average_accuracy - 1.0).abs() < 1e-12);
        assert!((trend.older_average_accuracy - 0.8).abs() < 1e-12);
        assert!(trend.daily_data[0].date > trend.daily_data[13].date);
    }

    #[tokio::test]
    async fn test_trend_without_records_is_insufficient() {
        let tracker = AccuracyTracker::new();
        let trend = tracker.accuracy_trend("a@x.com", Some("volume")).await;
        assert_eq!(trend.trend, AccuracyTrendDirection::InsufficientData);
        assert_eq!(trend.analysis_period_days, 0);
        assert!(trend.daily_data.is_empty());
    }

    #[tokio::test]
    async fn test_type_performance_orders_by_count() {
        let tracker = AccuracyTracker::new();
        let now = Utc::now();
        for _ in 0..10 {
            tracker
                .log_prediction("a@x.com", "weight_change", 81.0, 80.0, now, None)
                .await
                .unwrap();
        }
        tracker
            .log_prediction("a@x.com", "volume", 9_000.0, 10_000.0, now, None)
            .await
            .unwrap();

        let performance = tracker.type_performance("a@x.com").await;
        assert_eq!(performance.len(), 2);
        assert_eq!(performance[0].prediction_type, "weight_change");
        assert_eq!(performance[0].total_predictions, 10);
        assert!((performance[0].average_error - 1.0).abs() < 1e-9);
        // 0.9875 weighted by 10/20
        assert!((performance[0].reliability_score - 0.494).abs() < 1e-9);
        assert_eq!(performance[1].prediction_type, "volume");
    }

    #[tokio::test]
    async fn test_recent_skips_old_records() {
        let tracker = AccuracyTracker::new();
        let now = Utc::now();
        let old = now - TimeDelta::days(40);
        tracker
            .log_prediction("a@x.com", "volume", 90.0, 100.0, old, Some(old))
            .await
            .unwrap();
        tracker
            .log_prediction("a@x.com", "volume", 95.0, 100.0, now, Some(now))
            .await
            .unwrap();

        let recent = tracker.recent("a@x.com", 30).await;
        assert_eq!(recent.len(), 1);
        assert!((recent[0].error_magnitude - 5.0).abs() < 1e-12);
    }
}
