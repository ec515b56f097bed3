// ABOUTME: Deterministic synthetic history generator for demos and benchmarks
// ABOUTME: Produces a cutting-phase lifter with correlated intake and training volume from a seed
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ascend Analytics Contributors

use super::memory::InMemoryTimeSeriesStore;
use crate::errors::AppResult;
use crate::models::{DataPoint, MacroSample, PerformanceSample};
use chrono::{Days, NaiveDate};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Meals logged per day; the store sums them into one daily total
const MEALS_PER_DAY: u32 = 3;

/// Every seventh day is a rest day without a workout
const REST_DAY_PERIOD: u64 = 7;

/// Raw records generated for one user
#[derive(Debug, Clone, Default)]
pub struct SyntheticHistory {
    /// Morning weigh-ins
    pub weights: Vec<DataPoint>,
    /// Individual meals, several per day
    pub meals: Vec<MacroSample>,
    /// Training days
    pub performance: Vec<PerformanceSample>,
}

impl SyntheticHistory {
    /// Write every record into `store` through its public write path
    ///
    /// # Errors
    ///
    /// Propagates the first failed write
    pub async fn seed(&self, store: &InMemoryTimeSeriesStore, user: &str) -> AppResult<()> {
        for point in &self.weights {
            store.record_weight(user, *point).await?;
        }
        for meal in &self.meals {
            store.record_meal(user, *meal).await?;
        }
        for sample in &self.performance {
            store.record_performance(user, *sample).await?;
        }
        Ok(())
    }
}

/// Builder for reproducible synthetic histories
///
/// The same seed always yields the same records, so demo output and
/// benchmark inputs are stable across runs.
#[derive(Debug, Clone)]
pub struct SyntheticHistoryBuilder {
    rng: ChaCha8Rng,
    start_weight: f64,
    weekly_weight_change: f64,
    base_calories: f64,
    base_volume: f64,
}

impl SyntheticHistoryBuilder {
    /// Create a builder with a deterministic seed
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            start_weight: 84.0,
            weekly_weight_change: -0.35,
            base_calories: 2_300.0,
            base_volume: 9_000.0,
        }
    }

    /// Starting body weight in kilograms
    #[must_use]
    pub const fn start_weight(mut self, kilograms: f64) -> Self {
        self.start_weight = kilograms;
        self
    }

    /// Weight change per week in kilograms (negative while cutting)
    #[must_use]
    pub const fn weekly_weight_change(mut self, kilograms: f64) -> Self {
        self.weekly_weight_change = kilograms;
        self
    }

    /// Generate `days` consecutive days ending on `today`
    #[must_use]
    pub fn generate(mut self, days: u32, today: NaiveDate) -> SyntheticHistory {
        let mut history = SyntheticHistory::default();
        let daily_weight_change = self.weekly_weight_change / 7.0;

        for offset in 0..days {
            let days_back = u64::from(days - 1 - offset);
            let Some(date) = today.checked_sub_days(Days::new(days_back)) else {
                continue;
            };
            let progress = f64::from(offset);

            let weight_noise: f64 = self.rng.gen_range(-0.3..0.3);
            history.weights.push(DataPoint::new(
                date,
                progress.mul_add(daily_weight_change, self.start_weight) + weight_noise,
            ));

            let calories =
                progress.mul_add(6.0, self.base_calories) + self.rng.gen_range(-120.0..120.0);
            let protein = calories.mul_add(0.075, self.rng.gen_range(-8.0..8.0));
            let carbs = calories.mul_add(0.11, self.rng.gen_range(-15.0..15.0));
            let fat = calories.mul_add(0.03, self.rng.gen_range(-5.0..5.0));
            for _ in 0..MEALS_PER_DAY {
                let share = f64::from(MEALS_PER_DAY);
                history.meals.push(MacroSample::new(
                    date,
                    calories / share,
                    protein / share,
                    carbs / share,
                    fat / share,
                ));
            }

            if days_back % REST_DAY_PERIOD != 0 {
                let volume = (calories - self.base_calories).mul_add(4.0, self.base_volume)
                    + self.rng.gen_range(-400.0..400.0);
                let estimated_1rm = (days_back % 2 == 0)
                    .then(|| progress.mul_add(0.15, 140.0) + self.rng.gen_range(-2.0..2.0));
                history
                    .performance
                    .push(PerformanceSample::new(date, volume.max(0.0), estimated_1rm));
            }
        }

        history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()
    }

    #[test]
    fn test_same_seed_same_history() {
        let a = SyntheticHistoryBuilder::new(7).generate(30, today());
        let b = SyntheticHistoryBuilder::new(7).generate(30, today());
        assert_eq!(a.weights, b.weights);
        assert_eq!(a.performance, b.performance);
    }

    #[test]
    fn test_shape() {
        let history = SyntheticHistoryBuilder::new(1).generate(28, today());
        assert_eq!(history.weights.len(), 28);
        assert_eq!(history.meals.len(), 28 * 3);
        assert_eq!(history.performance.len(), 24);
        assert_eq!(history.weights.last().unwrap().date, today());
    }
}
