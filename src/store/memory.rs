// ABOUTME: In-memory time-series store with per-date aggregation and cache invalidation on write
// ABOUTME: Backs tests, the demo command and single-process deployments without a database
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ascend Analytics Contributors

use super::TimeSeriesStore;
use crate::cache::{RawDataKind, ResultCache};
use crate::errors::{AppError, AppResult};
use crate::models::{DataPoint, MacroSample, PerformanceSample};
use async_trait::async_trait;
use chrono::{Days, NaiveDate, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Raw history of one user, one record per date
#[derive(Debug, Default)]
struct UserHistory {
    weights: BTreeMap<NaiveDate, f64>,
    meals: BTreeMap<NaiveDate, MacroSample>,
    performance: BTreeMap<NaiveDate, PerformanceSample>,
}

/// Time-series store holding every record in process memory
///
/// Meals logged on the same date are summed into one daily total; weight and
/// performance records replace the previous record for their date. When a
/// [`ResultCache`] is attached every successful write invalidates the
/// analyses depending on that kind of data before returning.
pub struct InMemoryTimeSeriesStore {
    users: RwLock<HashMap<String, UserHistory>>,
    available: AtomicBool,
    fetches: AtomicUsize,
    cache: Option<Arc<ResultCache>>,
    today: Option<NaiveDate>,
}

impl Default for InMemoryTimeSeriesStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTimeSeriesStore {
    /// Create an empty, available store
    #[must_use]
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
            fetches: AtomicUsize::new(0),
            cache: None,
            today: None,
        }
    }

    /// Invalidate dependent analyses in `cache` after every write
    #[must_use]
    pub fn with_invalidation(mut self, cache: Arc<ResultCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Anchor windows on a fixed date instead of the current UTC date
    #[must_use]
    pub const fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Simulate an outage: while unavailable every fetch and write fails
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of fetch calls served so far
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Record a body weight measurement
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a non-positive or non-finite weight and
    /// `StoreUnavailable` while the store is switched off
    pub async fn record_weight(&self, user: &str, point: DataPoint) -> AppResult<()> {
        if !point.value.is_finite() || point.value <= 0.0 {
            return Err(AppError::invalid_input(format!(
                "Weight must be a positive number, got {}",
                point.value
            ))
            .with_user(user));
        }
        self.ensure_available()?;

        self.users
            .write()
            .await
            .entry(user.to_owned())
            .or_default()
            .weights
            .insert(point.date, point.value);

        self.after_write(user, RawDataKind::Weight).await;
        Ok(())
    }

    /// Record a meal; macros are added to the day's running total
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for negative or non-finite macros and
    /// `StoreUnavailable` while the store is switched off
    pub async fn record_meal(&self, user: &str, meal: MacroSample) -> AppResult<()> {
        let values = [meal.calories, meal.protein, meal.carbs, meal.fat];
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(AppError::invalid_input(
                "Macro values must be non-negative numbers",
            )
            .with_user(user));
        }
        self.ensure_available()?;

        {
            let mut users = self.users.write().await;
            let history = users.entry(user.to_owned()).or_default();
            history
                .meals
                .entry(meal.date)
                .and_modify(|total| {
                    total.calories += meal.calories;
                    total.protein += meal.protein;
                    total.carbs += meal.carbs;
                    total.fat += meal.fat;
                })
                .or_insert(meal);
        }

        self.after_write(user, RawDataKind::Food).await;
        Ok(())
    }

    /// Record a day's training performance
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for negative or non-finite values and
    /// `StoreUnavailable` while the store is switched off
    pub async fn record_performance(&self, user: &str, sample: PerformanceSample) -> AppResult<()> {
        let valid_1rm = sample
            .estimated_1rm
            .is_none_or(|value| value.is_finite() && value >= 0.0);
        if !sample.total_volume.is_finite() || sample.total_volume < 0.0 || !valid_1rm {
            return Err(AppError::invalid_input(
                "Performance values must be non-negative numbers",
            )
            .with_user(user));
        }
        self.ensure_available()?;

        self.users
            .write()
            .await
            .entry(user.to_owned())
            .or_default()
            .performance
            .insert(sample.date, sample);

        self.after_write(user, RawDataKind::Workout).await;
        Ok(())
    }

    fn ensure_available(&self) -> AppResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(AppError::store_unavailable(
                "In-memory time-series store is switched off",
            ))
        }
    }

    /// Availability check plus fetch accounting, returning the window start
    fn begin_fetch(&self, user: &str, window_days: u32) -> AppResult<NaiveDate> {
        self.ensure_available()
            .map_err(|e| e.with_user(user))?;
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let today = self.today.unwrap_or_else(|| Utc::now().date_naive());
        Ok(today
            .checked_sub_days(Days::new(u64::from(window_days)))
            .unwrap_or(NaiveDate::MIN))
    }

    async fn after_write(&self, user: &str, kind: RawDataKind) {
        debug!(user = %user, kind = %kind, "Raw record stored");
        if let Some(cache) = &self.cache {
            cache.on_raw_data_written(user, kind).await;
        }
    }
}

#[async_trait]
impl TimeSeriesStore for InMemoryTimeSeriesStore {
    async fn fetch_weight_series(
        &self,
        user: &str,
        window_days: u32,
    ) -> AppResult<Vec<DataPoint>> {
        let start = self.begin_fetch(user, window_days)?;
        let users = self.users.read().await;
        Ok(users.get(user).map_or_else(Vec::new, |history| {
            history
                .weights
                .range(start..)
                .map(|(date, value)| DataPoint::new(*date, *value))
                .collect()
        }))
    }

    async fn fetch_macro_series(
        &self,
        user: &str,
        window_days: u32,
    ) -> AppResult<Vec<MacroSample>> {
        let start = self.begin_fetch(user, window_days)?;
        let users = self.users.read().await;
        Ok(users.get(user).map_or_else(Vec::new, |history| {
            history.meals.range(start..).map(|(_, sample)| *sample).collect()
        }))
    }

    async fn fetch_performance_series(
        &self,
        user: &str,
        window_days: u32,
    ) -> AppResult<Vec<PerformanceSample>> {
        let start = self.begin_fetch(user, window_days)?;
        let users = self.users.read().await;
        Ok(users.get(user).map_or_else(Vec::new, |history| {
            history
                .performance
                .range(start..)
                .map(|(_, sample)| *sample)
                .collect()
        }))
    }
}
