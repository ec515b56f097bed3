// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides logging init, a wired analytics environment and raw data builders
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ascend Analytics Contributors
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::cast_precision_loss,
    clippy::uninlined_format_args
)]
//! Shared test utilities for `ascend_analytics`
//!
//! This module provides common setup functions to reduce duplication
//! across integration tests.

use anyhow::Result;
use ascend_analytics::{
    cache::{ResultCache, ResultCacheConfig},
    config::AnalyticsConfig,
    models::{DataPoint, MacroSample, PerformanceSample},
    service::AnalyticsService,
    store::InMemoryTimeSeriesStore,
};
use chrono::{Days, NaiveDate};
use std::sync::{Arc, Once};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        // TEST_LOG controls the level; quiet by default
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Fixed "today" every test store is anchored on
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()
}

/// Date `n` days before [`today`]
pub fn days_ago(n: u32) -> NaiveDate {
    today().checked_sub_days(Days::new(u64::from(n))).unwrap()
}

/// Store, cache and service sharing one cache for write-path invalidation
pub struct TestEnv {
    pub cache: Arc<ResultCache>,
    pub store: Arc<InMemoryTimeSeriesStore>,
    pub service: AnalyticsService,
}

/// Configuration with background sweeps disabled
pub fn test_config() -> AnalyticsConfig {
    let mut config = AnalyticsConfig::default();
    config.sweeps.enabled = false;
    config
}

/// Fully wired environment over an empty store
pub fn create_test_env() -> TestEnv {
    init_test_logging();
    let config = test_config();
    let cache = Arc::new(ResultCache::new(&ResultCacheConfig::from(&config)));
    let store = Arc::new(
        InMemoryTimeSeriesStore::new()
            .with_invalidation(cache.clone())
            .with_today(today()),
    );
    let service = AnalyticsService::with_cache(store.clone(), cache.clone(), &config);
    TestEnv {
        cache,
        store,
        service,
    }
}

/// Record one weigh-in per day, oldest first, the last one on [`today`]
pub async fn seed_weights(store: &InMemoryTimeSeriesStore, user: &str, values: &[f64]) -> Result<()> {
    let days = values.len() as u32;
    for (offset, value) in (0_u32..).zip(values) {
        store
            .record_weight(user, DataPoint::new(days_ago(days - 1 - offset), *value))
            .await?;
    }
    Ok(())
}

/// Record `days` days of nutrition and training where both rise every day
///
/// Every macro and the training volume increase linearly, and every other
/// day carries an estimated one-rep max.
pub async fn seed_rising_history(store: &InMemoryTimeSeriesStore, user: &str, days: u32) -> Result<()> {
    for offset in 0..days {
        let date = days_ago(days - 1 - offset);
        let x = f64::from(offset);
        store
            .record_meal(
                user,
                MacroSample::new(
                    date,
                    x.mul_add(25.0, 2_000.0),
                    x.mul_add(2.0, 120.0),
                    x.mul_add(4.0, 200.0),
                    x.mul_add(1.0, 60.0),
                ),
            )
            .await?;
        let estimated_1rm = (offset % 2 == 0).then(|| x.mul_add(0.5, 100.0));
        store
            .record_performance(
                user,
                PerformanceSample::new(date, x.mul_add(150.0, 8_000.0), estimated_1rm),
            )
            .await?;
    }
    Ok(())
}
