// ABOUTME: Integration tests for weight and macro trend analysis through the result cache
// ABOUTME: Covers idempotent cached reads, write invalidation, minimum-data gates and store failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ascend Analytics Contributors
#![allow(clippy::unwrap_used, clippy::float_cmp)]

mod common;

use anyhow::Result;
use ascend_analytics::cache::AnalysisType;
use ascend_analytics::errors::ErrorCode;
use ascend_analytics::intelligence::TrendDirection;
use ascend_analytics::models::{DataPoint, Macro, MacroSample};
use common::{create_test_env, days_ago, seed_rising_history, seed_weights};

const USER: &str = "lifter@example.com";

#[tokio::test]
async fn test_weight_trend_second_call_served_from_cache() -> Result<()> {
    let env = create_test_env();
    seed_weights(&env.store, USER, &[70.0, 70.5, 71.0, 71.5, 72.0, 72.5, 73.0]).await?;

    let first = env.service.weight_trend(USER, 30).await?.unwrap();
    let fetches_after_first = env.store.fetch_count();
    let second = env.service.weight_trend(USER, 30).await?.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.rate_of_change.to_bits(), second.rate_of_change.to_bits());
    assert_eq!(
        first.confidence_level.to_bits(),
        second.confidence_level.to_bits()
    );
    assert_eq!(env.store.fetch_count(), fetches_after_first);

    assert_eq!(first.metric_name, "body_weight");
    assert_eq!(first.trend_direction, TrendDirection::Increasing);
    assert!((first.rate_of_change - 0.5).abs() < 1e-9);
    assert_eq!(first.start_date, days_ago(6));
    assert_eq!(first.end_date, days_ago(0));
    Ok(())
}

#[tokio::test]
async fn test_new_weigh_in_forces_recompute() -> Result<()> {
    let env = create_test_env();
    seed_weights(&env.store, USER, &[80.0; 7]).await?;

    let flat = env.service.weight_trend(USER, 30).await?.unwrap();
    assert_eq!(flat.trend_direction, TrendDirection::Stable);
    assert_eq!(flat.data_points, 7);

    env.store
        .record_weight(USER, DataPoint::new(days_ago(7), 84.0))
        .await?;
    let fetches = env.store.fetch_count();

    let updated = env.service.weight_trend(USER, 30).await?.unwrap();
    assert_eq!(updated.data_points, 8);
    assert_eq!(updated.trend_direction, TrendDirection::Decreasing);
    assert_eq!(env.store.fetch_count(), fetches + 1);
    Ok(())
}

#[tokio::test]
async fn test_too_few_weigh_ins_is_not_cached() -> Result<()> {
    let env = create_test_env();
    seed_weights(&env.store, USER, &[80.0, 80.2, 80.1]).await?;

    assert!(env.service.weight_trend(USER, 30).await?.is_none());
    assert!(!env.cache.contains_fresh(USER, AnalysisType::WeightTrends, 30).await);
    assert!(env.service.weight_trend(USER, 30).await?.is_none());
    assert_eq!(env.store.fetch_count(), 2);
    Ok(())
}

#[tokio::test]
async fn test_window_excludes_older_weigh_ins() -> Result<()> {
    let env = create_test_env();
    seed_weights(&env.store, USER, &[80.0; 20]).await?;

    let report = env.service.weight_trend(USER, 7).await?.unwrap();
    // days 7..=0 inclusive
    assert_eq!(report.data_points, 8);
    assert_eq!(report.time_period, 7);
    Ok(())
}

#[tokio::test]
async fn test_macro_patterns_cached_as_one_entry() -> Result<()> {
    let env = create_test_env();
    seed_rising_history(&env.store, USER, 10).await?;

    let patterns = env.service.macro_patterns(USER, 30).await?;
    assert_eq!(patterns.len(), 4);
    for report in patterns.values() {
        assert_eq!(report.trend_direction, TrendDirection::Increasing);
        assert_eq!(report.data_points, 10);
    }
    assert!((patterns[&Macro::Calories].rate_of_change - 25.0).abs() < 1e-9);

    let cached = env
        .cache
        .get(USER, AnalysisType::MacroPatterns, 30)
        .await
        .unwrap();
    let expected_quality =
        patterns.values().map(|r| r.confidence_level).sum::<f64>() / patterns.len() as f64;
    assert!((cached.confidence_level - expected_quality).abs() < 1e-12);
    Ok(())
}

#[tokio::test]
async fn test_meal_write_drops_macro_patterns_but_keeps_weight_trend() -> Result<()> {
    let env = create_test_env();
    seed_weights(&env.store, USER, &[80.0; 7]).await?;
    seed_rising_history(&env.store, USER, 7).await?;

    env.service.weight_trend(USER, 30).await?.unwrap();
    assert_eq!(env.service.macro_patterns(USER, 30).await?.len(), 4);

    env.store
        .record_meal(USER, MacroSample::new(days_ago(0), 300.0, 20.0, 30.0, 10.0))
        .await?;

    assert!(env.cache.contains_fresh(USER, AnalysisType::WeightTrends, 30).await);
    assert!(!env.cache.contains_fresh(USER, AnalysisType::MacroPatterns, 30).await);
    Ok(())
}

#[tokio::test]
async fn test_store_outage_is_an_error_not_missing_data() -> Result<()> {
    let env = create_test_env();
    seed_weights(&env.store, USER, &[80.0; 7]).await?;
    env.store.set_available(false);

    let error = env.service.weight_trend(USER, 30).await.unwrap_err();
    assert_eq!(error.code, ErrorCode::StoreUnavailable);

    let error = env.service.macro_patterns(USER, 30).await.unwrap_err();
    assert_eq!(error.code, ErrorCode::StoreUnavailable);
    Ok(())
}
