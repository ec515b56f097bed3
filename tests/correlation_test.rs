// ABOUTME: Integration tests for nutrition/performance correlation analysis
// ABOUTME: Covers date alignment, minimum-data verdicts and end-to-end significance on rising data
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ascend Analytics Contributors
#![allow(clippy::unwrap_used)]

mod common;

use anyhow::Result;
use ascend_analytics::intelligence::{
    CorrelationAnalyzer, CorrelationDirection, CorrelationOutcome, CorrelationStrength,
};
use ascend_analytics::models::{Macro, MacroSample, PerformanceSample};
use chrono::NaiveDate;
use common::{create_test_env, seed_rising_history};

const USER: &str = "lifter@example.com";

fn jan(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
}

#[test]
fn test_align_by_date_inner_joins() {
    let macros = vec![
        MacroSample::new(jan(1), 2_000.0, 150.0, 200.0, 60.0),
        MacroSample::new(jan(2), 2_100.0, 155.0, 210.0, 62.0),
        MacroSample::new(jan(4), 2_200.0, 160.0, 220.0, 64.0),
    ];
    let performance = vec![
        PerformanceSample::new(jan(1), 9_000.0, Some(120.0)),
        PerformanceSample::new(jan(3), 9_500.0, None),
        PerformanceSample::new(jan(4), 9_800.0, None),
    ];

    let aligned = CorrelationAnalyzer::align_by_date(&macros, &performance);
    assert_eq!(aligned.len(), 2);
    assert_eq!(aligned[0].date, jan(1));
    assert_eq!(aligned[1].date, jan(4));
    assert!((aligned[0].calories - 2_000.0).abs() < f64::EPSILON);
    assert!((aligned[0].total_volume - 9_000.0).abs() < f64::EPSILON);
    assert_eq!(aligned[0].estimated_1rm, Some(120.0));
    assert!((aligned[1].macro_value(Macro::Fat) - 64.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_rising_intake_and_volume_correlate_strongly() -> Result<()> {
    let env = create_test_env();
    seed_rising_history(&env.store, USER, 20).await?;

    let outcome = env.service.correlations(USER, 30).await?;
    let computed = outcome.computed().unwrap();

    for nutrient in Macro::ALL {
        let key = format!("{nutrient}_vs_volume");
        let result = &computed.correlations[&key];
        assert_eq!(result.direction, CorrelationDirection::Positive, "{key}");
        assert_eq!(result.strength, CorrelationStrength::Strong, "{key}");
        assert!(result.significant, "{key}");
        assert_eq!(result.sample_size, 20);
    }

    assert_eq!(computed.metadata.data_points, 20);
    assert_eq!(computed.metadata.analysis_period_days, 30);
    assert_eq!(computed.metadata.macro_data_points, 20);
    assert_eq!(computed.metadata.performance_data_points, 20);
    Ok(())
}

#[tokio::test]
async fn test_one_rep_max_pairs_only_when_estimates_exist() -> Result<()> {
    let env = create_test_env();
    seed_rising_history(&env.store, USER, 20).await?;

    let outcome = env.service.correlations(USER, 30).await?;
    let computed = outcome.computed().unwrap();
    assert_eq!(computed.correlations.len(), 8);
    assert!(computed.correlations.contains_key("protein_vs_1rm"));

    // Days without an estimate are dropped from the 1RM pairs
    assert_eq!(computed.correlations["protein_vs_1rm"].sample_size, 10);
    Ok(())
}

#[tokio::test]
async fn test_short_history_reports_insufficient_data() -> Result<()> {
    let env = create_test_env();
    seed_rising_history(&env.store, USER, 10).await?;

    let outcome = env.service.correlations(USER, 30).await?;
    let CorrelationOutcome::InsufficientData(verdict) = outcome else {
        panic!("expected an insufficient-data verdict");
    };
    assert!(!verdict.valid);
    assert_eq!(verdict.requirements.current_macro_days, 10);
    assert_eq!(verdict.requirements.minimum_macro_days, 14);
    assert!(verdict.message.contains("nutrition"));

    let value = serde_json::to_value(env.service.correlations(USER, 30).await?)?;
    assert_eq!(value["status"], "insufficient_data");
    Ok(())
}

#[tokio::test]
async fn test_sufficiency_counts_aligned_days() -> Result<()> {
    let env = create_test_env();
    seed_rising_history(&env.store, USER, 16).await?;

    let verdict = env.service.validate_data_sufficiency(USER, 30).await?;
    assert!(verdict.valid);
    assert_eq!(verdict.requirements.current_aligned_points, 16);
    assert_eq!(verdict.requirements.minimum_aligned_points, 10);
    Ok(())
}
