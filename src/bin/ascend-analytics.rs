// ABOUTME: Command-line entry point for the Ascend analytics engine
// ABOUTME: Seeds a deterministic synthetic history and runs the full analytics pipeline over it
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ascend Analytics Contributors

//! # Ascend Analytics CLI
//!
//! `ascend-analytics demo` builds an in-memory store, fills it with a
//! reproducible synthetic history, and prints insights, a background
//! correlation sweep and cache statistics as JSON.

use anyhow::{bail, Result};
use ascend_analytics::{
    cache::{ResultCache, ResultCacheConfig},
    config::AnalyticsConfig,
    logging,
    service::AnalyticsService,
    store::{synthetic::SyntheticHistoryBuilder, InMemoryTimeSeriesStore},
    tasks::{ExpensiveAnalysis, TaskStatus},
};
use chrono::Utc;
use clap::{Parser, Subcommand};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::info;

#[derive(Parser)]
#[command(name = "ascend-analytics")]
#[command(about = "Ascend training analytics - trends, correlations and insights")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Seed synthetic data and run every analysis over it
    Demo {
        /// User the synthetic history belongs to
        #[arg(long, default_value = "demo@ascend.fit")]
        user: String,

        /// Days of history to generate
        #[arg(long, default_value_t = 60)]
        days: u32,

        /// Seed for the synthetic history
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Seconds to wait for the background correlation sweep
        #[arg(long, default_value_t = 30)]
        task_timeout_secs: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_from_env()?;

    let config = AnalyticsConfig::from_env()?;
    info!("{}", config.summary());

    match args.command {
        Command::Demo {
            user,
            days,
            seed,
            task_timeout_secs,
        } => run_demo(&config, &user, days, seed, Duration::from_secs(task_timeout_secs)).await,
    }
}

async fn run_demo(
    config: &AnalyticsConfig,
    user: &str,
    days: u32,
    seed: u64,
    task_timeout: Duration,
) -> Result<()> {
    let today = Utc::now().date_naive();
    let cache = Arc::new(ResultCache::new(&ResultCacheConfig::from(config)));
    let store = Arc::new(
        InMemoryTimeSeriesStore::new()
            .with_invalidation(cache.clone())
            .with_today(today),
    );

    let history = SyntheticHistoryBuilder::new(seed).generate(days, today);
    history.seed(&store, user).await?;
    info!(
        user = %user,
        days,
        seed,
        weights = history.weights.len(),
        meals = history.meals.len(),
        workouts = history.performance.len(),
        "Synthetic history seeded"
    );

    let service = AnalyticsService::with_cache(store, cache, config);
    let sweeps = service.start_background_sweeps();

    let insights = service.insights(user).await?;
    println!("{}", serde_json::to_string_pretty(&insights)?);

    let task_id = service
        .submit_expensive_analysis(user, ExpensiveAnalysis::ComprehensiveCorrelation, days)
        .await?;
    let deadline = Instant::now() + task_timeout;
    let status = loop {
        let status = service.task_status(&task_id).await;
        if status != TaskStatus::Running {
            break status;
        }
        if Instant::now() >= deadline {
            bail!("Task {task_id} did not finish within {}s", task_timeout.as_secs());
        }
        sleep(Duration::from_millis(50)).await;
    };

    let output = json!({
        "task_id": task_id,
        "task_status": status,
        "task_result": service.task_result(&task_id).await,
        "cache_stats": service.cache_stats().await,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    for sweep in sweeps {
        sweep.shutdown().await;
    }
    Ok(())
}
