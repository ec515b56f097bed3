// ABOUTME: Analytics service facade wiring the store, result cache, analyzers and task scheduler
// ABOUTME: Entry point for trend, correlation, insight and background analysis requests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ascend Analytics Contributors

//! # Analytics Service
//!
//! One `AnalyticsService` is built per process. It owns the result cache,
//! the task scheduler and the accuracy log, and hands cheap clones of the
//! analyzers to background tasks. Callers that write raw data through their
//! own store must either attach the same cache to it or call
//! [`AnalyticsService::on_raw_data_written`] after every commit.

use crate::cache::{AnalysisType, CacheStats, RawDataKind, ResultCache, ResultCacheConfig};
use crate::config::AnalyticsConfig;
use crate::constants::analytics::{
    DEFAULT_CORRELATION_WINDOW_DAYS, DEFAULT_PERFORMANCE_WINDOW_DAYS, DEFAULT_TREND_WINDOW_DAYS,
};
use crate::errors::AppResult;
use crate::intelligence::insights::{Insights, TrendsOverview};
use crate::intelligence::{
    AccuracyTracker, CorrelationAnalyzer, CorrelationOutcome, DataSufficiency, PerformanceModel,
    PerformanceModeler, TrendAnalyzer, TrendReport,
};
use crate::logging::AnalyticsLogger;
use crate::maintenance::{spawn_periodic, SweepHandle, SweepSchedule};
use crate::models::Macro;
use crate::store::TimeSeriesStore;
use crate::tasks::expensive::AnalysisContext;
use crate::tasks::{
    ExpensiveAnalysis, TaskCleanupReport, TaskScheduler, TaskSchedulerConfig, TaskStatus,
};
use futures_util::future::try_join4;
use serde_json::Value;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Facade over every analytics component
pub struct AnalyticsService {
    cache: Arc<ResultCache>,
    trends: TrendAnalyzer,
    correlations: CorrelationAnalyzer,
    performance: PerformanceModeler,
    accuracy: AccuracyTracker,
    scheduler: TaskScheduler,
    config: AnalyticsConfig,
}

impl AnalyticsService {
    /// Build a service with its own result cache
    #[must_use]
    pub fn new(store: Arc<dyn TimeSeriesStore>, config: &AnalyticsConfig) -> Self {
        let cache = Arc::new(ResultCache::new(&ResultCacheConfig::from(config)));
        Self::with_cache(store, cache, config)
    }

    /// Build a service around a cache the write path already invalidates
    #[must_use]
    pub fn with_cache(
        store: Arc<dyn TimeSeriesStore>,
        cache: Arc<ResultCache>,
        config: &AnalyticsConfig,
    ) -> Self {
        info!(config = %config.summary(), "Analytics service initialized");
        Self {
            trends: TrendAnalyzer::new(store.clone(), cache.clone()),
            correlations: CorrelationAnalyzer::new(store.clone()),
            performance: PerformanceModeler::new(store, cache.clone()),
            accuracy: AccuracyTracker::new(),
            scheduler: TaskScheduler::new(TaskSchedulerConfig::from(config)),
            cache,
            config: config.clone(),
        }
    }

    /// Shared result cache
    #[must_use]
    pub const fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }

    /// Prediction accuracy log
    #[must_use]
    pub const fn accuracy(&self) -> &AccuracyTracker {
        &self.accuracy
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Body weight trend over `days`
    ///
    /// # Errors
    ///
    /// Propagates store failures
    pub async fn weight_trend(&self, user: &str, days: u32) -> AppResult<Option<TrendReport>> {
        self.observed(
            user,
            AnalysisType::WeightTrends,
            days,
            self.trends.weight_trend(user, days),
        )
        .await
    }

    /// Per-macro trends over `days`
    ///
    /// # Errors
    ///
    /// Propagates store failures
    pub async fn macro_patterns(
        &self,
        user: &str,
        days: u32,
    ) -> AppResult<BTreeMap<Macro, TrendReport>> {
        self.observed(
            user,
            AnalysisType::MacroPatterns,
            days,
            self.trends.macro_patterns(user, days),
        )
        .await
    }

    /// Nutrition/performance correlations over `days`; never cached
    ///
    /// # Errors
    ///
    /// Propagates store failures
    pub async fn correlations(&self, user: &str, days: u32) -> AppResult<CorrelationOutcome> {
        let started = Instant::now();
        let outcome = self
            .correlations
            .nutrition_performance_correlations(user, days)
            .await?;
        AnalyticsLogger::log_analysis(user, "correlations", days, false, elapsed_ms(started));
        Ok(outcome)
    }

    /// Minimum-data verdict for correlations over `days`
    ///
    /// # Errors
    ///
    /// Propagates store failures
    pub async fn validate_data_sufficiency(
        &self,
        user: &str,
        days: u32,
    ) -> AppResult<DataSufficiency> {
        self.correlations.validate_data_sufficiency(user, days).await
    }

    /// Training performance model over `days`
    ///
    /// # Errors
    ///
    /// Propagates store failures
    pub async fn performance_model(
        &self,
        user: &str,
        days: u32,
    ) -> AppResult<Option<PerformanceModel>> {
        self.observed(
            user,
            AnalysisType::PerformanceModel,
            days,
            self.performance.model(user, days),
        )
        .await
    }

    /// Weight and macro trends together, or guidance when neither exists
    ///
    /// # Errors
    ///
    /// Propagates store failures
    pub async fn trends_overview(&self, user: &str, days: u32) -> AppResult<TrendsOverview> {
        let weight = self.weight_trend(user, days).await?;
        let macros = self.macro_patterns(user, days).await?;
        Ok(TrendsOverview::from_parts(weight, macros, days))
    }

    /// Dashboard insights over the default windows
    ///
    /// # Errors
    ///
    /// Propagates store failures
    pub async fn insights(&self, user: &str) -> AppResult<Insights> {
        let (weight, macros, correlations, performance) = try_join4(
            self.weight_trend(user, DEFAULT_TREND_WINDOW_DAYS),
            self.macro_patterns(user, DEFAULT_TREND_WINDOW_DAYS),
            self.correlations(user, DEFAULT_CORRELATION_WINDOW_DAYS),
            self.performance_model(user, DEFAULT_PERFORMANCE_WINDOW_DAYS),
        )
        .await?;

        Ok(Insights::from_parts(weight, macros, correlations, performance))
    }

    /// Queue an expensive analysis and return its task id
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` when the same analysis is already
    /// running or its result is still retained
    pub async fn submit_expensive_analysis(
        &self,
        user: &str,
        kind: ExpensiveAnalysis,
        days: u32,
    ) -> AppResult<String> {
        let task_id = kind.task_id(user, days);
        let context = AnalysisContext::new(
            self.trends.clone(),
            self.correlations.clone(),
            self.performance.clone(),
            self.cache.clone(),
        );
        self.scheduler
            .submit(&task_id, context.run(kind, user.to_owned(), days))
            .await?;
        Ok(task_id)
    }

    /// Status of a background analysis
    pub async fn task_status(&self, task_id: &str) -> TaskStatus {
        self.scheduler.status(task_id).await
    }

    /// Result of a completed background analysis
    pub async fn task_result(&self, task_id: &str) -> Option<Value> {
        self.scheduler.result(task_id).await
    }

    /// Drop cached analyses depending on a freshly written kind of data
    pub async fn on_raw_data_written(&self, user: &str, kind: RawDataKind) -> usize {
        self.cache.on_raw_data_written(user, kind).await
    }

    /// Drop cached analyses for `user`, optionally restricted to some types
    pub async fn invalidate(&self, user: &str, analysis_types: Option<&[AnalysisType]>) -> usize {
        self.cache.invalidate(user, analysis_types).await
    }

    /// Cache observability counters
    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    /// Remove expired cache rows now
    pub async fn purge_expired(&self) -> usize {
        self.cache.purge_expired().await
    }

    /// Remove finished task handles and expired task results now
    pub async fn cleanup_tasks(&self) -> TaskCleanupReport {
        self.scheduler.cleanup_finished().await
    }

    /// Install the cache purge and task cleanup sweeps
    ///
    /// Returns no handles when sweeps are disabled. Dropping a handle stops
    /// its sweep.
    #[must_use]
    pub fn start_background_sweeps(&self) -> Vec<SweepHandle> {
        if !self.config.sweeps.enabled {
            debug!("Background sweeps disabled");
            return Vec::new();
        }

        let cache = self.cache.clone();
        let purge = spawn_periodic(
            "cache_purge",
            SweepSchedule::from_settings(self.config.cache.purge_interval_secs, &self.config.sweeps),
            move || {
                let cache = cache.clone();
                async move { Ok(cache.purge_expired().await) }
            },
        );

        let scheduler = self.scheduler.clone();
        let cleanup = spawn_periodic(
            "task_cleanup",
            SweepSchedule::from_settings(
                self.config.tasks.cleanup_interval_secs,
                &self.config.sweeps,
            ),
            move || {
                let scheduler = scheduler.clone();
                async move { Ok(scheduler.cleanup_finished().await.total()) }
            },
        );

        vec![purge, cleanup]
    }

    async fn observed<T>(
        &self,
        user: &str,
        analysis_type: AnalysisType,
        days: u32,
        analysis: impl Future<Output = AppResult<T>>,
    ) -> AppResult<T> {
        let cache_hit = self.cache.contains_fresh(user, analysis_type, days).await;
        let started = Instant::now();
        let result = analysis.await?;
        AnalyticsLogger::log_analysis(
            user,
            analysis_type.as_str(),
            days,
            cache_hit,
            elapsed_ms(started),
        );
        Ok(result)
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
