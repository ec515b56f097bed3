// ABOUTME: Result cache for computed analyses keyed by user, analysis type and window
// ABOUTME: Defines cache keys, analysis type names, cached payloads, stats and configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ascend Analytics Contributors

/// Raw data kinds and the analysis types they invalidate
pub mod invalidation;
/// LRU-backed result cache with TTL expiry
pub mod result_cache;

pub use invalidation::RawDataKind;
pub use result_cache::ResultCache;

use crate::config::AnalyticsConfig;
use crate::constants::cache::{
    DEFAULT_CACHE_MAX_ENTRIES, DEFAULT_PURGE_INTERVAL_SECS, DEFAULT_RESULT_TTL_HOURS,
};
use crate::constants::time::HOUR_SECONDS;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Kind of analysis stored in the result cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisType {
    /// Body weight trend report
    WeightTrends,
    /// Per-macro trend reports
    MacroPatterns,
    /// Weight and macro trends across the standard windows
    MultiWindowTrends,
    /// Nutrition/performance correlations across the standard windows
    ComprehensiveCorrelation,
    /// Volume and 1RM trend model with projections
    PerformanceModel,
}

impl AnalysisType {
    /// Every analysis type
    pub const ALL: [Self; 5] = [
        Self::WeightTrends,
        Self::MacroPatterns,
        Self::MultiWindowTrends,
        Self::ComprehensiveCorrelation,
        Self::PerformanceModel,
    ];

    /// Stable name used in cache keys, stats and task ids
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WeightTrends => "weight_trends",
            Self::MacroPatterns => "macro_patterns",
            Self::MultiWindowTrends => "multi_window_trends",
            Self::ComprehensiveCorrelation => "comprehensive_correlation",
            Self::PerformanceModel => "performance_model",
        }
    }
}

impl fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|analysis_type| analysis_type.as_str() == s)
            .ok_or_else(|| format!("unknown analysis type '{s}'"))
    }
}

/// Unique key of a cache entry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnalysisKey {
    /// User the analysis belongs to
    pub user: String,
    /// Analysis kind
    pub analysis_type: AnalysisType,
    /// Lookback window in days
    pub window_days: u32,
}

impl AnalysisKey {
    /// Build a key
    pub fn new(user: impl Into<String>, analysis_type: AnalysisType, window_days: u32) -> Self {
        Self {
            user: user.into(),
            analysis_type,
            window_days,
        }
    }
}

impl fmt::Display for AnalysisKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.user, self.analysis_type, self.window_days)
    }
}

/// A cached analysis as returned by a hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedAnalysis {
    /// Opaque structured result
    pub payload: Value,
    /// Quality score stored with the result
    pub confidence_level: f64,
    /// When the result was computed
    pub created_at: DateTime<Utc>,
    /// When the result stops being served
    pub expires_at: DateTime<Utc>,
}

/// Aggregate counters for observability
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    /// All stored rows, expired or not
    pub total_entries: usize,
    /// Rows whose expiry has passed but were not purged yet
    pub expired_entries: usize,
    /// Rows still served on read
    pub active_entries: usize,
    /// Active rows per analysis type
    pub entries_by_type: BTreeMap<String, usize>,
    /// Mean stored confidence of active rows per analysis type
    pub avg_confidence_by_type: BTreeMap<String, f64>,
    /// Share of rows still active, in percent (2 decimals)
    pub cache_hit_potential: f64,
    /// Reads served from the cache since startup
    pub hits: u64,
    /// Reads that found nothing fresh since startup
    pub misses: u64,
}

/// Result cache configuration
#[derive(Debug, Clone)]
pub struct ResultCacheConfig {
    /// Default time-to-live of a stored result
    pub ttl: Duration,
    /// Maximum number of entries before LRU eviction
    pub max_entries: usize,
    /// Interval between expired-entry purges
    pub purge_interval: Duration,
}

impl Default for ResultCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(DEFAULT_RESULT_TTL_HOURS * HOUR_SECONDS),
            max_entries: DEFAULT_CACHE_MAX_ENTRIES,
            purge_interval: Duration::from_secs(DEFAULT_PURGE_INTERVAL_SECS),
        }
    }
}

impl From<&AnalyticsConfig> for ResultCacheConfig {
    fn from(config: &AnalyticsConfig) -> Self {
        Self {
            ttl: config.cache_ttl(),
            max_entries: config.cache.max_entries,
            purge_interval: Duration::from_secs(config.cache.purge_interval_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_type_names_round_trip() {
        for analysis_type in AnalysisType::ALL {
            let parsed: AnalysisType = analysis_type.as_str().parse().unwrap();
            assert_eq!(parsed, analysis_type);
        }
        assert!("nutrition_magic".parse::<AnalysisType>().is_err());
    }

    #[test]
    fn test_key_display() {
        let key = AnalysisKey::new("lifter@example.com", AnalysisType::WeightTrends, 30);
        assert_eq!(key.to_string(), "lifter@example.com:weight_trends:30");
    }

    #[test]
    fn test_config_defaults() {
        let config = ResultCacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(24 * 3_600));
        assert_eq!(config.max_entries, 10_000);
    }
}
