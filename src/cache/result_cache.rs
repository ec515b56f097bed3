// ABOUTME: LRU-backed result cache for computed analyses with TTL expiry and scoped invalidation
// ABOUTME: One mutex guards entries and hit counters so every check-and-mutate is atomic
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ascend Analytics Contributors

use super::{
    AnalysisKey, AnalysisType, CacheStats, CachedAnalysis, RawDataKind, ResultCacheConfig,
};
use crate::errors::AppResult;
use chrono::{DateTime, TimeDelta, Utc};
use lru::LruCache;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::num::NonZeroUsize;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Stored row
#[derive(Debug, Clone)]
struct CacheEntry {
    payload: Value,
    confidence_level: f64,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl CacheEntry {
    fn new(payload: Value, confidence_level: f64, ttl: Duration) -> Self {
        let created_at = Utc::now();
        Self {
            payload,
            confidence_level,
            created_at,
            expires_at: expiry_after(created_at, ttl),
        }
    }

    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }

    fn to_cached(&self) -> CachedAnalysis {
        CachedAnalysis {
            payload: self.payload.clone(),
            confidence_level: self.confidence_level,
            created_at: self.created_at,
            expires_at: self.expires_at,
        }
    }
}

/// Entries, read counters and per-user invalidation generations, guarded together
struct CacheState {
    entries: LruCache<AnalysisKey, CacheEntry>,
    generations: HashMap<String, u64>,
    hits: u64,
    misses: u64,
}

impl CacheState {
    fn generation(&self, user: &str) -> u64 {
        self.generations.get(user).copied().unwrap_or(0)
    }
}

/// Cache of computed analyses keyed by (user, analysis type, window)
///
/// Rows leave the cache in three ways:
///
/// - expiry: expired rows are never served but stay stored until
///   `purge_expired` removes them
/// - invalidation: `invalidate` and `on_raw_data_written` delete a user's rows
/// - eviction: once `max_entries` rows are stored, each insert of a new key
///   evicts the least recently used row
///
/// Every invalidation bumps the user's generation. A result computed from
/// data read before that bump is rejected by `put_serialized`, so a write
/// landing mid-computation never leaves a stale row behind.
pub struct ResultCache {
    state: Mutex<CacheState>,
    default_ttl: Duration,
}

impl ResultCache {
    const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(1_000) {
        Some(n) => n,
        None => unreachable!(),
    };

    /// Create an empty cache
    #[must_use]
    pub fn new(config: &ResultCacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.max_entries).unwrap_or(Self::DEFAULT_CAPACITY);
        Self {
            state: Mutex::new(CacheState {
                entries: LruCache::new(capacity),
                generations: HashMap::new(),
                hits: 0,
                misses: 0,
            }),
            default_ttl: config.ttl,
        }
    }

    /// TTL applied by [`ResultCache::put`]
    #[must_use]
    pub const fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Current invalidation generation of `user`
    ///
    /// Read before fetching source data and hand it to `put_serialized`.
    pub async fn generation(&self, user: &str) -> u64 {
        self.state.lock().await.generation(user)
    }

    /// Fetch a result if its expiry is strictly in the future
    pub async fn get(
        &self,
        user: &str,
        analysis_type: AnalysisType,
        window_days: u32,
    ) -> Option<CachedAnalysis> {
        let key = AnalysisKey::new(user, analysis_type, window_days);
        let now = Utc::now();
        let mut state = self.state.lock().await;

        let cached = state
            .entries
            .get(&key)
            .filter(|entry| entry.is_fresh(now))
            .map(CacheEntry::to_cached);

        if cached.is_some() {
            state.hits += 1;
        } else {
            state.misses += 1;
        }
        drop(state);

        debug!(key = %key, hit = cached.is_some(), "Result cache lookup");
        cached
    }

    /// Whether a fresh entry exists, without touching recency or hit counters
    pub async fn contains_fresh(
        &self,
        user: &str,
        analysis_type: AnalysisType,
        window_days: u32,
    ) -> bool {
        let key = AnalysisKey::new(user, analysis_type, window_days);
        let now = Utc::now();
        self.state
            .lock()
            .await
            .entries
            .peek(&key)
            .is_some_and(|entry| entry.is_fresh(now))
    }

    /// Fetch and deserialize a result; an undecodable payload counts as a miss
    pub async fn get_as<T: DeserializeOwned>(
        &self,
        user: &str,
        analysis_type: AnalysisType,
        window_days: u32,
    ) -> Option<T> {
        let cached = self.get(user, analysis_type, window_days).await?;
        match serde_json::from_value(cached.payload) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(
                    user = %user,
                    analysis_type = %analysis_type,
                    window_days,
                    error = %e,
                    "Cached payload could not be decoded, recomputing"
                );
                None
            }
        }
    }

    /// Store a result with the default TTL, replacing any previous entry
    pub async fn put(
        &self,
        user: &str,
        analysis_type: AnalysisType,
        window_days: u32,
        payload: Value,
        confidence_level: f64,
    ) {
        self.put_with_ttl(
            user,
            analysis_type,
            window_days,
            payload,
            confidence_level,
            self.default_ttl,
        )
        .await;
    }

    /// Store a result with an explicit TTL, replacing any previous entry
    pub async fn put_with_ttl(
        &self,
        user: &str,
        analysis_type: AnalysisType,
        window_days: u32,
        payload: Value,
        confidence_level: f64,
        ttl: Duration,
    ) {
        let key = AnalysisKey::new(user, analysis_type, window_days);
        let entry = CacheEntry::new(payload, confidence_level, ttl);
        let mut state = self.state.lock().await;
        Self::insert(&mut state, key, entry);
    }

    /// Serialize and store a result with the default TTL, unless `user` was
    /// invalidated after `generation` was read
    ///
    /// Returns whether the result was stored.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if `value` cannot be converted to JSON
    pub async fn put_serialized<T: Serialize + Sync>(
        &self,
        user: &str,
        analysis_type: AnalysisType,
        window_days: u32,
        value: &T,
        confidence_level: f64,
        generation: u64,
    ) -> AppResult<bool> {
        let payload = serde_json::to_value(value)?;
        let key = AnalysisKey::new(user, analysis_type, window_days);
        let entry = CacheEntry::new(payload, confidence_level, self.default_ttl);

        let mut state = self.state.lock().await;
        let current = state.generation(user);
        if current != generation {
            drop(state);
            debug!(
                key = %key,
                computed_at = generation,
                current,
                "Data changed during computation, result not cached"
            );
            return Ok(false);
        }
        Self::insert(&mut state, key, entry);
        Ok(true)
    }

    fn insert(state: &mut CacheState, key: AnalysisKey, entry: CacheEntry) {
        let evicted = state.entries.push(key.clone(), entry);
        if let Some((evicted_key, _)) = evicted.filter(|(evicted_key, _)| *evicted_key != key) {
            debug!(key = %evicted_key, "Result cache full, evicted least recently used entry");
        }
    }

    /// Delete every entry of `user`, optionally only for the given analysis types
    ///
    /// Always advances the user's generation. Returns the number of entries removed.
    pub async fn invalidate(&self, user: &str, analysis_types: Option<&[AnalysisType]>) -> usize {
        let mut state = self.state.lock().await;
        *state.generations.entry(user.to_owned()).or_default() += 1;

        let doomed: Vec<AnalysisKey> = state
            .entries
            .iter()
            .filter(|(key, _)| key.user == user)
            .filter(|(key, _)| match analysis_types {
                Some(types) => types.contains(&key.analysis_type),
                None => true,
            })
            .map(|(key, _)| key.clone())
            .collect();

        for key in &doomed {
            state.entries.pop(key);
        }
        drop(state);

        if !doomed.is_empty() {
            debug!(user = %user, removed = doomed.len(), "Invalidated cached analyses");
        }
        doomed.len()
    }

    /// Invalidate the analyses that depend on a freshly written kind of raw data
    pub async fn on_raw_data_written(&self, user: &str, kind: RawDataKind) -> usize {
        let removed = self
            .invalidate(user, Some(kind.affected_analysis_types()))
            .await;
        debug!(user = %user, kind = %kind, removed, "Raw data written");
        removed
    }

    /// Remove every entry whose expiry has passed, returning how many were removed
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut state = self.state.lock().await;

        let expired: Vec<AnalysisKey> = state
            .entries
            .iter()
            .filter(|(_, entry)| !entry.is_fresh(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            state.entries.pop(key);
        }
        drop(state);

        if !expired.is_empty() {
            debug!("Purged {} expired cache entries", expired.len());
        }
        expired.len()
    }

    /// Aggregate counts for observability
    pub async fn stats(&self) -> CacheStats {
        let now = Utc::now();
        let state = self.state.lock().await;

        let total_entries = state.entries.len();
        let mut entries_by_type: BTreeMap<String, usize> = BTreeMap::new();
        let mut confidence_sums: BTreeMap<String, f64> = BTreeMap::new();

        for (key, entry) in state.entries.iter().filter(|(_, e)| e.is_fresh(now)) {
            let name = key.analysis_type.as_str();
            *entries_by_type.entry(name.to_owned()).or_default() += 1;
            *confidence_sums.entry(name.to_owned()).or_default() += entry.confidence_level;
        }
        let (hits, misses) = (state.hits, state.misses);
        drop(state);

        let active_entries: usize = entries_by_type.values().sum();
        let avg_confidence_by_type = confidence_sums
            .into_iter()
            .map(|(name, sum)| {
                let count = entries_by_type.get(&name).copied().unwrap_or(1).max(1);
                (name, sum / count as f64)
            })
            .collect();

        CacheStats {
            total_entries,
            expired_entries: total_entries - active_entries,
            active_entries,
            entries_by_type,
            avg_confidence_by_type,
            cache_hit_potential: round2(
                active_entries as f64 / total_entries.max(1) as f64 * 100.0,
            ),
            hits,
            misses,
        }
    }
}

fn expiry_after(created_at: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    TimeDelta::from_std(ttl)
        .ok()
        .and_then(|delta| created_at.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cache() -> ResultCache {
        ResultCache::new(&ResultCacheConfig::default())
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let cache = cache();
        cache
            .put("a@x.com", AnalysisType::WeightTrends, 30, json!({"slope": 0.1}), 0.8)
            .await;

        let hit = cache.get("a@x.com", AnalysisType::WeightTrends, 30).await.unwrap();
        assert_eq!(hit.payload, json!({"slope": 0.1}));
        assert!((hit.confidence_level - 0.8).abs() < f64::EPSILON);
        assert!(hit.expires_at > hit.created_at);

        assert!(cache.get("a@x.com", AnalysisType::WeightTrends, 14).await.is_none());
    }

    #[tokio::test]
    async fn test_put_overwrites_same_key() {
        let cache = cache();
        cache
            .put("a@x.com", AnalysisType::MacroPatterns, 30, json!(1), 0.2)
            .await;
        cache
            .put("a@x.com", AnalysisType::MacroPatterns, 30, json!(2), 0.4)
            .await;

        let hit = cache.get("a@x.com", AnalysisType::MacroPatterns, 30).await.unwrap();
        assert_eq!(hit.payload, json!(2));
        assert_eq!(cache.stats().await.total_entries, 1);
    }

    #[tokio::test]
    async fn test_zero_ttl_is_never_served_but_kept_until_purge() {
        let cache = cache();
        cache
            .put_with_ttl(
                "a@x.com",
                AnalysisType::WeightTrends,
                30,
                json!({}),
                0.5,
                Duration::ZERO,
            )
            .await;

        assert!(cache.get("a@x.com", AnalysisType::WeightTrends, 30).await.is_none());
        let stats = cache.stats().await;
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.expired_entries, 1);

        assert_eq!(cache.purge_expired().await, 1);
        assert_eq!(cache.stats().await.total_entries, 0);
    }

    #[tokio::test]
    async fn test_lru_eviction_at_capacity() {
        let cache = ResultCache::new(&ResultCacheConfig {
            max_entries: 2,
            ..ResultCacheConfig::default()
        });
        for window in [7, 14, 30] {
            cache
                .put("a@x.com", AnalysisType::WeightTrends, window, json!(window), 0.5)
                .await;
        }

        assert!(cache.get("a@x.com", AnalysisType::WeightTrends, 7).await.is_none());
        assert!(cache.get("a@x.com", AnalysisType::WeightTrends, 30).await.is_some());
    }

    #[tokio::test]
    async fn test_put_after_invalidation_is_rejected() {
        let cache = cache();
        let before = cache.generation("a@x.com").await;
        cache
            .on_raw_data_written("a@x.com", RawDataKind::Workout)
            .await;
        assert_eq!(cache.generation("a@x.com").await, before + 1);
        assert_eq!(cache.generation("b@x.com").await, 0);

        let stored = cache
            .put_serialized("a@x.com", AnalysisType::WeightTrends, 30, &1.5, 0.5, before)
            .await
            .unwrap();
        assert!(!stored);
        assert!(cache.get("a@x.com", AnalysisType::WeightTrends, 30).await.is_none());

        let current = cache.generation("a@x.com").await;
        let stored = cache
            .put_serialized("a@x.com", AnalysisType::WeightTrends, 30, &1.5, 0.5, current)
            .await
            .unwrap();
        assert!(stored);
        assert!(cache.get("a@x.com", AnalysisType::WeightTrends, 30).await.is_some());
    }

    #[tokio::test]
    async fn test_undecodable_payload_is_a_miss() {
        let cache = cache();
        cache
            .put("a@x.com", AnalysisType::WeightTrends, 30, json!("not a number"), 0.5)
            .await;

        let decoded: Option<f64> = cache.get_as("a@x.com", AnalysisType::WeightTrends, 30).await;
        assert!(decoded.is_none());
    }
}
