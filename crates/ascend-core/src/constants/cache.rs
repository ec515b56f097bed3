// ABOUTME: Result cache constants for TTL, capacity, and purge cadence
// ABOUTME: Defaults for the in-process analysis cache
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ascend Analytics Contributors

/// Default analysis result TTL (24 hours)
pub const DEFAULT_RESULT_TTL_HOURS: u64 = 24;

/// Default maximum cache entries
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 10_000;

/// Default purge interval for expired entries in seconds
pub const DEFAULT_PURGE_INTERVAL_SECS: u64 = 3_600; // 1 hour
