// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Pure data constants for analysis thresholds, caching, and background scheduling
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ascend Analytics Contributors

//! Constants module
//!
//! Constants are grouped into logical domains rather than being in a single large file.

/// Statistical thresholds and minimum-sample gates
pub mod analytics;
/// Result cache TTL and capacity defaults
pub mod cache;
/// Background task pool and sweep defaults
pub mod tasks;

/// Service names used in structured logs
pub mod service_names {
    /// Analytics engine service name
    pub const ASCEND_ANALYTICS: &str = "ascend-analytics";
}

/// Time conversion helpers
pub mod time {
    /// Seconds in one hour
    pub const HOUR_SECONDS: u64 = 3_600;
    /// Seconds in one day
    pub const DAY_SECONDS: u64 = 86_400;
}
