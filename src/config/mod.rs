// ABOUTME: Configuration management module for the analytics engine
// ABOUTME: Cache, task pool and sweep settings loaded from the environment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ascend Analytics Contributors

//! Configuration module for Ascend Analytics
//!
//! - **Environment**: `AnalyticsConfig` loaded from `ASCEND_*` variables

/// Environment-driven analytics configuration
pub mod environment;

pub use environment::{AnalyticsConfig, CacheSettings, SweepSettings, TaskSettings};
