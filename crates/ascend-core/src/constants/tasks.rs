// ABOUTME: Background task scheduler constants for worker pool and cleanup sweeps
// ABOUTME: Defaults for the bounded analysis worker pool
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ascend Analytics Contributors

/// Default number of concurrently executing analyses
pub const DEFAULT_TASK_WORKERS: usize = 2;

/// Default interval between finished-task cleanup sweeps in seconds
pub const DEFAULT_TASK_CLEANUP_INTERVAL_SECS: u64 = 3_600; // 1 hour

/// Default retention for finished task outcomes in seconds
pub const DEFAULT_TASK_RESULT_RETENTION_SECS: u64 = 86_400; // 24 hours

/// Retry interval after a failed sweep iteration in seconds
pub const DEFAULT_SWEEP_RETRY_SECS: u64 = 300; // 5 minutes
