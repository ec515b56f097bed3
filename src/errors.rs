// ABOUTME: Error types re-exported from ascend-core for crate-local use
// ABOUTME: Keeps `crate::errors::AppError` paths stable across the analytics modules
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ascend Analytics Contributors

//! Unified error handling, defined in `ascend-core`

pub use ascend_core::errors::{AppError, AppResult, ErrorCode, ErrorContext};
