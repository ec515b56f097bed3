// ABOUTME: Core types and constants for the Ascend training analytics platform
// ABOUTME: Foundation crate with error handling, analysis thresholds, and raw series models
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ascend Analytics Contributors

#![deny(unsafe_code)]

//! # Ascend Core
//!
//! Foundation crate providing shared types and constants for the Ascend
//! training analytics engine. This crate is designed to change infrequently,
//! enabling incremental compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **constants**: Analysis thresholds, cache TTLs, and scheduling defaults
//! - **models**: Raw time-series records supplied by the persistence layer

/// Unified error handling system with standard error codes
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Raw time-series data models (weight, macros, performance)
pub mod models;
