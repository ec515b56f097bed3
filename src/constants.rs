// ABOUTME: Constants re-exported from ascend-core
// ABOUTME: Analysis thresholds, cache defaults, task pool sizing and service names
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ascend Analytics Contributors

pub use ascend_core::constants::{analytics, cache, service_names, tasks, time};
