// ABOUTME: Maps raw data writes to the cached analysis types they make stale
// ABOUTME: Weight, food and workout writes each invalidate a fixed set of analyses
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ascend Analytics Contributors

use super::AnalysisType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of raw record written by the persistence layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawDataKind {
    /// Body weight entry
    Weight,
    /// Food log entry (contributes to daily macro totals)
    Food,
    /// Workout or exercise log
    Workout,
}

impl RawDataKind {
    /// Analysis types whose cached results depend on this kind of data
    #[must_use]
    pub const fn affected_analysis_types(self) -> &'static [AnalysisType] {
        match self {
            Self::Weight => &[
                AnalysisType::WeightTrends,
                AnalysisType::MacroPatterns,
                AnalysisType::MultiWindowTrends,
            ],
            Self::Food => &[
                AnalysisType::MacroPatterns,
                AnalysisType::MultiWindowTrends,
                AnalysisType::ComprehensiveCorrelation,
            ],
            Self::Workout => &[
                AnalysisType::ComprehensiveCorrelation,
                AnalysisType::PerformanceModel,
            ],
        }
    }
}

impl fmt::Display for RawDataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Weight => f.write_str("weight"),
            Self::Food => f.write_str("food"),
            Self::Workout => f.write_str("workout"),
        }
    }
}
