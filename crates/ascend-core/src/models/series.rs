// ABOUTME: Series record types with date keys and per-macro accessors
// ABOUTME: Includes the merged nutrition/performance row produced by date alignment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ascend Analytics Contributors

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single dated measurement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    /// Calendar date of the measurement
    pub date: NaiveDate,
    /// Measured value
    pub value: f64,
}

impl DataPoint {
    /// Create a new data point
    #[must_use]
    pub const fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Macro nutrients tracked per day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Macro {
    /// Energy intake (kcal)
    Calories,
    /// Protein (g)
    Protein,
    /// Carbohydrates (g)
    Carbs,
    /// Fat (g)
    Fat,
}

impl Macro {
    /// Every tracked macro in reporting order
    pub const ALL: [Self; 4] = [Self::Calories, Self::Protein, Self::Carbs, Self::Fat];

    /// Stable lowercase name used in report keys
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Calories => "calories",
            Self::Protein => "protein",
            Self::Carbs => "carbs",
            Self::Fat => "fat",
        }
    }
}

impl fmt::Display for Macro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregated macro totals for one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroSample {
    /// Calendar date
    pub date: NaiveDate,
    /// Total calories
    pub calories: f64,
    /// Total protein
    pub protein: f64,
    /// Total carbohydrates
    pub carbs: f64,
    /// Total fat
    pub fat: f64,
}

impl MacroSample {
    /// Build a daily macro total
    #[must_use]
    pub const fn new(date: NaiveDate, calories: f64, protein: f64, carbs: f64, fat: f64) -> Self {
        Self {
            date,
            calories,
            protein,
            carbs,
            fat,
        }
    }

    /// Value of a single macro
    #[must_use]
    pub const fn get(&self, nutrient: Macro) -> f64 {
        match nutrient {
            Macro::Calories => self.calories,
            Macro::Protein => self.protein,
            Macro::Carbs => self.carbs,
            Macro::Fat => self.fat,
        }
    }

    /// Project one macro of a macro series into a plain data series
    #[must_use]
    pub fn series(samples: &[Self], nutrient: Macro) -> Vec<DataPoint> {
        samples
            .iter()
            .map(|sample| DataPoint::new(sample.date, sample.get(nutrient)))
            .collect()
    }
}

/// Training performance summary for one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSample {
    /// Calendar date
    pub date: NaiveDate,
    /// Total training volume (sets × reps × load)
    pub total_volume: f64,
    /// Estimated one-rep max, when the session allowed an estimate
    pub estimated_1rm: Option<f64>,
}

impl PerformanceSample {
    /// Build a daily performance summary
    #[must_use]
    pub const fn new(date: NaiveDate, total_volume: f64, estimated_1rm: Option<f64>) -> Self {
        Self {
            date,
            total_volume,
            estimated_1rm,
        }
    }

    /// Project total volume into a plain data series
    #[must_use]
    pub fn volume_series(samples: &[Self]) -> Vec<DataPoint> {
        samples
            .iter()
            .map(|sample| DataPoint::new(sample.date, sample.total_volume))
            .collect()
    }

    /// Project the estimated one-rep max into a data series, skipping days without an estimate
    #[must_use]
    pub fn estimated_1rm_series(samples: &[Self]) -> Vec<DataPoint> {
        samples
            .iter()
            .filter_map(|sample| {
                sample
                    .estimated_1rm
                    .filter(|value| *value != 0.0)
                    .map(|value| DataPoint::new(sample.date, value))
            })
            .collect()
    }
}

/// Nutrition and performance values observed on the same date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignedDataPoint {
    /// Shared calendar date
    pub date: NaiveDate,
    /// Total calories
    pub calories: f64,
    /// Total protein
    pub protein: f64,
    /// Total carbohydrates
    pub carbs: f64,
    /// Total fat
    pub fat: f64,
    /// Total training volume
    pub total_volume: f64,
    /// Estimated one-rep max
    pub estimated_1rm: Option<f64>,
}

impl AlignedDataPoint {
    /// Merge a macro sample and a performance sample observed on the same date
    #[must_use]
    pub const fn merge(nutrition: &MacroSample, performance: &PerformanceSample) -> Self {
        Self {
            date: nutrition.date,
            calories: nutrition.calories,
            protein: nutrition.protein,
            carbs: nutrition.carbs,
            fat: nutrition.fat,
            total_volume: performance.total_volume,
            estimated_1rm: performance.estimated_1rm,
        }
    }

    /// Value of a single macro
    #[must_use]
    pub const fn macro_value(&self, nutrient: Macro) -> f64 {
        match nutrient {
            Macro::Calories => self.calories,
            Macro::Protein => self.protein,
            Macro::Carbs => self.carbs,
            Macro::Fat => self.fat,
        }
    }

    /// Whether this row carries a usable one-rep-max estimate
    #[must_use]
    pub fn has_estimated_1rm(&self) -> bool {
        self.estimated_1rm.is_some_and(|value| value != 0.0)
    }
}
