// Copyright 2025 Cowboy AI, LLC.

//! Percentage rates (returns, inflation, progress)

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::errors::{FinanceError, FinanceResult};

/// Rates closer than this many percentage points are equal
const RATE_TOLERANCE: f64 = 0.0001;

/// A percentage in [0, 100], stored rounded to four decimals.
///
/// A 5% rate is stored as `5.0`; [`Rate::as_decimal`] yields `0.05`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, JsonSchema)]
#[serde(transparent)]
pub struct Rate {
    value: f64,
}

impl<'de> Deserialize<'de> for Rate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let percentage = f64::deserialize(deserializer)?;
        Rate::from_percentage(percentage).map_err(serde::de::Error::custom)
    }
}

impl Rate {
    /// Create a rate from a percentage (5.0 for 5%)
    pub fn from_percentage(percentage: f64) -> FinanceResult<Self> {
        if !percentage.is_finite() {
            return Err(FinanceError::InvalidRate(format!(
                "rate must be finite, got {percentage}"
            )));
        }
        if percentage < 0.0 {
            return Err(FinanceError::InvalidRate(format!(
                "rate cannot be negative, got {percentage}"
            )));
        }
        if percentage > 100.0 {
            return Err(FinanceError::InvalidRate(format!(
                "rate cannot exceed 100%, got {percentage}"
            )));
        }

        Ok(Self {
            value: (percentage * 10_000.0).round() / 10_000.0,
        })
    }

    /// Create a rate from a decimal fraction (0.05 for 5%)
    pub fn from_decimal(decimal: f64) -> FinanceResult<Self> {
        Self::from_percentage(decimal * 100.0)
    }

    /// The zero rate
    pub fn zero() -> Self {
        Self { value: 0.0 }
    }

    /// Rate as a decimal fraction
    pub fn as_decimal(&self) -> f64 {
        self.value / 100.0
    }

    /// Rate as a percentage
    pub fn as_percentage(&self) -> f64 {
        self.value
    }

    /// Below 0.0001 percentage points
    pub fn is_zero(&self) -> bool {
        self.value.abs() < RATE_TOLERANCE
    }

    /// Sum of two rates; fails above 100%
    pub fn add(&self, other: Rate) -> FinanceResult<Rate> {
        Rate::from_percentage(self.value + other.value)
    }

    /// Difference of two rates; fails below 0%
    pub fn subtract(&self, other: Rate) -> FinanceResult<Rate> {
        Rate::from_percentage(self.value - other.value)
    }

    /// Scale the rate by a non-negative factor
    pub fn multiply(&self, factor: f64) -> FinanceResult<Rate> {
        if !factor.is_finite() {
            return Err(FinanceError::InvalidRate(format!(
                "factor must be finite, got {factor}"
            )));
        }
        if factor < 0.0 {
            return Err(FinanceError::InvalidRate(format!(
                "factor cannot be negative, got {factor}"
            )));
        }
        Rate::from_percentage(self.value * factor)
    }

    /// Strictly greater
    pub fn greater_than(&self, other: Rate) -> bool {
        self.value > other.value
    }

    /// Strictly less
    pub fn less_than(&self, other: Rate) -> bool {
        self.value < other.value
    }

    /// Equal within 0.0001 percentage points
    pub fn approx_eq(&self, other: Rate) -> bool {
        (self.value - other.value).abs() < RATE_TOLERANCE
    }

    /// Growth factor `(1 + r)^periods`.
    ///
    /// Returns 1.0 for zero periods and 0.0 for negative periods.
    pub fn compound_factor(&self, periods: i32) -> f64 {
        if periods < 0 {
            return 0.0;
        }
        if periods == 0 {
            return 1.0;
        }
        (1.0 + self.as_decimal()).powi(periods)
    }

    /// Monthly rate with the same annual compounded growth: `(1 + r)^(1/12) - 1`
    pub fn monthly_rate(&self) -> FinanceResult<Rate> {
        let monthly = (1.0 + self.as_decimal()).powf(1.0 / 12.0) - 1.0;
        Rate::from_decimal(monthly)
    }

    /// Annual rate from a monthly rate: `(1 + m)^12 - 1`
    pub fn annual_rate(&self) -> FinanceResult<Rate> {
        let annual = (1.0 + self.as_decimal()).powi(12) - 1.0;
        Rate::from_decimal(annual)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}%", self.value)
    }
}
