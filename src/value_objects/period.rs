// Copyright 2025 Cowboy AI, LLC.

//! Year/month durations

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::errors::{FinanceError, FinanceResult};

/// A duration of whole years and months, months always in [0, 11].
///
/// Ordering compares total months.
///
/// ```rust
/// use finplan_domain::Period;
///
/// let period = Period::new(0, 15).unwrap();
/// assert_eq!((period.years(), period.months()), (1, 3));
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, JsonSchema,
)]
pub struct Period {
    years: u32,
    months: u32,
}

#[derive(Deserialize)]
struct PeriodRecord {
    years: i64,
    months: i64,
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = PeriodRecord::deserialize(deserializer)?;
        Period::new(record.years, record.months).map_err(serde::de::Error::custom)
    }
}

impl Period {
    /// Create a period, folding surplus months into years
    pub fn new(years: i64, months: i64) -> FinanceResult<Self> {
        if years < 0 {
            return Err(FinanceError::InvalidPeriod(format!(
                "years cannot be negative, got {years}"
            )));
        }
        if months < 0 {
            return Err(FinanceError::InvalidPeriod(format!(
                "months cannot be negative, got {months}"
            )));
        }

        let total_years = years
            .checked_add(months / 12)
            .and_then(|y| u32::try_from(y).ok())
            .ok_or_else(|| FinanceError::InvalidPeriod("period is too long".to_string()))?;

        Ok(Self {
            years: total_years,
            months: (months % 12) as u32,
        })
    }

    /// Whole years only
    pub fn from_years(years: i64) -> FinanceResult<Self> {
        Self::new(years, 0)
    }

    /// Total months, normalized
    pub fn from_months(months: i64) -> FinanceResult<Self> {
        Self::new(0, months)
    }

    /// Fractional years rounded to the nearest month
    pub fn from_fractional_years(years: f64) -> FinanceResult<Self> {
        if !years.is_finite() {
            return Err(FinanceError::InvalidPeriod(format!(
                "years must be finite, got {years}"
            )));
        }
        if years < 0.0 {
            return Err(FinanceError::InvalidPeriod(format!(
                "years cannot be negative, got {years}"
            )));
        }
        Self::from_months((years * 12.0).round() as i64)
    }

    /// Year component
    pub fn years(&self) -> u32 {
        self.years
    }

    /// Month component, in [0, 11]
    pub fn months(&self) -> u32 {
        self.months
    }

    /// Whole period in months
    pub fn to_months(&self) -> i64 {
        i64::from(self.years) * 12 + i64::from(self.months)
    }

    /// Whole period in (fractional) years
    pub fn to_years(&self) -> f64 {
        f64::from(self.years) + f64::from(self.months) / 12.0
    }

    /// Sum of two periods
    pub fn add(&self, other: Period) -> FinanceResult<Period> {
        Period::from_months(self.to_months() + other.to_months())
    }

    /// Difference of two periods; fails if `other` is longer
    pub fn subtract(&self, other: Period) -> FinanceResult<Period> {
        let total = self.to_months() - other.to_months();
        if total < 0 {
            return Err(FinanceError::InvalidPeriod(format!(
                "cannot subtract {other} from {self}"
            )));
        }
        Period::from_months(total)
    }

    /// Scale the period, rounding to the nearest month
    pub fn multiply(&self, factor: f64) -> FinanceResult<Period> {
        if !factor.is_finite() {
            return Err(FinanceError::InvalidPeriod(format!(
                "factor must be finite, got {factor}"
            )));
        }
        if factor < 0.0 {
            return Err(FinanceError::InvalidPeriod(format!(
                "factor cannot be negative, got {factor}"
            )));
        }
        Period::from_months((self.to_months() as f64 * factor).round() as i64)
    }

    /// Extend by a number of months
    pub fn add_months(&self, months: i64) -> FinanceResult<Period> {
        if months < 0 {
            return Err(FinanceError::InvalidPeriod(format!(
                "months to add cannot be negative, got {months}"
            )));
        }
        Period::new(i64::from(self.years), i64::from(self.months) + months)
    }

    /// Extend by a number of years
    pub fn add_years(&self, years: i64) -> FinanceResult<Period> {
        if years < 0 {
            return Err(FinanceError::InvalidPeriod(format!(
                "years to add cannot be negative, got {years}"
            )));
        }
        Period::new(i64::from(self.years) + years, i64::from(self.months))
    }

    /// No years and no months
    pub fn is_zero(&self) -> bool {
        self.years == 0 && self.months == 0
    }

    /// At least one month long
    pub fn is_positive(&self) -> bool {
        !self.is_zero()
    }

    /// Months left to complete the current year; zero on a year boundary
    pub fn remaining_months_in_year(&self) -> u32 {
        if self.months == 0 {
            0
        } else {
            12 - self.months
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.years, self.months) {
            (0, m) => write!(f, "{m}ヶ月"),
            (y, 0) => write!(f, "{y}年"),
            (y, m) => write!(f, "{y}年{m}ヶ月"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn period(y: i64, m: i64) -> Period {
        Period::new(y, m).unwrap()
    }

    #[test_case(0, 15, 1, 3 ; "months fold into years")]
    #[test_case(2, 24, 4, 0 ; "exact years")]
    #[test_case(1, 11, 1, 11 ; "already normalized")]
    fn normalizes(y: i64, m: i64, ey: u32, em: u32) {
        let p = period(y, m);
        assert_eq!((p.years(), p.months()), (ey, em));
    }

    #[test]
    fn negative_components_are_rejected() {
        assert!(Period::new(-1, 0).is_err());
        assert!(Period::new(0, -1).is_err());
        assert!(Period::from_fractional_years(-0.5).is_err());
        assert!(Period::from_fractional_years(f64::NAN).is_err());
    }

    #[test]
    fn conversions() {
        let p = period(2, 6);
        assert_eq!(p.to_months(), 30);
        assert_eq!(p.to_years(), 2.5);
        assert_eq!(Period::from_fractional_years(1.26).unwrap(), period(1, 3));
        assert_eq!(Period::from_months(27).unwrap(), period(2, 3));
    }

    #[test]
    fn arithmetic() {
        assert_eq!(period(1, 8).add(period(0, 7)).unwrap(), period(2, 3));
        assert_eq!(period(2, 0).subtract(period(0, 1)).unwrap(), period(1, 11));
        assert!(period(0, 1).subtract(period(0, 2)).is_err());
        assert_eq!(period(1, 0).multiply(1.5).unwrap(), period(1, 6));
        assert!(period(1, 0).multiply(-2.0).is_err());
        assert!(period(1, 0).multiply(f64::INFINITY).is_err());
        assert_eq!(period(1, 10).add_months(3).unwrap(), period(2, 1));
        assert_eq!(period(1, 10).add_years(2).unwrap(), period(3, 10));
        assert!(period(1, 0).add_months(-1).is_err());
    }

    #[test]
    fn ordering_uses_total_months() {
        assert!(period(1, 0) > period(0, 11));
        assert!(period(0, 3) < period(0, 4));
        assert_eq!(period(0, 12), period(1, 0));
    }

    #[test]
    fn predicates() {
        assert!(Period::default().is_zero());
        assert!(period(0, 1).is_positive());
        assert_eq!(period(1, 3).remaining_months_in_year(), 9);
        assert_eq!(period(2, 0).remaining_months_in_year(), 0);
    }

    #[test_case(0, 0, "0ヶ月" ; "zero")]
    #[test_case(0, 3, "3ヶ月" ; "months only")]
    #[test_case(2, 0, "2年" ; "years only")]
    #[test_case(1, 3, "1年3ヶ月" ; "years and months")]
    fn display(y: i64, m: i64, expected: &str) {
        assert_eq!(period(y, m).to_string(), expected);
    }

    #[test]
    fn serde_normalizes_on_read() {
        let p: Period = serde_json::from_str(r#"{"years":0,"months":15}"#).unwrap();
        assert_eq!(p, period(1, 3));
        assert!(serde_json::from_str::<Period>(r#"{"years":-1,"months":0}"#).is_err());
    }
}
