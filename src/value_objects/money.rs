// Copyright 2025 Cowboy AI, LLC.

//! Currency-tagged monetary amounts

use schemars::gen::SchemaGenerator;
use schemars::schema::Schema;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Cow;
use std::fmt;

use super::Rate;
use crate::errors::{FinanceError, FinanceResult};

/// Amounts closer to zero than one minor unit count as zero
const ZERO_TOLERANCE: f64 = 0.01;

/// Round to two decimal places, half away from zero
pub(crate) fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Currency code attached to every amount
///
/// The code is never empty. Two amounts can only be combined when their
/// codes are identical.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Currency(Cow<'static, str>);

impl Currency {
    /// Japanese yen
    pub const JPY: Currency = Currency(Cow::Borrowed("JPY"));
    /// US dollar
    pub const USD: Currency = Currency(Cow::Borrowed("USD"));
    /// Euro
    pub const EUR: Currency = Currency(Cow::Borrowed("EUR"));

    /// Create a currency from its code
    pub fn new(code: impl Into<String>) -> FinanceResult<Self> {
        let code = code.into();
        if code.trim().is_empty() {
            return Err(FinanceError::InvalidAmount(
                "currency code cannot be empty".to_string(),
            ));
        }
        Ok(Self(Cow::Owned(code)))
    }

    /// The currency code
    pub fn code(&self) -> &str {
        &self.0
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::JPY
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Currency {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Currency::new(code).map_err(serde::de::Error::custom)
    }
}

impl JsonSchema for Currency {
    fn schema_name() -> String {
        "Currency".to_string()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        let mut schema = String::json_schema(gen).into_object();
        schema.string().min_length = Some(1);
        schema.into()
    }
}

/// Money as an immutable value object: amount rounded to cents + currency.
///
/// Every constructor and operation rounds its result to two decimals, which
/// bounds floating-point drift across long compounding loops.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct Money {
    amount: f64,
    currency: Currency,
}

#[derive(Deserialize)]
struct MoneyRecord {
    amount: f64,
    currency: Currency,
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = MoneyRecord::deserialize(deserializer)?;
        Money::new(record.amount, record.currency).map_err(serde::de::Error::custom)
    }
}

impl Money {
    /// Create an amount, rejecting NaN and infinities
    pub fn new(amount: f64, currency: Currency) -> FinanceResult<Self> {
        if !amount.is_finite() {
            return Err(FinanceError::InvalidAmount(format!(
                "amount must be finite, got {amount}"
            )));
        }

        let rounded = round_to_cents(amount);
        if !rounded.is_finite() {
            return Err(FinanceError::InvalidAmount(format!(
                "amount {amount} is out of range"
            )));
        }

        Ok(Self {
            amount: rounded,
            currency,
        })
    }

    /// Create an amount in Japanese yen
    pub fn jpy(amount: f64) -> FinanceResult<Self> {
        Self::new(amount, Currency::JPY)
    }

    /// Zero in the given currency
    pub fn zero(currency: Currency) -> Self {
        Self {
            amount: 0.0,
            currency,
        }
    }

    /// The rounded amount
    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// The currency
    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub(crate) fn ensure_same_currency(
        &self,
        other: &Money,
        operation: &'static str,
    ) -> FinanceResult<()> {
        if self.currency != other.currency {
            return Err(FinanceError::CurrencyMismatch {
                operation,
                left: self.currency.to_string(),
                right: other.currency.to_string(),
            });
        }
        Ok(())
    }

    /// Add an amount of the same currency
    pub fn add(&self, other: &Money) -> FinanceResult<Money> {
        self.ensure_same_currency(other, "add")?;
        Money::new(self.amount + other.amount, self.currency.clone())
    }

    /// Subtract an amount of the same currency
    pub fn subtract(&self, other: &Money) -> FinanceResult<Money> {
        self.ensure_same_currency(other, "subtract")?;
        Money::new(self.amount - other.amount, self.currency.clone())
    }

    /// Multiply by a rate taken as a decimal fraction (5% multiplies by 0.05)
    pub fn multiply(&self, rate: Rate) -> FinanceResult<Money> {
        Money::new(self.amount * rate.as_decimal(), self.currency.clone())
    }

    /// Multiply by a plain scalar
    pub fn multiply_by(&self, factor: f64) -> FinanceResult<Money> {
        if !factor.is_finite() {
            return Err(FinanceError::InvalidAmount(format!(
                "multiplier must be finite, got {factor}"
            )));
        }
        Money::new(self.amount * factor, self.currency.clone())
    }

    /// Strictly above zero
    pub fn is_positive(&self) -> bool {
        self.amount > 0.0
    }

    /// Strictly below zero
    pub fn is_negative(&self) -> bool {
        self.amount < 0.0
    }

    /// Less than one minor unit away from zero
    pub fn is_zero(&self) -> bool {
        self.amount.abs() < ZERO_TOLERANCE
    }

    /// Compare amounts of the same currency
    pub fn greater_than(&self, other: &Money) -> FinanceResult<bool> {
        self.ensure_same_currency(other, "compare")?;
        Ok(self.amount > other.amount)
    }

    /// Compare amounts of the same currency
    pub fn less_than(&self, other: &Money) -> FinanceResult<bool> {
        self.ensure_same_currency(other, "compare")?;
        Ok(self.amount < other.amount)
    }

    /// Equality within one minor unit, same currency only
    pub fn equals(&self, other: &Money) -> FinanceResult<bool> {
        self.ensure_same_currency(other, "compare")?;
        Ok((self.amount - other.amount).abs() < ZERO_TOLERANCE)
    }

    /// Absolute value
    pub fn abs(&self) -> Money {
        Money {
            amount: self.amount.abs(),
            currency: self.currency.clone(),
        }
    }

    /// `self` if positive, otherwise zero in the same currency
    pub(crate) fn clamp_non_negative(self) -> Money {
        if self.is_negative() {
            Money::zero(self.currency)
        } else {
            self
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.amount, self.currency)
    }
}
