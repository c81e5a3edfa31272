// Copyright 2025 Cowboy AI, LLC.

//! Emergency reserve configuration and status

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

use crate::config::{PlanningPolicy, MAX_EMERGENCY_MONTHS};
use crate::errors::{FinanceError, FinanceResult};
use crate::value_objects::{Currency, Money};

/// How many months of expenses to hold in reserve, and how much is held.
///
/// Deserialization has no policy at hand, so it checks against
/// [`MAX_EMERGENCY_MONTHS`], the ceiling every valid [`PlanningPolicy`]
/// stays within. [`FinancialPlan::restore`](crate::FinancialPlan::restore)
/// re-checks the plan's own, possibly tighter, limit.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct EmergencyFundConfig {
    target_months: u32,
    current_fund: Money,
}

#[derive(Deserialize)]
struct EmergencyFundRecord {
    target_months: u32,
    current_fund: Money,
}

impl<'de> Deserialize<'de> for EmergencyFundConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = EmergencyFundRecord::deserialize(deserializer)?;
        EmergencyFundConfig::new(record.target_months, record.current_fund)
            .map_err(serde::de::Error::custom)
    }
}

impl EmergencyFundConfig {
    /// Validate against the [`MAX_EMERGENCY_MONTHS`] ceiling
    pub fn new(target_months: u32, current_fund: Money) -> FinanceResult<Self> {
        Self::with_limit(target_months, current_fund, MAX_EMERGENCY_MONTHS)
    }

    /// Validate against an explicit month limit
    pub fn with_limit(target_months: u32, current_fund: Money, max_months: u32) -> FinanceResult<Self> {
        if target_months > max_months {
            return Err(FinanceError::ValidationError(format!(
                "emergency fund target cannot exceed {max_months} months, got {target_months}"
            )));
        }
        if current_fund.is_negative() {
            return Err(FinanceError::ValidationError(
                "current emergency fund cannot be negative".to_string(),
            ));
        }

        Ok(Self {
            target_months,
            current_fund,
        })
    }

    /// The policy's default coverage with nothing saved yet
    pub fn default_for(currency: Currency, policy: &PlanningPolicy) -> FinanceResult<Self> {
        Self::with_limit(
            policy.default_emergency_months,
            Money::zero(currency),
            policy.max_emergency_months,
        )
    }

    /// Months of expenses to cover
    pub fn target_months(&self) -> u32 {
        self.target_months
    }

    /// Amount currently held
    pub fn current_fund(&self) -> &Money {
        &self.current_fund
    }
}

/// Reserve requirement against what is held
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EmergencyFundStatus {
    /// Monthly expenses times target months
    pub required_amount: Money,
    /// Amount currently held
    pub current_amount: Money,
    /// `required - current`, never negative
    pub shortfall: Money,
    /// Whole months of net savings needed to close the shortfall; zero when
    /// there is no shortfall or nothing is being saved
    pub months_to_target: u32,
}

impl EmergencyFundStatus {
    /// Compute the status for the given monthly expenses and net savings
    pub fn calculate(
        config: &EmergencyFundConfig,
        monthly_expenses: &Money,
        net_savings: Option<&Money>,
    ) -> FinanceResult<Self> {
        let required_amount = monthly_expenses.multiply_by(f64::from(config.target_months))?;
        let shortfall = required_amount
            .subtract(&config.current_fund)?
            .clamp_non_negative();

        let months_to_target = match net_savings {
            Some(net) if shortfall.is_positive() && net.is_positive() => {
                net.ensure_same_currency(&shortfall, "months to target")?;
                (shortfall.amount() / net.amount()).floor() as u32
            }
            _ => 0,
        };

        Ok(Self {
            required_amount,
            current_amount: config.current_fund.clone(),
            shortfall,
            months_to_target,
        })
    }

    /// Share of the requirement still missing, in [0, 1]; zero when nothing
    /// is required
    pub fn shortfall_ratio(&self) -> f64 {
        if !self.required_amount.is_positive() {
            return 0.0;
        }
        self.shortfall.amount() / self.required_amount.amount()
    }
}
