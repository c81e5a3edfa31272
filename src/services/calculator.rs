// Copyright 2025 Cowboy AI, LLC.

//! Stateless time-value-of-money helpers

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{FinanceError, FinanceResult, ResultExt};
use crate::value_objects::{Money, Rate};

/// Debt repayment simulations stop after this many months
const MAX_PAYOFF_MONTHS: u32 = 1200;

/// Longest horizon, in years, accepted by the year-stepped calculations
const MAX_SIMULATION_YEARS: u32 = 1000;

/// Outcome of a compound interest calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CompoundInterestResult {
    /// Balance at the end
    pub final_amount: Money,
    /// Principal plus every regular payment
    pub total_contribution: Money,
    /// `final_amount - total_contribution`
    pub interest_earned: Money,
    /// Per-period rate that reproduces the growth
    pub effective_rate: Rate,
}

/// Purchasing power of an amount after inflation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct InflationAdjustmentResult {
    /// The amount as given
    pub nominal_value: Money,
    /// The amount in today's purchasing power
    pub real_value: Money,
    /// `nominal_value - real_value`
    pub purchasing_power_loss: Money,
    /// Loss as a share of the nominal value
    pub inflation_impact: Rate,
}

/// Money needed to fund retirement beyond the pension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RetirementNeedsResult {
    /// Sum of every month's shortfall over the retirement
    pub total_needs: Money,
    /// First month's shortfall
    pub monthly_needs: Money,
    /// Length of the retirement
    pub years_in_retirement: u32,
    /// Whether later years were grown by a non-zero inflation rate
    pub inflation_adjusted: bool,
    /// Pension paid over the whole retirement
    pub pension_coverage: Money,
    /// Savings needed on top of the pension
    pub additional_required: Money,
}

fn non_negative_periods(periods: i32, what: &str) -> FinanceResult<u32> {
    u32::try_from(periods).map_err(|_| {
        FinanceError::InvalidPeriod(format!("{what} cannot be negative, got {periods}"))
    })
}

fn simulation_years(years: i32, what: &str) -> FinanceResult<u32> {
    let years = non_negative_periods(years, what)?;
    if years > MAX_SIMULATION_YEARS {
        return Err(FinanceError::InvalidPeriod(format!(
            "{what} cannot exceed {MAX_SIMULATION_YEARS}, got {years}"
        )));
    }
    Ok(years)
}

fn months_in(years: u32) -> FinanceResult<u32> {
    years
        .checked_mul(12)
        .ok_or_else(|| FinanceError::InvalidPeriod(format!("{years} years overflow a month count")))
}

/// Compound interest, discounting and repayment calculations.
///
/// Holds no state; every method is a pure function of its arguments.
#[derive(Debug, Clone, Copy, Default)]
pub struct FinancialCalculator;

impl FinancialCalculator {
    /// Create a calculator
    pub fn new() -> Self {
        Self
    }

    /// `principal * (1 + rate)^periods`
    pub fn compound_interest(
        &self,
        principal: &Money,
        rate: Rate,
        periods: i32,
    ) -> FinanceResult<CompoundInterestResult> {
        let n = non_negative_periods(periods, "periods")?;
        if n == 0 {
            return Ok(CompoundInterestResult {
                final_amount: principal.clone(),
                total_contribution: principal.clone(),
                interest_earned: Money::zero(principal.currency().clone()),
                effective_rate: rate,
            });
        }

        let factor = rate.compound_factor(periods);
        let final_amount = principal.multiply_by(factor).context("final amount")?;
        let interest_earned = final_amount.subtract(principal)?;
        let effective_rate =
            Rate::from_decimal(factor.powf(1.0 / f64::from(n)) - 1.0).unwrap_or(rate);

        Ok(CompoundInterestResult {
            final_amount,
            total_contribution: principal.clone(),
            interest_earned,
            effective_rate,
        })
    }

    /// Monthly compounding of a principal plus a fixed monthly payment.
    ///
    /// `years` is capped at 1000.
    pub fn compound_interest_with_regular_payments(
        &self,
        principal: &Money,
        monthly_payment: &Money,
        annual_rate: Rate,
        years: i32,
    ) -> FinanceResult<CompoundInterestResult> {
        let years = simulation_years(years, "years")?;
        if years == 0 {
            return Ok(CompoundInterestResult {
                final_amount: principal.clone(),
                total_contribution: principal.clone(),
                interest_earned: Money::zero(principal.currency().clone()),
                effective_rate: annual_rate,
            });
        }

        let monthly_rate = annual_rate.monthly_rate().context("monthly rate")?;
        let mut balance = principal.clone();
        let mut contributed = principal.clone();

        for _ in 0..months_in(years)? {
            if !monthly_rate.is_zero() {
                let interest = balance.multiply(monthly_rate)?;
                balance = balance.add(&interest)?;
            }
            balance = balance.add(monthly_payment)?;
            contributed = contributed.add(monthly_payment)?;
        }

        let interest_earned = balance.subtract(&contributed)?;
        Ok(CompoundInterestResult {
            final_amount: balance,
            total_contribution: contributed,
            interest_earned,
            effective_rate: annual_rate,
        })
    }

    /// Deflate `amount` by `years` of inflation
    pub fn inflation_adjusted_value(
        &self,
        amount: &Money,
        inflation: Rate,
        years: i32,
    ) -> FinanceResult<InflationAdjustmentResult> {
        if non_negative_periods(years, "years")? == 0 {
            return Ok(InflationAdjustmentResult {
                nominal_value: amount.clone(),
                real_value: amount.clone(),
                purchasing_power_loss: Money::zero(amount.currency().clone()),
                inflation_impact: inflation,
            });
        }

        let factor = inflation.compound_factor(years);
        let real_value = amount.multiply_by(1.0 / factor).context("real value")?;
        let purchasing_power_loss = amount.subtract(&real_value)?;

        let inflation_impact = if amount.is_zero() {
            inflation
        } else {
            Rate::from_percentage(purchasing_power_loss.amount() / amount.amount() * 100.0)
                .unwrap_or(inflation)
        };

        Ok(InflationAdjustmentResult {
            nominal_value: amount.clone(),
            real_value,
            purchasing_power_loss,
            inflation_impact,
        })
    }

    /// Savings needed to cover the gap between expenses and pension.
    ///
    /// Each retirement year's shortfall grows by the inflation rate from
    /// the first year on. `years_in_retirement` is capped at 1000.
    pub fn retirement_needs(
        &self,
        monthly_expenses: &Money,
        years_in_retirement: i32,
        inflation: Rate,
        pension: &Money,
    ) -> FinanceResult<RetirementNeedsResult> {
        let years = simulation_years(years_in_retirement, "years in retirement")?;
        if monthly_expenses.is_negative() {
            return Err(FinanceError::ValidationError(
                "monthly expenses cannot be negative".to_string(),
            ));
        }
        if pension.is_negative() {
            return Err(FinanceError::ValidationError(
                "pension amount cannot be negative".to_string(),
            ));
        }

        let shortfall = monthly_expenses.subtract(pension)?;
        let currency = monthly_expenses.currency().clone();
        let pension_coverage = pension.multiply_by(f64::from(months_in(years)?))?;

        if shortfall.is_negative() || shortfall.is_zero() {
            return Ok(RetirementNeedsResult {
                total_needs: Money::zero(currency.clone()),
                monthly_needs: Money::zero(currency.clone()),
                years_in_retirement: years,
                inflation_adjusted: !inflation.is_zero(),
                pension_coverage,
                additional_required: Money::zero(currency),
            });
        }

        let yearly = shortfall.multiply_by(12.0)?;
        let mut total_needs = Money::zero(currency);
        for year in 0..years_in_retirement {
            total_needs = total_needs.add(&yearly.multiply_by(inflation.compound_factor(year))?)?;
        }

        Ok(RetirementNeedsResult {
            additional_required: total_needs.clone(),
            total_needs,
            monthly_needs: shortfall,
            years_in_retirement: years,
            inflation_adjusted: !inflation.is_zero(),
            pension_coverage,
        })
    }

    /// `present * (1 + rate)^periods`
    pub fn future_value(&self, present: &Money, rate: Rate, periods: i32) -> FinanceResult<Money> {
        if non_negative_periods(periods, "periods")? == 0 {
            return Ok(present.clone());
        }
        present.multiply_by(rate.compound_factor(periods))
    }

    /// `future / (1 + rate)^periods`; unchanged at a zero rate
    pub fn present_value(&self, future: &Money, rate: Rate, periods: i32) -> FinanceResult<Money> {
        if non_negative_periods(periods, "periods")? == 0 || rate.is_zero() {
            return Ok(future.clone());
        }
        future.multiply_by(1.0 / rate.compound_factor(periods))
    }

    /// Share of income to save each year so that current savings, grown at
    /// `investment_return`, plus the savings reach `target` in `years`.
    ///
    /// Fails with [`FinanceError::InvalidRate`] when more than the whole
    /// income would be needed.
    pub fn required_savings_rate(
        &self,
        income: &Money,
        target: &Money,
        current_savings: &Money,
        investment_return: Rate,
        years: i32,
    ) -> FinanceResult<Rate> {
        if years <= 0 {
            return Err(FinanceError::InvalidPeriod(format!(
                "years must be positive, got {years}"
            )));
        }
        if !income.is_positive() || income.is_zero() {
            return Err(FinanceError::ValidationError(
                "income must be positive".to_string(),
            ));
        }

        let grown = self
            .future_value(current_savings, investment_return, years)
            .context("future value of current savings")?;
        let additional = target.subtract(&grown)?;
        if additional.is_negative() || additional.is_zero() {
            return Ok(Rate::zero());
        }

        let annual = additional.amount() / f64::from(years);
        Rate::from_percentage(annual / income.amount() * 100.0)
    }

    /// Months of expenses, grown by inflation until the target date
    pub fn emergency_fund_target(
        &self,
        monthly_expenses: &Money,
        target_months: i32,
        inflation: Rate,
        years_to_target: i32,
    ) -> FinanceResult<Money> {
        let months = non_negative_periods(target_months, "target months")?;
        let years = non_negative_periods(years_to_target, "years to target")?;

        let base = monthly_expenses.multiply_by(f64::from(months))?;
        if years > 0 && !inflation.is_zero() {
            return base.multiply_by(inflation.compound_factor(years_to_target));
        }
        Ok(base)
    }

    /// Months needed to repay `debt` with a fixed payment at a monthly
    /// compounded annual `rate`
    pub fn debt_payoff_months(
        &self,
        debt: &Money,
        monthly_payment: &Money,
        rate: Rate,
    ) -> FinanceResult<u32> {
        if debt.is_negative() || debt.is_zero() {
            return Ok(0);
        }
        if monthly_payment.is_negative() || monthly_payment.is_zero() {
            return Err(FinanceError::ValidationError(
                "monthly payment must be positive".to_string(),
            ));
        }

        let monthly_rate = rate.monthly_rate().context("monthly rate")?;
        if monthly_rate.is_zero() {
            debt.ensure_same_currency(monthly_payment, "debt payoff")?;
            return Ok((debt.amount() / monthly_payment.amount()).ceil() as u32);
        }

        let interest = debt.multiply(monthly_rate)?;
        if monthly_payment.less_than(&interest)? {
            return Err(FinanceError::business_rule(
                "monthly payment does not cover the interest",
            ));
        }

        let mut remaining = debt.clone();
        let mut months = 0;
        while months < MAX_PAYOFF_MONTHS && remaining.is_positive() {
            let interest = remaining.multiply(monthly_rate)?;
            remaining = remaining.add(&interest)?.subtract(monthly_payment)?;
            months += 1;
        }

        if months >= MAX_PAYOFF_MONTHS {
            return Err(FinanceError::business_rule(format!(
                "repayment would take {MAX_PAYOFF_MONTHS} months or more"
            )));
        }

        debug!(months, "Simulated debt repayment");
        Ok(months)
    }
}
