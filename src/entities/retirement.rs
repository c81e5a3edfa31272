// Copyright 2025 Cowboy AI, LLC.

//! Retirement horizon, spending and pension

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::entity::{Entity, RetirementDataId, RetirementMarker, UserId};
use crate::errors::{FinanceError, FinanceResult, ResultExt};
use crate::value_objects::{Money, Rate};

const MAX_AGE: u32 = 150;
const MAX_RETIREMENT_AGE: u32 = 100;

/// Outcome of a retirement sufficiency check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RetirementCalculation {
    /// Fund needed at retirement to cover the pension gap
    pub required_amount: Money,
    /// Expected savings at retirement
    pub projected_amount: Money,
    /// `required - projected`, never negative
    pub shortfall: Money,
    /// `projected / required`, capped at 100%
    pub sufficiency_rate: Rate,
    /// Monthly saving that would close the gap
    pub recommended_monthly_savings: Money,
}

/// Ages, planned retirement spending and expected pension.
///
/// Invariant: `current_age <= retirement_age <= life_expectancy`, with
/// retirement at most 100 and every age at most 150. Expenses and pension
/// are non-negative and share a currency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetirementData {
    entity: Entity<RetirementMarker>,
    user_id: UserId,
    current_age: u32,
    retirement_age: u32,
    life_expectancy: u32,
    monthly_retirement_expenses: Money,
    pension_amount: Money,
}

fn validate_ages(current: u32, retirement: u32, life_expectancy: u32) -> FinanceResult<()> {
    if current > MAX_AGE {
        return Err(FinanceError::ValidationError(format!(
            "current age must be between 0 and {MAX_AGE}, got {current}"
        )));
    }
    if retirement < current {
        return Err(FinanceError::ValidationError(format!(
            "retirement age ({retirement}) cannot be below current age ({current})"
        )));
    }
    if retirement > MAX_RETIREMENT_AGE {
        return Err(FinanceError::ValidationError(format!(
            "retirement age cannot exceed {MAX_RETIREMENT_AGE}, got {retirement}"
        )));
    }
    if life_expectancy < retirement {
        return Err(FinanceError::ValidationError(format!(
            "life expectancy ({life_expectancy}) cannot be below retirement age ({retirement})"
        )));
    }
    if life_expectancy > MAX_AGE {
        return Err(FinanceError::ValidationError(format!(
            "life expectancy cannot exceed {MAX_AGE}, got {life_expectancy}"
        )));
    }
    Ok(())
}

fn validate_amounts(expenses: &Money, pension: &Money) -> FinanceResult<()> {
    if expenses.is_negative() {
        return Err(FinanceError::ValidationError(
            "monthly retirement expenses cannot be negative".to_string(),
        ));
    }
    if pension.is_negative() {
        return Err(FinanceError::ValidationError(
            "pension amount cannot be negative".to_string(),
        ));
    }
    expenses.ensure_same_currency(pension, "retirement amounts")
}

impl RetirementData {
    /// Create retirement data with a fresh identity
    pub fn new(
        user_id: UserId,
        current_age: u32,
        retirement_age: u32,
        life_expectancy: u32,
        monthly_retirement_expenses: Money,
        pension_amount: Money,
    ) -> FinanceResult<Self> {
        validate_ages(current_age, retirement_age, life_expectancy)?;
        validate_amounts(&monthly_retirement_expenses, &pension_amount)?;

        Ok(Self {
            entity: Entity::new(),
            user_id,
            current_age,
            retirement_age,
            life_expectancy,
            monthly_retirement_expenses,
            pension_amount,
        })
    }

    /// Rehydrate stored retirement data
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: RetirementDataId,
        user_id: UserId,
        current_age: u32,
        retirement_age: u32,
        life_expectancy: u32,
        monthly_retirement_expenses: Money,
        pension_amount: Money,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> FinanceResult<Self> {
        validate_ages(current_age, retirement_age, life_expectancy)?;
        validate_amounts(&monthly_retirement_expenses, &pension_amount)?;

        Ok(Self {
            entity: Entity::restore(id, created_at, updated_at),
            user_id,
            current_age,
            retirement_age,
            life_expectancy,
            monthly_retirement_expenses,
            pension_amount,
        })
    }

    /// Identity
    pub fn id(&self) -> RetirementDataId {
        self.entity.id
    }

    /// Owner
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Age today
    pub fn current_age(&self) -> u32 {
        self.current_age
    }

    /// Planned retirement age
    pub fn retirement_age(&self) -> u32 {
        self.retirement_age
    }

    /// Expected lifespan
    pub fn life_expectancy(&self) -> u32 {
        self.life_expectancy
    }

    /// Planned monthly spending in retirement, in today's money
    pub fn monthly_retirement_expenses(&self) -> &Money {
        &self.monthly_retirement_expenses
    }

    /// Expected monthly pension
    pub fn pension_amount(&self) -> &Money {
        &self.pension_amount
    }

    /// Creation time
    pub fn created_at(&self) -> DateTime<Utc> {
        self.entity.created_at
    }

    /// Last modification time
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.entity.updated_at
    }

    /// Years left before retirement
    pub fn years_until_retirement(&self) -> u32 {
        self.retirement_age.saturating_sub(self.current_age)
    }

    /// Years spent in retirement
    pub fn retirement_years(&self) -> u32 {
        self.life_expectancy.saturating_sub(self.retirement_age)
    }

    /// Already at or past retirement age
    pub fn is_retired(&self) -> bool {
        self.current_age >= self.retirement_age
    }

    /// Monthly gap the pension leaves uncovered, zero if none
    pub fn pension_shortfall(&self) -> FinanceResult<Money> {
        let shortfall = self
            .monthly_retirement_expenses
            .subtract(&self.pension_amount)?;
        Ok(shortfall.clamp_non_negative())
    }

    /// Pension covers the planned expenses
    pub fn is_pension_sufficient(&self) -> FinanceResult<bool> {
        Ok(self.pension_shortfall()?.is_zero())
    }

    /// Fund needed at retirement: the monthly pension gap, inflated to the
    /// retirement date, for every month of retirement.
    pub fn calculate_required_retirement_fund(&self, inflation: Rate) -> FinanceResult<Money> {
        let currency = self.monthly_retirement_expenses.currency().clone();
        let retirement_years = self.retirement_years();
        if retirement_years == 0 {
            return Ok(Money::zero(currency));
        }

        let monthly_gap = self
            .monthly_retirement_expenses
            .subtract(&self.pension_amount)?;
        if monthly_gap.is_negative() || monthly_gap.is_zero() {
            return Ok(Money::zero(currency));
        }

        let inflation_factor = inflation.compound_factor(self.years_until_retirement() as i32);
        monthly_gap
            .multiply_by(inflation_factor)?
            .multiply_by(f64::from(retirement_years * 12))
    }

    /// Compare the projected savings at retirement with the required fund
    pub fn calculate_retirement_sufficiency(
        &self,
        current_savings: &Money,
        monthly_savings: &Money,
        investment_return: Rate,
        inflation: Rate,
    ) -> FinanceResult<RetirementCalculation> {
        let required_amount = self
            .calculate_required_retirement_fund(inflation)
            .context("required retirement fund")?;

        let years = self.years_until_retirement();
        let projected_amount = project_savings(current_savings, monthly_savings, investment_return, years)
            .context("projected retirement assets")?;

        let shortfall = required_amount
            .subtract(&projected_amount)
            .context("retirement shortfall")?
            .clamp_non_negative();

        let sufficiency_rate = if required_amount.is_zero() {
            Rate::from_percentage(100.0)?
        } else {
            let percentage = projected_amount.amount() / required_amount.amount() * 100.0;
            Rate::from_percentage(percentage.clamp(0.0, 100.0))?
        };

        let recommended_monthly_savings =
            recommended_savings(current_savings, &required_amount, investment_return, years)
                .context("recommended monthly savings")?;

        debug!(
            retirement_id = %self.id(),
            years_until_retirement = years,
            required = required_amount.amount(),
            projected = projected_amount.amount(),
            "Calculated retirement sufficiency"
        );

        Ok(RetirementCalculation {
            required_amount,
            projected_amount,
            shortfall,
            sufficiency_rate,
            recommended_monthly_savings,
        })
    }

    /// Change the current age; it may not pass the retirement age
    pub fn update_current_age(&mut self, age: u32) -> FinanceResult<()> {
        validate_ages(age, self.retirement_age, self.life_expectancy)?;
        self.current_age = age;
        self.entity.touch();
        Ok(())
    }

    /// Change the retirement age
    pub fn update_retirement_age(&mut self, age: u32) -> FinanceResult<()> {
        validate_ages(self.current_age, age, self.life_expectancy)?;
        self.retirement_age = age;
        self.entity.touch();
        Ok(())
    }

    /// Change the life expectancy
    pub fn update_life_expectancy(&mut self, age: u32) -> FinanceResult<()> {
        validate_ages(self.current_age, self.retirement_age, age)?;
        self.life_expectancy = age;
        self.entity.touch();
        Ok(())
    }

    /// Change the planned monthly expenses
    pub fn update_monthly_retirement_expenses(&mut self, expenses: Money) -> FinanceResult<()> {
        validate_amounts(&expenses, &self.pension_amount)?;
        self.monthly_retirement_expenses = expenses;
        self.entity.touch();
        Ok(())
    }

    /// Change the expected pension
    pub fn update_pension_amount(&mut self, pension: Money) -> FinanceResult<()> {
        validate_amounts(&self.monthly_retirement_expenses, &pension)?;
        self.pension_amount = pension;
        self.entity.touch();
        Ok(())
    }
}

/// Monthly compounding of the savings balance plus a fixed monthly deposit
fn project_savings(
    current_savings: &Money,
    monthly_savings: &Money,
    investment_return: Rate,
    years: u32,
) -> FinanceResult<Money> {
    if years == 0 {
        return Ok(current_savings.clone());
    }

    let monthly_rate = investment_return.monthly_rate()?;
    let mut balance = current_savings.clone();
    for _ in 0..years * 12 {
        let gain = balance.multiply(monthly_rate)?;
        balance = balance.add(&gain)?.add(monthly_savings)?;
    }
    Ok(balance)
}

/// Gap left after current savings grow untouched, spread evenly over the
/// months to retirement
fn recommended_savings(
    current_savings: &Money,
    required: &Money,
    investment_return: Rate,
    years: u32,
) -> FinanceResult<Money> {
    if years == 0 {
        return Ok(required.subtract(current_savings)?.clamp_non_negative());
    }

    let grown = current_savings.multiply_by(investment_return.compound_factor(years as i32))?;
    let additional = required.subtract(&grown)?;
    if additional.is_negative() || additional.is_zero() {
        return Ok(Money::zero(required.currency().clone()));
    }

    Money::new(
        additional.amount() / f64::from(years * 12),
        required.currency().clone(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::Currency;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn yen(amount: f64) -> Money {
        Money::jpy(amount).unwrap()
    }

    fn data(current: u32, retirement: u32, life: u32, expenses: f64, pension: f64) -> RetirementData {
        RetirementData::new(
            UserId::new(),
            current,
            retirement,
            life,
            yen(expenses),
            yen(pension),
        )
        .unwrap()
    }

    #[test_case(151, 151, 151 ; "current age above range")]
    #[test_case(40, 39, 90 ; "retirement before current age")]
    #[test_case(40, 101, 110 ; "retirement above one hundred")]
    #[test_case(40, 65, 60 ; "life expectancy before retirement")]
    #[test_case(40, 65, 151 ; "life expectancy above range")]
    fn invalid_ages_are_rejected(current: u32, retirement: u32, life: u32) {
        let result = RetirementData::new(
            UserId::new(),
            current,
            retirement,
            life,
            yen(1.0),
            yen(1.0),
        );
        assert!(matches!(result, Err(FinanceError::ValidationError(_))));
    }

    #[test]
    fn negative_or_mixed_amounts_are_rejected() {
        let user = UserId::new();
        assert!(RetirementData::new(user, 40, 65, 90, yen(-1.0), yen(0.0)).is_err());
        assert!(RetirementData::new(user, 40, 65, 90, yen(1.0), yen(-1.0)).is_err());
        assert!(RetirementData::new(
            user,
            40,
            65,
            90,
            yen(1.0),
            Money::new(1.0, Currency::USD).unwrap()
        )
        .is_err());
    }

    #[test]
    fn horizons() {
        let d = data(35, 65, 90, 300_000.0, 150_000.0);
        assert_eq!(d.years_until_retirement(), 30);
        assert_eq!(d.retirement_years(), 25);
        assert!(!d.is_retired());
        assert!(data(65, 65, 90, 0.0, 0.0).is_retired());
    }

    #[test]
    fn pension_gap() {
        let d = data(35, 65, 90, 300_000.0, 150_000.0);
        assert_eq!(d.pension_shortfall().unwrap(), yen(150_000.0));
        assert!(!d.is_pension_sufficient().unwrap());

        let covered = data(35, 65, 90, 200_000.0, 250_000.0);
        assert!(covered.pension_shortfall().unwrap().is_zero());
        assert!(covered.is_pension_sufficient().unwrap());
    }

    #[test]
    fn required_fund_without_inflation() {
        let d = data(35, 65, 90, 300_000.0, 150_000.0);
        let required = d.calculate_required_retirement_fund(Rate::zero()).unwrap();
        assert_eq!(required, yen(45_000_000.0));
    }

    #[test]
    fn required_fund_grows_with_inflation() {
        let d = data(35, 65, 90, 300_000.0, 150_000.0);
        let inflated = d
            .calculate_required_retirement_fund(Rate::from_percentage(2.0).unwrap())
            .unwrap();
        assert!(inflated.amount() > 45_000_000.0);
    }

    #[test]
    fn nothing_required_when_pension_covers_or_no_retirement_years() {
        let covered = data(35, 65, 90, 200_000.0, 250_000.0);
        assert!(covered
            .calculate_required_retirement_fund(Rate::zero())
            .unwrap()
            .is_zero());

        let no_years = data(35, 90, 90, 300_000.0, 0.0);
        assert!(no_years
            .calculate_required_retirement_fund(Rate::zero())
            .unwrap()
            .is_zero());

        let result = covered
            .calculate_retirement_sufficiency(&yen(0.0), &yen(0.0), Rate::zero(), Rate::zero())
            .unwrap();
        assert_eq!(result.sufficiency_rate.as_percentage(), 100.0);
        assert!(result.shortfall.is_zero());
    }

    #[test]
    fn sufficiency_at_retirement_age() {
        let d = data(65, 65, 90, 300_000.0, 150_000.0);
        let result = d
            .calculate_retirement_sufficiency(
                &yen(20_000_000.0),
                &yen(100_000.0),
                Rate::zero(),
                Rate::zero(),
            )
            .unwrap();

        assert_eq!(result.required_amount, yen(45_000_000.0));
        assert_eq!(result.projected_amount, yen(20_000_000.0));
        assert_eq!(result.shortfall, yen(25_000_000.0));
        assert_eq!(result.sufficiency_rate.as_percentage(), 44.4444);
        assert_eq!(result.recommended_monthly_savings, yen(25_000_000.0));
    }

    #[test]
    fn sufficiency_with_monthly_deposits() {
        let d = data(40, 65, 90, 300_000.0, 150_000.0);
        let result = d
            .calculate_retirement_sufficiency(&yen(0.0), &yen(100_000.0), Rate::zero(), Rate::zero())
            .unwrap();

        assert_eq!(result.projected_amount, yen(30_000_000.0));
        assert_eq!(result.shortfall, yen(15_000_000.0));
        assert_eq!(result.sufficiency_rate.as_percentage(), 66.6667);
        assert_eq!(result.recommended_monthly_savings, yen(150_000.0));
    }

    #[test]
    fn surplus_caps_rate_and_zeroes_shortfall() {
        let d = data(40, 65, 90, 300_000.0, 150_000.0);
        let result = d
            .calculate_retirement_sufficiency(
                &yen(50_000_000.0),
                &yen(0.0),
                Rate::from_percentage(3.0).unwrap(),
                Rate::zero(),
            )
            .unwrap();

        assert_eq!(result.sufficiency_rate.as_percentage(), 100.0);
        assert!(result.shortfall.is_zero());
        assert!(result.recommended_monthly_savings.is_zero());
    }

    #[test]
    fn age_updates_keep_ordering() {
        let mut d = data(40, 65, 90, 300_000.0, 150_000.0);

        assert!(d.update_current_age(70).is_err());
        d.update_current_age(45).unwrap();
        assert_eq!(d.current_age(), 45);

        assert!(d.update_retirement_age(44).is_err());
        assert!(d.update_retirement_age(95).is_err());
        d.update_retirement_age(60).unwrap();

        assert!(d.update_life_expectancy(59).is_err());
        assert!(d.update_life_expectancy(151).is_err());
        d.update_life_expectancy(100).unwrap();
        assert_eq!(d.retirement_years(), 40);
    }

    #[test]
    fn amount_updates_validate() {
        let mut d = data(40, 65, 90, 300_000.0, 150_000.0);
        assert!(d.update_monthly_retirement_expenses(yen(-1.0)).is_err());
        assert!(d.update_pension_amount(yen(-1.0)).is_err());
        d.update_pension_amount(yen(300_000.0)).unwrap();
        assert!(d.is_pension_sufficient().unwrap());
        d.update_monthly_retirement_expenses(yen(350_000.0)).unwrap();
        assert_eq!(d.pension_shortfall().unwrap(), yen(50_000.0));
    }
}
