// Copyright 2025 Cowboy AI, LLC.

//! Financial profile: income, expenses, savings and market assumptions

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::PlanningPolicy;
use crate::entity::{Entity, ProfileId, ProfileMarker, UserId};
use crate::errors::{FinanceError, FinanceResult, ResultExt};
use crate::value_objects::{Currency, Money, Rate};

/// Longest asset projection, in years, that [`FinancialProfile::project_assets`]
/// accepts. One point is kept per year and the balance is stepped monthly.
pub const MAX_PROJECTION_YEARS: u32 = 100;

fn sum_in<'a>(
    mut amounts: impl Iterator<Item = &'a Money>,
    currency: &Currency,
) -> FinanceResult<Money> {
    amounts.try_fold(Money::zero(currency.clone()), |total, amount| {
        total.add(amount)
    })
}

/// One monthly expense line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExpenseItem {
    /// Free-form category ("housing", "food", ...)
    pub category: String,
    /// Monthly amount
    pub amount: Money,
    /// Optional note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ExpenseItem {
    /// Expense line without a description
    pub fn new(category: impl Into<String>, amount: Money) -> Self {
        Self {
            category: category.into(),
            amount,
            description: None,
        }
    }

    /// Attach a description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Ordered list of expense lines
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ExpenseCollection(Vec<ExpenseItem>);

impl ExpenseCollection {
    /// Wrap a list of expense lines
    pub fn new(items: Vec<ExpenseItem>) -> Self {
        Self(items)
    }

    /// Append a line
    pub fn push(&mut self, item: ExpenseItem) {
        self.0.push(item);
    }

    /// Iterate over the lines in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &ExpenseItem> {
        self.0.iter()
    }

    /// Number of lines
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// No lines at all
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum in the first line's currency (JPY when empty).
    ///
    /// Fails when lines use different currencies.
    pub fn total(&self) -> FinanceResult<Money> {
        let currency = self
            .0
            .first()
            .map(|item| item.amount.currency().clone())
            .unwrap_or_default();
        self.total_in(&currency)
    }

    /// Sum in the given currency; fails if any line uses another one
    pub fn total_in(&self, currency: &Currency) -> FinanceResult<Money> {
        sum_in(self.0.iter().map(|item| &item.amount), currency)
    }

    /// Lines with the given category
    pub fn by_category(&self, category: &str) -> Vec<&ExpenseItem> {
        self.0
            .iter()
            .filter(|item| item.category == category)
            .collect()
    }
}

impl From<Vec<ExpenseItem>> for ExpenseCollection {
    fn from(items: Vec<ExpenseItem>) -> Self {
        Self(items)
    }
}

/// One savings holding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SavingsItem {
    /// Holding type ("deposit", "investment", "other", ...)
    #[serde(rename = "type")]
    pub kind: String,
    /// Current balance
    pub amount: Money,
    /// Optional note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SavingsItem {
    /// Holding without a description
    pub fn new(kind: impl Into<String>, amount: Money) -> Self {
        Self {
            kind: kind.into(),
            amount,
            description: None,
        }
    }

    /// Attach a description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Ordered list of savings holdings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct SavingsCollection(Vec<SavingsItem>);

impl SavingsCollection {
    /// Wrap a list of holdings
    pub fn new(items: Vec<SavingsItem>) -> Self {
        Self(items)
    }

    /// Append a holding
    pub fn push(&mut self, item: SavingsItem) {
        self.0.push(item);
    }

    /// Iterate over the holdings in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &SavingsItem> {
        self.0.iter()
    }

    /// Number of holdings
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// No holdings at all
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum in the first holding's currency (JPY when empty)
    pub fn total(&self) -> FinanceResult<Money> {
        let currency = self
            .0
            .first()
            .map(|item| item.amount.currency().clone())
            .unwrap_or_default();
        self.total_in(&currency)
    }

    /// Sum in the given currency; fails if any holding uses another one
    pub fn total_in(&self, currency: &Currency) -> FinanceResult<Money> {
        sum_in(self.0.iter().map(|item| &item.amount), currency)
    }

    /// Holdings of the given type
    pub fn by_type(&self, kind: &str) -> Vec<&SavingsItem> {
        self.0.iter().filter(|item| item.kind == kind).collect()
    }
}

impl From<Vec<SavingsItem>> for SavingsCollection {
    fn from(items: Vec<SavingsItem>) -> Self {
        Self(items)
    }
}

/// One year of an asset projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AssetProjection {
    /// 1-based year offset from today
    pub year: u32,
    /// Nominal balance at the end of the year
    pub total_assets: Money,
    /// Balance deflated to today's purchasing power
    pub real_value: Money,
    /// Starting savings plus every monthly contribution so far
    pub contributed_amount: Money,
    /// `total_assets - contributed_amount`
    pub investment_gains: Money,
}

/// A person's monthly cash flow, savings and market assumptions.
///
/// Totals are always taken in the income currency, so every expense and
/// savings line must share it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialProfile {
    entity: Entity<ProfileMarker>,
    user_id: UserId,
    monthly_income: Money,
    monthly_expenses: ExpenseCollection,
    current_savings: SavingsCollection,
    investment_return: Rate,
    inflation_rate: Rate,
}

impl FinancialProfile {
    /// Create a profile with a fresh identity
    pub fn new(
        user_id: UserId,
        monthly_income: Money,
        monthly_expenses: ExpenseCollection,
        current_savings: SavingsCollection,
        investment_return: Rate,
        inflation_rate: Rate,
    ) -> FinanceResult<Self> {
        Self::validate_cash_flow(&monthly_income, &monthly_expenses, &current_savings)?;

        Ok(Self {
            entity: Entity::new(),
            user_id,
            monthly_income,
            monthly_expenses,
            current_savings,
            investment_return,
            inflation_rate,
        })
    }

    /// Rehydrate a stored profile, re-checking its cash-flow invariants
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: ProfileId,
        user_id: UserId,
        monthly_income: Money,
        monthly_expenses: ExpenseCollection,
        current_savings: SavingsCollection,
        investment_return: Rate,
        inflation_rate: Rate,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> FinanceResult<Self> {
        Self::validate_cash_flow(&monthly_income, &monthly_expenses, &current_savings)?;

        Ok(Self {
            entity: Entity::restore(id, created_at, updated_at),
            user_id,
            monthly_income,
            monthly_expenses,
            current_savings,
            investment_return,
            inflation_rate,
        })
    }

    fn validate_cash_flow(
        income: &Money,
        expenses: &ExpenseCollection,
        savings: &SavingsCollection,
    ) -> FinanceResult<()> {
        if !income.is_positive() {
            return Err(FinanceError::ValidationError(
                "monthly income must be positive".to_string(),
            ));
        }

        let total_expenses = expenses
            .total_in(income.currency())
            .context("total expenses")?;
        if total_expenses.is_negative() {
            return Err(FinanceError::ValidationError(
                "total expenses cannot be negative".to_string(),
            ));
        }

        let total_savings = savings
            .total_in(income.currency())
            .context("total savings")?;
        if total_savings.is_negative() {
            return Err(FinanceError::ValidationError(
                "total savings cannot be negative".to_string(),
            ));
        }

        Ok(())
    }

    /// Profile identity
    pub fn id(&self) -> ProfileId {
        self.entity.id
    }

    /// Owner
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Monthly income
    pub fn monthly_income(&self) -> &Money {
        &self.monthly_income
    }

    /// Monthly expense lines
    pub fn monthly_expenses(&self) -> &ExpenseCollection {
        &self.monthly_expenses
    }

    /// Savings holdings
    pub fn current_savings(&self) -> &SavingsCollection {
        &self.current_savings
    }

    /// Expected annual investment return
    pub fn investment_return(&self) -> Rate {
        self.investment_return
    }

    /// Expected annual inflation
    pub fn inflation_rate(&self) -> Rate {
        self.inflation_rate
    }

    /// Creation time
    pub fn created_at(&self) -> DateTime<Utc> {
        self.entity.created_at
    }

    /// Last modification time
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.entity.updated_at
    }

    /// Sum of monthly expenses in the income currency
    pub fn total_expenses(&self) -> FinanceResult<Money> {
        self.monthly_expenses.total_in(self.monthly_income.currency())
    }

    /// Sum of savings in the income currency
    pub fn total_savings(&self) -> FinanceResult<Money> {
        self.current_savings.total_in(self.monthly_income.currency())
    }

    /// Income minus expenses; negative when overspending
    pub fn calculate_net_savings(&self) -> FinanceResult<Money> {
        let expenses = self.total_expenses().context("total expenses")?;
        self.monthly_income.subtract(&expenses)
    }

    /// Health check against the default [`PlanningPolicy`]
    pub fn validate_financial_health(&self) -> FinanceResult<()> {
        self.validate_financial_health_with(&PlanningPolicy::default())
    }

    /// Fails with a business-rule violation when expenses exceed income or
    /// when net savings fall below the policy's minimum share of income.
    pub fn validate_financial_health_with(&self, policy: &PlanningPolicy) -> FinanceResult<()> {
        let net_savings = self.calculate_net_savings().context("net savings")?;

        if net_savings.is_negative() {
            return Err(FinanceError::business_rule(
                "monthly expenses exceed income; spending needs review",
            ));
        }

        let minimum = self
            .monthly_income
            .multiply_by(policy.minimum_savings_ratio)?;
        if net_savings.less_than(&minimum)? {
            return Err(FinanceError::business_rule(format!(
                "savings rate is too low; saving at least {:.0}% of income is recommended",
                policy.minimum_savings_ratio * 100.0
            )));
        }

        Ok(())
    }

    /// Project the savings balance forward, one point per year.
    ///
    /// Each month the balance first earns the monthly equivalent of the
    /// investment return, then receives the month's net savings. Every step
    /// is rounded to cents. Horizons above [`MAX_PROJECTION_YEARS`] fail
    /// with [`FinanceError::InvalidPeriod`].
    pub fn project_assets(&self, years: u32) -> FinanceResult<Vec<AssetProjection>> {
        if years == 0 {
            return Err(FinanceError::ValidationError(
                "projection years must be positive".to_string(),
            ));
        }
        if years > MAX_PROJECTION_YEARS {
            return Err(FinanceError::InvalidPeriod(format!(
                "projection of {years} years exceeds the {MAX_PROJECTION_YEARS}-year horizon"
            )));
        }

        let net_savings = self.calculate_net_savings().context("net savings")?;
        let starting_savings = self.total_savings().context("total savings")?;
        let monthly_return = self
            .investment_return
            .monthly_rate()
            .context("monthly investment return")?;

        debug!(
            profile_id = %self.id(),
            years,
            net_savings = net_savings.amount(),
            "Projecting assets"
        );

        let mut balance = starting_savings.clone();
        let mut contributed = starting_savings;
        let mut projections = Vec::with_capacity(years as usize);

        for year in 1..=years as i32 {
            for _ in 0..12 {
                let gain = balance.multiply(monthly_return)?;
                balance = balance.add(&gain)?.add(&net_savings)?;
                contributed = contributed.add(&net_savings)?;
            }

            let investment_gains = balance.subtract(&contributed)?;
            let inflation_factor = self.inflation_rate.compound_factor(year);
            let real_value = balance.multiply_by(1.0 / inflation_factor)?;

            projections.push(AssetProjection {
                year: year.unsigned_abs(),
                total_assets: balance.clone(),
                real_value,
                contributed_amount: contributed.clone(),
                investment_gains,
            });
        }

        Ok(projections)
    }

    /// Replace the monthly income; expenses and savings must share its currency
    pub fn update_monthly_income(&mut self, income: Money) -> FinanceResult<()> {
        Self::validate_cash_flow(&income, &self.monthly_expenses, &self.current_savings)?;
        self.monthly_income = income;
        self.entity.touch();
        Ok(())
    }

    /// Replace the expense lines
    pub fn update_monthly_expenses(&mut self, expenses: ExpenseCollection) -> FinanceResult<()> {
        Self::validate_cash_flow(&self.monthly_income, &expenses, &self.current_savings)?;
        self.monthly_expenses = expenses;
        self.entity.touch();
        Ok(())
    }

    /// Replace the savings holdings
    pub fn update_current_savings(&mut self, savings: SavingsCollection) -> FinanceResult<()> {
        Self::validate_cash_flow(&self.monthly_income, &self.monthly_expenses, &savings)?;
        self.current_savings = savings;
        self.entity.touch();
        Ok(())
    }

    /// Replace the expected investment return
    pub fn update_investment_return(&mut self, rate: Rate) {
        self.investment_return = rate;
        self.entity.touch();
    }

    /// Replace the expected inflation
    pub fn update_inflation_rate(&mut self, rate: Rate) {
        self.inflation_rate = rate;
        self.entity.touch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn yen(amount: f64) -> Money {
        Money::jpy(amount).unwrap()
    }

    fn rate(p: f64) -> Rate {
        Rate::from_percentage(p).unwrap()
    }

    fn profile(income: f64, expenses: f64, savings: f64, ret: f64, inflation: f64) -> FinancialProfile {
        FinancialProfile::new(
            UserId::new(),
            yen(income),
            vec![ExpenseItem::new("living", yen(expenses))].into(),
            vec![SavingsItem::new("deposit", yen(savings))].into(),
            rate(ret),
            rate(inflation),
        )
        .unwrap()
    }

    #[test]
    fn empty_collections_total_zero_yen() {
        let total = ExpenseCollection::default().total().unwrap();
        assert!(total.is_zero());
        assert_eq!(total.currency(), &Currency::JPY);
        assert!(SavingsCollection::default().total().unwrap().is_zero());
    }

    #[test]
    fn mixed_currency_collection_fails_to_total() {
        let expenses = ExpenseCollection::new(vec![
            ExpenseItem::new("rent", yen(100_000.0)),
            ExpenseItem::new("travel", Money::new(500.0, Currency::USD).unwrap()),
        ]);
        assert!(matches!(
            expenses.total(),
            Err(FinanceError::CurrencyMismatch { .. })
        ));
    }

    #[test]
    fn collection_total_uses_first_currency() {
        let savings = SavingsCollection::new(vec![
            SavingsItem::new("deposit", Money::new(10.0, Currency::USD).unwrap()),
            SavingsItem::new("investment", Money::new(15.5, Currency::USD).unwrap()),
        ]);
        let total = savings.total().unwrap();
        assert_eq!(total, Money::new(25.5, Currency::USD).unwrap());
        assert!(savings.total_in(&Currency::JPY).is_err());
    }

    #[test]
    fn filters_by_category_and_type() {
        let expenses = ExpenseCollection::new(vec![
            ExpenseItem::new("housing", yen(80_000.0)),
            ExpenseItem::new("food", yen(40_000.0)),
            ExpenseItem::new("housing", yen(5_000.0)).with_description("parking"),
        ]);
        assert_eq!(expenses.by_category("housing").len(), 2);
        assert!(expenses.by_category("leisure").is_empty());

        let savings = SavingsCollection::new(vec![
            SavingsItem::new("deposit", yen(1.0)),
            SavingsItem::new("investment", yen(2.0)),
        ]);
        assert_eq!(savings.by_type("investment")[0].amount, yen(2.0));
    }

    #[test]
    fn savings_kind_serializes_as_type() {
        let item = SavingsItem::new("deposit", yen(100.0));
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "deposit");
        assert!(json.get("description").is_none());
    }

    #[test]
    fn income_must_be_positive() {
        let result = FinancialProfile::new(
            UserId::new(),
            yen(0.0),
            ExpenseCollection::default(),
            SavingsCollection::default(),
            Rate::zero(),
            Rate::zero(),
        );
        assert!(matches!(result, Err(FinanceError::ValidationError(_))));
    }

    #[test]
    fn negative_totals_are_rejected() {
        let result = FinancialProfile::new(
            UserId::new(),
            yen(100.0),
            vec![ExpenseItem::new("refund", yen(-50.0))].into(),
            SavingsCollection::default(),
            Rate::zero(),
            Rate::zero(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn expense_currency_must_match_income() {
        let result = FinancialProfile::new(
            UserId::new(),
            yen(100_000.0),
            vec![ExpenseItem::new("rent", Money::new(10.0, Currency::EUR).unwrap())].into(),
            SavingsCollection::default(),
            Rate::zero(),
            Rate::zero(),
        );
        let err = result.unwrap_err();
        assert!(err.is_structural());
        assert!(matches!(
            err.root_cause(),
            FinanceError::CurrencyMismatch { .. }
        ));
    }

    #[test]
    fn net_savings_can_be_negative() {
        let p = profile(300_000.0, 350_000.0, 0.0, 0.0, 0.0);
        assert_eq!(p.calculate_net_savings().unwrap(), yen(-50_000.0));
    }

    #[test]
    fn health_checks() {
        assert!(profile(400_000.0, 260_000.0, 0.0, 0.0, 0.0)
            .validate_financial_health()
            .is_ok());

        let low = profile(400_000.0, 380_000.0, 0.0, 0.0, 0.0)
            .validate_financial_health()
            .unwrap_err();
        assert!(low.is_business_rule());

        let overspending = profile(400_000.0, 420_000.0, 0.0, 0.0, 0.0)
            .validate_financial_health()
            .unwrap_err();
        assert!(overspending.is_business_rule());
    }

    #[test]
    fn health_threshold_follows_policy() {
        let p = profile(400_000.0, 330_000.0, 0.0, 0.0, 0.0);
        let strict = PlanningPolicy {
            minimum_savings_ratio: 0.2,
            ..PlanningPolicy::default()
        };
        assert!(p.validate_financial_health().is_ok());
        assert!(p.validate_financial_health_with(&strict).is_err());
    }

    #[test]
    fn zero_year_projection_is_rejected() {
        let p = profile(400_000.0, 260_000.0, 0.0, 5.0, 2.0);
        assert!(p.project_assets(0).is_err());
    }

    #[test]
    fn projection_horizon_is_capped() {
        let p = profile(400_000.0, 260_000.0, 0.0, 5.0, 2.0);
        assert_eq!(
            p.project_assets(MAX_PROJECTION_YEARS).unwrap().len(),
            MAX_PROJECTION_YEARS as usize
        );
        assert!(matches!(
            p.project_assets(MAX_PROJECTION_YEARS + 1),
            Err(FinanceError::InvalidPeriod(_))
        ));
        assert!(matches!(
            p.project_assets(u32::MAX),
            Err(FinanceError::InvalidPeriod(_))
        ));
    }

    #[test]
    fn totals_fold_every_line() {
        let expenses = ExpenseCollection::new(vec![
            ExpenseItem::new("rent", yen(80_000.0)),
            ExpenseItem::new("food", yen(45_000.5)),
            ExpenseItem::new("phone", yen(4_999.5)),
        ]);
        assert_eq!(expenses.total().unwrap(), yen(130_000.0));
    }

    #[test]
    fn projection_without_return_is_plain_accumulation() {
        let p = profile(400_000.0, 260_000.0, 100_000.0, 0.0, 0.0);
        let points = p.project_assets(2).unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].year, 1);
        assert_eq!(points[0].total_assets, yen(1_780_000.0));
        assert_eq!(points[0].contributed_amount, yen(1_780_000.0));
        assert!(points[0].investment_gains.is_zero());
        assert_eq!(points[0].real_value, yen(1_780_000.0));
        assert_eq!(points[1].total_assets, yen(3_460_000.0));
    }

    #[test]
    fn projection_grows_and_deflates() {
        let p = profile(400_000.0, 260_000.0, 1_000_000.0, 5.0, 2.0);
        let points = p.project_assets(10).unwrap();

        assert_eq!(points.len(), 10);
        for window in points.windows(2) {
            assert!(window[1].total_assets.amount() > window[0].total_assets.amount());
        }
        for point in &points {
            let gains = point
                .total_assets
                .subtract(&point.contributed_amount)
                .unwrap();
            assert_eq!(point.investment_gains, gains);
            assert!(point.investment_gains.is_positive());
            assert!(point.real_value.amount() < point.total_assets.amount());
        }
    }

    #[test]
    fn updates_revalidate_and_touch() {
        let mut p = profile(400_000.0, 260_000.0, 0.0, 0.0, 0.0);
        let before = p.updated_at();

        assert!(p.update_monthly_income(yen(-1.0)).is_err());
        assert!(p
            .update_monthly_income(Money::new(4_000.0, Currency::USD).unwrap())
            .is_err());
        assert_eq!(p.monthly_income(), &yen(400_000.0));

        std::thread::sleep(std::time::Duration::from_millis(5));
        p.update_monthly_expenses(vec![ExpenseItem::new("rent", yen(100_000.0))].into())
            .unwrap();
        assert_eq!(p.total_expenses().unwrap(), yen(100_000.0));
        assert!(p.updated_at() > before);

        p.update_current_savings(vec![SavingsItem::new("deposit", yen(5.0))].into())
            .unwrap();
        assert_eq!(p.total_savings().unwrap(), yen(5.0));

        p.update_investment_return(rate(3.0));
        p.update_inflation_rate(rate(1.0));
        assert_eq!(p.investment_return(), rate(3.0));
        assert_eq!(p.inflation_rate(), rate(1.0));
    }

    #[test]
    fn restore_keeps_identity() {
        let original = profile(400_000.0, 260_000.0, 0.0, 1.0, 1.0);
        let restored = FinancialProfile::restore(
            original.id(),
            original.user_id(),
            original.monthly_income().clone(),
            original.monthly_expenses().clone(),
            original.current_savings().clone(),
            original.investment_return(),
            original.inflation_rate(),
            original.created_at(),
            original.updated_at(),
        )
        .unwrap();
        assert_eq!(restored, original);
    }
}
