// Copyright 2025 Cowboy AI, LLC.

//! Savings goals and their achievability

use chrono::{DateTime, Months, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use super::FinancialProfile;
use crate::entity::{Entity, GoalId, GoalMarker, UserId};
use crate::errors::{FinanceError, FinanceResult, ResultExt};
use crate::value_objects::{Money, Rate};

/// Hours in the 30-day month used for goal horizons
const HOURS_PER_MONTH: i64 = 24 * 30;

/// What a goal is saving for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum GoalType {
    /// General savings
    Savings,
    /// Retirement fund; at most one active per plan
    Retirement,
    /// Emergency reserve; at most one active per plan
    Emergency,
    /// Anything else
    Custom,
}

impl GoalType {
    /// Wire name ("savings", "retirement", ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalType::Savings => "savings",
            GoalType::Retirement => "retirement",
            GoalType::Emergency => "emergency",
            GoalType::Custom => "custom",
        }
    }
}

impl FromStr for GoalType {
    type Err = FinanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "savings" => Ok(GoalType::Savings),
            "retirement" => Ok(GoalType::Retirement),
            "emergency" => Ok(GoalType::Emergency),
            "custom" => Ok(GoalType::Custom),
            other => Err(FinanceError::ValidationError(format!(
                "invalid goal type: {other}"
            ))),
        }
    }
}

impl fmt::Display for GoalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GoalType::Savings => "貯蓄目標",
            GoalType::Retirement => "退職・老後資金目標",
            GoalType::Emergency => "緊急資金目標",
            GoalType::Custom => "カスタム目標",
        };
        f.write_str(label)
    }
}

/// Progress toward a goal, clamped to [0, 100] percent
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ProgressRate(Rate);

impl ProgressRate {
    /// Clamp the percentage into range; only NaN is rejected
    pub fn new(percentage: f64) -> FinanceResult<Self> {
        if percentage.is_nan() {
            return Err(FinanceError::InvalidRate(
                "progress cannot be NaN".to_string(),
            ));
        }
        Ok(Self(Rate::from_percentage(percentage.clamp(0.0, 100.0))?))
    }

    /// Progress as a percentage
    pub fn as_percentage(&self) -> f64 {
        self.0.as_percentage()
    }

    /// Reached 100%
    pub fn is_complete(&self) -> bool {
        self.0.as_percentage() >= 100.0
    }
}

impl fmt::Display for ProgressRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}%", self.0.as_percentage())
    }
}

/// A target amount to reach by a date.
///
/// The current amount and target share a currency. New goals start from
/// zero and must target a future date; stored goals may be past due.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Goal {
    entity: Entity<GoalMarker>,
    user_id: UserId,
    goal_type: GoalType,
    title: String,
    target_amount: Money,
    target_date: DateTime<Utc>,
    current_amount: Money,
    monthly_contribution: Money,
    active: bool,
}

fn validate_title(title: &str) -> FinanceResult<()> {
    if title.trim().is_empty() {
        return Err(FinanceError::ValidationError(
            "goal title is required".to_string(),
        ));
    }
    Ok(())
}

fn validate_target_amount(amount: &Money) -> FinanceResult<()> {
    if !amount.is_positive() {
        return Err(FinanceError::ValidationError(
            "target amount must be positive".to_string(),
        ));
    }
    Ok(())
}

fn validate_non_negative(amount: &Money, what: &str) -> FinanceResult<()> {
    if amount.is_negative() {
        return Err(FinanceError::ValidationError(format!(
            "{what} cannot be negative"
        )));
    }
    Ok(())
}

fn validate_future_date(date: DateTime<Utc>, now: DateTime<Utc>) -> FinanceResult<()> {
    if date < now {
        return Err(FinanceError::ValidationError(
            "target date must be in the future".to_string(),
        ));
    }
    Ok(())
}

impl Goal {
    /// Create an active goal with nothing saved yet
    pub fn new(
        user_id: UserId,
        goal_type: GoalType,
        title: impl Into<String>,
        target_amount: Money,
        target_date: DateTime<Utc>,
        monthly_contribution: Money,
    ) -> FinanceResult<Self> {
        Self::new_at(
            user_id,
            goal_type,
            title,
            target_amount,
            target_date,
            monthly_contribution,
            Utc::now(),
        )
    }

    /// [`Goal::new`] with an explicit creation time
    pub fn new_at(
        user_id: UserId,
        goal_type: GoalType,
        title: impl Into<String>,
        target_amount: Money,
        target_date: DateTime<Utc>,
        monthly_contribution: Money,
        now: DateTime<Utc>,
    ) -> FinanceResult<Self> {
        let title = title.into();
        validate_title(&title)?;
        validate_target_amount(&target_amount)?;
        validate_future_date(target_date, now)?;
        validate_non_negative(&monthly_contribution, "monthly contribution")?;

        let current_amount = Money::zero(target_amount.currency().clone());

        Ok(Self {
            entity: Entity::restore(GoalId::new(), now, now),
            user_id,
            goal_type,
            title,
            target_amount,
            target_date,
            current_amount,
            monthly_contribution,
            active: true,
        })
    }

    /// Rehydrate a stored goal. The target date may already have passed.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: GoalId,
        user_id: UserId,
        goal_type: GoalType,
        title: impl Into<String>,
        target_amount: Money,
        target_date: DateTime<Utc>,
        current_amount: Money,
        monthly_contribution: Money,
        active: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> FinanceResult<Self> {
        let title = title.into();
        validate_title(&title)?;
        validate_target_amount(&target_amount)?;
        validate_non_negative(&current_amount, "current amount")?;
        validate_non_negative(&monthly_contribution, "monthly contribution")?;
        target_amount.ensure_same_currency(&current_amount, "restore goal")?;

        Ok(Self {
            entity: Entity::restore(id, created_at, updated_at),
            user_id,
            goal_type,
            title,
            target_amount,
            target_date,
            current_amount,
            monthly_contribution,
            active,
        })
    }

    /// Goal identity
    pub fn id(&self) -> GoalId {
        self.entity.id
    }

    /// Owner
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Goal type
    pub fn goal_type(&self) -> GoalType {
        self.goal_type
    }

    /// Title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Amount to reach
    pub fn target_amount(&self) -> &Money {
        &self.target_amount
    }

    /// Deadline
    pub fn target_date(&self) -> DateTime<Utc> {
        self.target_date
    }

    /// Amount saved so far
    pub fn current_amount(&self) -> &Money {
        &self.current_amount
    }

    /// Planned monthly contribution
    pub fn monthly_contribution(&self) -> &Money {
        &self.monthly_contribution
    }

    /// Whether the goal takes part in plan evaluation
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Creation time
    pub fn created_at(&self) -> DateTime<Utc> {
        self.entity.created_at
    }

    /// Last modification time
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.entity.updated_at
    }

    /// Progress of `current` toward the target; 100% when the target is zero
    pub fn calculate_progress(&self, current: &Money) -> FinanceResult<ProgressRate> {
        if self.target_amount.is_zero() {
            return ProgressRate::new(100.0);
        }
        self.target_amount.ensure_same_currency(current, "progress")?;
        ProgressRate::new(current.amount() / self.target_amount.amount() * 100.0)
    }

    /// Progress of the goal's own current amount
    pub fn progress(&self) -> FinanceResult<ProgressRate> {
        self.calculate_progress(&self.current_amount)
    }

    /// Current amount has reached the target (within one minor unit)
    pub fn is_completed(&self) -> bool {
        matches!(self.current_amount.greater_than(&self.target_amount), Ok(true))
            || matches!(self.current_amount.equals(&self.target_amount), Ok(true))
    }

    /// Past the deadline without being completed
    pub fn is_overdue(&self) -> bool {
        self.is_overdue_at(Utc::now())
    }

    /// [`Goal::is_overdue`] evaluated at `now`
    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        now > self.target_date && !self.is_completed()
    }

    /// Whole days until the deadline, zero once it has passed
    pub fn remaining_days(&self) -> i64 {
        self.remaining_days_at(Utc::now())
    }

    /// [`Goal::remaining_days`] evaluated at `now`
    pub fn remaining_days_at(&self, now: DateTime<Utc>) -> i64 {
        if self.target_date < now {
            return 0;
        }
        (self.target_date - now).num_hours() / 24
    }

    /// Target minus current amount; zero once completed
    pub fn remaining_amount(&self) -> FinanceResult<Money> {
        if self.is_completed() {
            return Ok(Money::zero(self.target_amount.currency().clone()));
        }
        self.target_amount.subtract(&self.current_amount)
    }

    /// Monthly saving needed to finish on time
    pub fn required_monthly_savings(&self) -> FinanceResult<Money> {
        self.required_monthly_savings_at(Utc::now())
    }

    /// [`Goal::required_monthly_savings`] evaluated at `now`.
    ///
    /// Spreads the remainder over the 30-day months left, never fewer than
    /// one. Once the deadline has passed the whole remainder is due.
    pub fn required_monthly_savings_at(&self, now: DateTime<Utc>) -> FinanceResult<Money> {
        let remaining = self.remaining_amount().context("remaining amount")?;
        if remaining.is_zero() || remaining.is_negative() {
            return Ok(Money::zero(remaining.currency().clone()));
        }

        let remaining_days = self.remaining_days_at(now);
        if remaining_days <= 0 {
            return Ok(remaining);
        }

        let months = (remaining_days as f64 / 30.0).max(1.0);
        Money::new(remaining.amount() / months, remaining.currency().clone())
    }

    /// Date the target would be reached saving `monthly_savings` a month
    pub fn estimate_completion_date(&self, monthly_savings: &Money) -> FinanceResult<DateTime<Utc>> {
        self.estimate_completion_date_at(monthly_savings, Utc::now())
    }

    /// [`Goal::estimate_completion_date`] evaluated at `now`; partial months
    /// are truncated
    pub fn estimate_completion_date_at(
        &self,
        monthly_savings: &Money,
        now: DateTime<Utc>,
    ) -> FinanceResult<DateTime<Utc>> {
        if monthly_savings.is_zero() || monthly_savings.is_negative() {
            return Err(FinanceError::ValidationError(
                "monthly savings must be positive".to_string(),
            ));
        }

        let remaining = self
            .target_amount
            .subtract(&self.current_amount)
            .context("remaining amount")?;
        if remaining.is_zero() || remaining.is_negative() {
            return Ok(now);
        }
        self.target_amount
            .ensure_same_currency(monthly_savings, "completion estimate")?;

        let months_needed = (remaining.amount() / monthly_savings.amount()).floor();
        let months = u32::try_from(months_needed as i64).map_err(|_| {
            FinanceError::InvalidPeriod(format!("{months_needed} months is out of range"))
        })?;

        now.checked_add_months(Months::new(months)).ok_or_else(|| {
            FinanceError::InvalidPeriod(format!("completion {months} months out is out of range"))
        })
    }

    /// Whether the profile's net savings can cover the remainder in time
    pub fn is_achievable(&self, profile: &FinancialProfile) -> FinanceResult<bool> {
        self.is_achievable_at(profile, Utc::now())
    }

    /// [`Goal::is_achievable`] evaluated at `now`.
    ///
    /// Months are counted as whole 30-day blocks until the deadline. Only
    /// structural problems, such as mismatched currencies, are errors.
    pub fn is_achievable_at(
        &self,
        profile: &FinancialProfile,
        now: DateTime<Utc>,
    ) -> FinanceResult<bool> {
        let net_savings = profile.calculate_net_savings().context("net savings")?;

        if net_savings.is_negative() || net_savings.is_zero() {
            return Ok(false);
        }
        if self.target_date < now {
            return Ok(false);
        }

        let months_until_target = (self.target_date - now).num_hours() / HOURS_PER_MONTH;
        if months_until_target <= 0 {
            return Ok(false);
        }

        let remaining = self
            .target_amount
            .subtract(&self.current_amount)
            .context("remaining amount")?;
        if remaining.is_zero() || remaining.is_negative() {
            return Ok(true);
        }
        net_savings.ensure_same_currency(&remaining, "achievability")?;

        let required = remaining.amount() / months_until_target as f64;
        let achievable = net_savings.amount() >= required;

        debug!(
            goal_id = %self.id(),
            months_until_target,
            required,
            achievable,
            "Evaluated goal achievability"
        );

        Ok(achievable)
    }

    /// Record the amount saved so far
    pub fn update_current_amount(&mut self, amount: Money) -> FinanceResult<()> {
        validate_non_negative(&amount, "current amount")?;
        self.target_amount
            .ensure_same_currency(&amount, "update current amount")?;
        self.current_amount = amount;
        self.entity.touch();
        Ok(())
    }

    /// Change the planned monthly contribution
    pub fn update_monthly_contribution(&mut self, contribution: Money) -> FinanceResult<()> {
        validate_non_negative(&contribution, "monthly contribution")?;
        self.monthly_contribution = contribution;
        self.entity.touch();
        Ok(())
    }

    /// Change the target amount
    pub fn update_target_amount(&mut self, amount: Money) -> FinanceResult<()> {
        validate_target_amount(&amount)?;
        amount.ensure_same_currency(&self.current_amount, "update target amount")?;
        self.target_amount = amount;
        self.entity.touch();
        Ok(())
    }

    /// Move the deadline; it must not lie in the past
    pub fn update_target_date(&mut self, date: DateTime<Utc>) -> FinanceResult<()> {
        self.update_target_date_at(date, Utc::now())
    }

    /// [`Goal::update_target_date`] evaluated at `now`
    pub fn update_target_date_at(
        &mut self,
        date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> FinanceResult<()> {
        validate_future_date(date, now)?;
        self.target_date = date;
        self.entity.touch();
        Ok(())
    }

    /// Rename the goal
    pub fn update_title(&mut self, title: impl Into<String>) -> FinanceResult<()> {
        let title = title.into();
        validate_title(&title)?;
        self.title = title;
        self.entity.touch();
        Ok(())
    }

    /// Include the goal in plan evaluation
    pub fn activate(&mut self) {
        self.active = true;
        self.entity.touch();
    }

    /// Exclude the goal from plan evaluation
    pub fn deactivate(&mut self) {
        self.active = false;
        self.entity.touch();
    }
}
