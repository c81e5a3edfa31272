// Copyright 2025 Cowboy AI, LLC.

//! The financial plan aggregate root

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::{
    EmergencyFundConfig, EmergencyFundStatus, GoalProgress, PlanProjection, ProgressStatus,
    ValidationFinding,
};
use crate::config::PlanningPolicy;
use crate::entities::{FinancialProfile, Goal, GoalType, RetirementData, MAX_PROJECTION_YEARS};
use crate::entity::{AggregateRoot, Entity, GoalId, PlanId, PlanMarker};
use crate::errors::{FinanceError, FinanceResult, ResultExt};

/// One person's plan: a profile, goals, optional retirement data and an
/// emergency reserve.
///
/// Every mutation goes through the plan so the cross-entity rules hold:
/// at most one active retirement goal, at most one active emergency goal,
/// every added goal achievable against the current profile, and one
/// currency (the income currency) across the profile, goals, retirement
/// data and emergency fund. Each accepted mutation stamps `updated_at` and
/// bumps the version.
///
/// ```mermaid
/// graph TD
///     Plan[FinancialPlan] --> Profile[FinancialProfile]
///     Plan --> Goals[Goal*]
///     Plan --> Retirement[RetirementData?]
///     Plan --> Emergency[EmergencyFundConfig]
///     Plan -->|generate_projection| Projection[PlanProjection]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialPlan {
    entity: Entity<PlanMarker>,
    profile: FinancialProfile,
    goals: Vec<Goal>,
    retirement_data: Option<RetirementData>,
    emergency_fund: EmergencyFundConfig,
    policy: PlanningPolicy,
    version: u64,
}

fn is_exclusive(goal_type: GoalType) -> bool {
    matches!(goal_type, GoalType::Retirement | GoalType::Emergency)
}

fn ensure_plan_currency(
    profile: &FinancialProfile,
    goals: &[Goal],
    retirement_data: Option<&RetirementData>,
    emergency_fund: &EmergencyFundConfig,
) -> FinanceResult<()> {
    let income = profile.monthly_income();
    income.ensure_same_currency(emergency_fund.current_fund(), "emergency fund")?;
    for goal in goals {
        income.ensure_same_currency(goal.target_amount(), "goal target")?;
    }
    if let Some(data) = retirement_data {
        income.ensure_same_currency(data.monthly_retirement_expenses(), "retirement data")?;
    }
    Ok(())
}

impl FinancialPlan {
    /// Create a plan under the default policy
    pub fn new(profile: FinancialProfile) -> FinanceResult<Self> {
        Self::with_policy(profile, PlanningPolicy::default())
    }

    /// Create a plan with the policy's default emergency reserve, held in
    /// the income currency
    pub fn with_policy(profile: FinancialProfile, policy: PlanningPolicy) -> FinanceResult<Self> {
        policy.validate()?;
        let emergency_fund =
            EmergencyFundConfig::default_for(profile.monthly_income().currency().clone(), &policy)?;

        let plan = Self {
            entity: Entity::new(),
            profile,
            goals: Vec::new(),
            retirement_data: None,
            emergency_fund,
            policy,
            version: 0,
        };

        info!(plan_id = %plan.id(), profile_id = %plan.profile.id(), "Created financial plan");
        Ok(plan)
    }

    /// Rehydrate a stored plan.
    ///
    /// Goal achievability is not re-checked, since it depends on when the
    /// plan is loaded. The exclusive goal-type rule, the emergency month
    /// limit and the single plan currency are.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: PlanId,
        profile: FinancialProfile,
        goals: Vec<Goal>,
        retirement_data: Option<RetirementData>,
        emergency_fund: EmergencyFundConfig,
        policy: PlanningPolicy,
        version: u64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> FinanceResult<Self> {
        policy.validate()?;
        if emergency_fund.target_months() > policy.max_emergency_months {
            return Err(FinanceError::InvariantViolation(format!(
                "emergency fund target of {} months exceeds the policy maximum of {}",
                emergency_fund.target_months(),
                policy.max_emergency_months
            )));
        }

        for goal_type in [GoalType::Retirement, GoalType::Emergency] {
            let active = goals
                .iter()
                .filter(|g| g.is_active() && g.goal_type() == goal_type)
                .count();
            if active > 1 {
                return Err(FinanceError::InvariantViolation(format!(
                    "plan holds {active} active {} goals",
                    goal_type.as_str()
                )));
            }
        }

        ensure_plan_currency(&profile, &goals, retirement_data.as_ref(), &emergency_fund)
            .map_err(|err| FinanceError::InvariantViolation(format!("stored plan: {err}")))?;

        Ok(Self {
            entity: Entity::restore(id, created_at, updated_at),
            profile,
            goals,
            retirement_data,
            emergency_fund,
            policy,
            version,
        })
    }

    /// The financial profile
    pub fn profile(&self) -> &FinancialProfile {
        &self.profile
    }

    /// Every goal, active or not, in insertion order
    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    /// Retirement data, if set
    pub fn retirement_data(&self) -> Option<&RetirementData> {
        self.retirement_data.as_ref()
    }

    /// Emergency reserve configuration
    pub fn emergency_fund(&self) -> &EmergencyFundConfig {
        &self.emergency_fund
    }

    /// Thresholds used by evaluation and validation
    pub fn policy(&self) -> &PlanningPolicy {
        &self.policy
    }

    /// Creation time
    pub fn created_at(&self) -> DateTime<Utc> {
        self.entity.created_at
    }

    /// Last modification time
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.entity.updated_at
    }

    fn record_change(&mut self) {
        self.entity.touch();
        self.increment_version();
    }

    fn has_active_goal_of(&self, goal_type: GoalType, except: Option<GoalId>) -> bool {
        self.goals.iter().any(|g| {
            g.goal_type() == goal_type && g.is_active() && Some(g.id()) != except
        })
    }

    /// Add a goal after checking the exclusive-type rule and achievability
    pub fn add_goal(&mut self, goal: Goal) -> FinanceResult<()> {
        self.add_goal_at(goal, Utc::now())
    }

    /// [`FinancialPlan::add_goal`] with achievability judged at `now`
    pub fn add_goal_at(&mut self, goal: Goal, now: DateTime<Utc>) -> FinanceResult<()> {
        let goal_type = goal.goal_type();
        if is_exclusive(goal_type) && self.has_active_goal_of(goal_type, None) {
            warn!(plan_id = %self.id(), goal_type = goal_type.as_str(), "Rejected duplicate goal");
            return Err(FinanceError::business_rule(format!(
                "an active {} goal already exists",
                goal_type.as_str()
            )));
        }

        let achievable = goal
            .is_achievable_at(&self.profile, now)
            .context("goal achievability")?;
        if !achievable {
            warn!(plan_id = %self.id(), goal_id = %goal.id(), "Rejected unachievable goal");
            return Err(FinanceError::business_rule(
                "goal is not achievable with the current finances; \
                 consider adjusting the target amount or date",
            ));
        }

        info!(plan_id = %self.id(), goal_id = %goal.id(), goal_type = goal_type.as_str(), "Added goal");
        self.goals.push(goal);
        self.record_change();
        Ok(())
    }

    /// Remove a goal and hand it back
    pub fn remove_goal(&mut self, goal_id: GoalId) -> FinanceResult<Goal> {
        let index = self
            .goals
            .iter()
            .position(|g| g.id() == goal_id)
            .ok_or_else(|| FinanceError::not_found("Goal", goal_id))?;

        let goal = self.goals.remove(index);
        self.record_change();
        info!(plan_id = %self.id(), goal_id = %goal_id, "Removed goal");
        Ok(goal)
    }

    /// Apply a fallible change to one goal.
    ///
    /// The change runs on a copy; the plan keeps the original when the
    /// change fails or would leave two active goals of an exclusive type.
    pub fn update_goal<F>(&mut self, goal_id: GoalId, change: F) -> FinanceResult<()>
    where
        F: FnOnce(&mut Goal) -> FinanceResult<()>,
    {
        let index = self
            .goals
            .iter()
            .position(|g| g.id() == goal_id)
            .ok_or_else(|| FinanceError::not_found("Goal", goal_id))?;

        let mut updated = self.goals[index].clone();
        change(&mut updated)?;

        let goal_type = updated.goal_type();
        if updated.is_active()
            && is_exclusive(goal_type)
            && self.has_active_goal_of(goal_type, Some(goal_id))
        {
            return Err(FinanceError::business_rule(format!(
                "an active {} goal already exists",
                goal_type.as_str()
            )));
        }

        self.goals[index] = updated;
        self.record_change();
        debug!(plan_id = %self.id(), goal_id = %goal_id, "Updated goal");
        Ok(())
    }

    /// Replace the financial profile.
    ///
    /// The new income currency must match the emergency fund, every goal and
    /// the retirement data. Existing goals are not re-judged for
    /// achievability; [`FinancialPlan::validate_plan`] reports them.
    pub fn update_profile(&mut self, profile: FinancialProfile) -> FinanceResult<()> {
        if let Err(err) = ensure_plan_currency(
            &profile,
            &self.goals,
            self.retirement_data.as_ref(),
            &self.emergency_fund,
        ) {
            warn!(plan_id = %self.id(), profile_id = %profile.id(), "Rejected profile in another currency");
            return Err(err);
        }

        info!(plan_id = %self.id(), profile_id = %profile.id(), "Replaced financial profile");
        self.profile = profile;
        self.record_change();
        Ok(())
    }

    /// Attach or replace retirement data held in the plan currency
    pub fn set_retirement_data(&mut self, retirement_data: RetirementData) -> FinanceResult<()> {
        self.profile
            .monthly_income()
            .ensure_same_currency(retirement_data.monthly_retirement_expenses(), "retirement data")?;

        info!(plan_id = %self.id(), retirement_id = %retirement_data.id(), "Set retirement data");
        self.retirement_data = Some(retirement_data);
        self.record_change();
        Ok(())
    }

    /// Replace the emergency reserve configuration
    pub fn update_emergency_fund(&mut self, config: EmergencyFundConfig) -> FinanceResult<()> {
        self.profile
            .monthly_income()
            .ensure_same_currency(config.current_fund(), "emergency fund")?;
        if config.target_months() > self.policy.max_emergency_months {
            return Err(FinanceError::ValidationError(format!(
                "emergency fund target cannot exceed {} months, got {}",
                self.policy.max_emergency_months,
                config.target_months()
            )));
        }

        info!(
            plan_id = %self.id(),
            target_months = config.target_months(),
            "Updated emergency fund"
        );
        self.emergency_fund = config;
        self.record_change();
        Ok(())
    }

    /// Project the plan `years` ahead, up to [`MAX_PROJECTION_YEARS`]
    pub fn generate_projection(&self, years: u32) -> FinanceResult<PlanProjection> {
        self.generate_projection_at(years, Utc::now())
    }

    /// [`FinancialPlan::generate_projection`] with goals evaluated at `now`
    pub fn generate_projection_at(
        &self,
        years: u32,
        now: DateTime<Utc>,
    ) -> FinanceResult<PlanProjection> {
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

        let asset_projections = self
            .profile
            .project_assets(years)
            .context("asset projection")?;

        let retirement_calculation = match &self.retirement_data {
            Some(data) => {
                let current_savings = self.profile.total_savings().context("current savings")?;
                let net_savings = self.profile.calculate_net_savings().context("net savings")?;
                let calculation = data
                    .calculate_retirement_sufficiency(
                        &current_savings,
                        &net_savings,
                        self.profile.investment_return(),
                        self.profile.inflation_rate(),
                    )
                    .context("retirement calculation")?;
                Some(calculation)
            }
            None => None,
        };

        let emergency_fund_status = self
            .calculate_emergency_fund_status()
            .context("emergency fund status")?;

        let mut goal_progress = Vec::new();
        for goal in self.goals.iter().filter(|g| g.is_active()) {
            let progress = goal.progress().context("goal progress")?;
            let status = self.evaluate_goal_progress(goal, now);
            goal_progress.push(GoalProgress::new(goal, progress, status));
        }

        debug!(
            plan_id = %self.id(),
            years,
            goals = goal_progress.len(),
            has_retirement = retirement_calculation.is_some(),
            "Generated plan projection"
        );

        Ok(PlanProjection {
            asset_projections,
            retirement_calculation,
            emergency_fund_status: Some(emergency_fund_status),
            goal_progress,
        })
    }

    /// Emergency reserve requirement against the current fund
    pub fn calculate_emergency_fund_status(&self) -> FinanceResult<EmergencyFundStatus> {
        let monthly_expenses = self.profile.total_expenses().context("monthly expenses")?;
        let net_savings = self.profile.calculate_net_savings().ok();
        EmergencyFundStatus::calculate(&self.emergency_fund, &monthly_expenses, net_savings.as_ref())
    }

    /// Judge one goal's progress at `now`.
    ///
    /// Expected progress grows linearly from creation to the deadline.
    pub fn evaluate_goal_progress(&self, goal: &Goal, now: DateTime<Utc>) -> ProgressStatus {
        let status = match goal.is_achievable_at(&self.profile, now) {
            Err(_) => ProgressStatus::EvaluationFailed,
            Ok(false) => ProgressStatus::NotAchievable,
            Ok(true) if goal.is_overdue_at(now) => ProgressStatus::Overdue,
            Ok(true) if goal.is_completed() => ProgressStatus::Completed,
            Ok(true) => self.compare_with_schedule(goal, now),
        };

        debug!(goal_id = %goal.id(), ?status, "Evaluated goal progress");
        status
    }

    fn compare_with_schedule(&self, goal: &Goal, now: DateTime<Utc>) -> ProgressStatus {
        let progress = match goal.progress() {
            Ok(progress) => progress,
            Err(_) => return ProgressStatus::EvaluationFailed,
        };

        let remaining_days = goal.remaining_days_at(now);
        if remaining_days <= 0 {
            return ProgressStatus::Overdue;
        }

        let total_days = (goal.target_date() - goal.created_at()).num_hours() / 24;
        let expected = if total_days <= 0 {
            100.0
        } else {
            (total_days - remaining_days) as f64 / total_days as f64 * 100.0
        };

        let actual = progress.as_percentage();
        if actual >= expected {
            ProgressStatus::OnTrack
        } else if actual >= expected * self.policy.mostly_on_track_factor {
            ProgressStatus::MostlyOnTrack
        } else {
            ProgressStatus::Behind
        }
    }

    /// Collect every advisory finding about the plan
    pub fn validate_plan(&self) -> Vec<ValidationFinding> {
        self.validate_plan_at(Utc::now())
    }

    /// [`FinancialPlan::validate_plan`] with goals judged at `now`
    pub fn validate_plan_at(&self, now: DateTime<Utc>) -> Vec<ValidationFinding> {
        let mut findings = Vec::new();

        if let Err(err) = self.profile.validate_financial_health_with(&self.policy) {
            findings.push(ValidationFinding::new("financial_profile", err.to_string()));
        }

        for (index, goal) in self.goals.iter().enumerate() {
            if !goal.is_active() {
                continue;
            }
            let field = format!("goals[{index}]");
            match goal.is_achievable_at(&self.profile, now) {
                Err(err) => findings.push(ValidationFinding::new(
                    field,
                    format!("goal achievability check failed: {err}"),
                )),
                Ok(false) => findings.push(ValidationFinding::new(
                    field,
                    "goal is not achievable with the current finances",
                )),
                Ok(true) => {}
            }
        }

        match self.calculate_emergency_fund_status() {
            Err(err) => findings.push(ValidationFinding::new(
                "emergency_fund",
                format!("emergency fund status could not be calculated: {err}"),
            )),
            Ok(status)
                if status.shortfall.is_positive()
                    && status.shortfall_ratio() > self.policy.emergency_shortfall_warning_ratio =>
            {
                findings.push(ValidationFinding::new(
                    "emergency_fund",
                    "emergency fund is far below its target; prioritise building the reserve",
                ));
            }
            Ok(_) => {}
        }

        for finding in &findings {
            warn!(plan_id = %self.id(), field = %finding.field, message = %finding.message, "Plan validation finding");
        }

        findings
    }

    /// Goals taking part in evaluation
    pub fn active_goals(&self) -> Vec<&Goal> {
        self.goals.iter().filter(|g| g.is_active()).collect()
    }

    /// Goals of one type, active or not
    pub fn goals_by_type(&self, goal_type: GoalType) -> Vec<&Goal> {
        self.goals
            .iter()
            .filter(|g| g.goal_type() == goal_type)
            .collect()
    }

    /// Look up a goal by id
    pub fn goal(&self, goal_id: GoalId) -> Option<&Goal> {
        self.goals.iter().find(|g| g.id() == goal_id)
    }

    /// An active retirement goal exists
    pub fn has_retirement_goal(&self) -> bool {
        self.has_active_goal_of(GoalType::Retirement, None)
    }

    /// An active emergency goal exists
    pub fn has_emergency_goal(&self) -> bool {
        self.has_active_goal_of(GoalType::Emergency, None)
    }
}

impl AggregateRoot for FinancialPlan {
    type Id = PlanId;

    fn id(&self) -> Self::Id {
        self.entity.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn increment_version(&mut self) {
        self.version += 1;
    }
}
