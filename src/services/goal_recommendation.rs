// Copyright 2025 Cowboy AI, LLC.

//! Savings recommendations, goal adjustments and feasibility analysis
//!
//! ```mermaid
//! graph LR
//!     G[Goal] --> S[GoalRecommendationService]
//!     P[FinancialProfile] --> S
//!     S -->|recommend_monthly_savings| SR[SavingsRecommendation]
//!     S -->|suggest_goal_adjustments| GR[GoalRecommendation*]
//!     S -->|analyze_goal_feasibility| GF[GoalFeasibility]
//! ```

use chrono::{DateTime, Months, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::entities::{FinancialProfile, Goal, GoalType, ProgressRate};
use crate::errors::{FinanceResult, ResultExt};
use crate::value_objects::{Money, Period, Rate};

/// Deadlines this close (in months) make a savings recommendation urgent
const URGENT_MONTHS: i64 = 6;

/// A monthly gap above this amount makes a savings recommendation urgent
const LARGE_MONTHLY_GAP: f64 = 50_000.0;

/// Goals with fewer days left than this get no investment advice
const MIN_INVESTMENT_DAYS: i64 = 365;

/// Returns at or above this percentage need no investment advice
const ADEQUATE_RETURN_PERCENT: f64 = 5.0;

/// How soon a recommendation should be acted on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationPriority {
    /// Act now
    High,
    /// Act soon
    Medium,
    /// Worth considering
    Low,
}

/// How demanding a recommended monthly saving is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Achievability {
    /// Nothing left to save
    Completed,
    /// The deadline has passed
    Overdue,
    /// Up to 10,000 a month
    Easy,
    /// Up to 50,000 a month
    WithEffort,
    /// Up to 100,000 a month
    NeedsPlanning,
    /// More than 100,000 a month
    NeedsLifestyleChange,
}

impl Achievability {
    fn for_monthly_amount(amount: f64) -> Self {
        match amount {
            a if a <= 10_000.0 => Achievability::Easy,
            a if a <= 50_000.0 => Achievability::WithEffort,
            a if a <= 100_000.0 => Achievability::NeedsPlanning,
            _ => Achievability::NeedsLifestyleChange,
        }
    }
}

/// Risk that a goal will be missed, from required savings against net savings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Requires at most half of net savings
    Low,
    /// Requires at most 80% of net savings
    Medium,
    /// Requires more, or the household is not saving
    High,
    /// The requirement could not be computed
    Unknown,
}

/// Which lever an adjustment pulls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentKind {
    /// Save more each month
    IncreaseSavings,
    /// Move the deadline out
    ExtendDeadline,
    /// Lower the target amount
    ReduceTarget,
    /// Spend less each month
    ReduceExpenses,
    /// Seek a better investment return
    InvestmentStrategy,
}

/// The concrete value an adjustment proposes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RecommendedValue {
    /// New monthly saving
    MonthlySavings(Money),
    /// New deadline
    TargetDate(DateTime<Utc>),
    /// New target amount
    TargetAmount(Money),
    /// Monthly spending to cut
    ExpenseReduction(Money),
    /// Annual return to aim for
    InvestmentReturn(Rate),
}

/// One suggested change to a goal or to the finances behind it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GoalRecommendation {
    /// Lever pulled
    pub kind: AdjustmentKind,
    /// Short headline
    pub title: String,
    /// What to change
    pub description: String,
    /// Urgency
    pub priority: RecommendationPriority,
    /// Expected effect
    pub impact: String,
    /// Proposed value
    pub new_value: RecommendedValue,
    /// Why the change is suggested
    pub reason: String,
}

/// Monthly saving needed to finish a goal on time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SavingsRecommendation {
    /// Monthly saving that finishes the goal on time
    pub recommended_amount: Money,
    /// Recommended amount minus the goal's current monthly contribution
    pub current_gap: Money,
    /// Urgency
    pub priority: RecommendationPriority,
    /// Explanation of the figure
    pub rationale: String,
    /// How demanding the figure is
    pub achievability: Achievability,
}

/// Snapshot of a goal's feasibility against a profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GoalFeasibility {
    /// Goal category
    pub goal_type: GoalType,
    /// Target amount
    pub target_amount: Money,
    /// Amount saved so far
    pub current_amount: Money,
    /// Whole days until the deadline
    pub remaining_days: i64,
    /// Profile's monthly net savings
    pub net_savings: Money,
    /// Monthly saving that finishes the goal on time
    pub required_monthly_savings: Money,
    /// Whether net savings cover the remainder in time
    pub achievable: bool,
    /// Progress so far
    pub progress: ProgressRate,
    /// Risk of missing the goal
    pub risk_level: RiskLevel,
}

/// Advice on how to reach a goal.
///
/// Like [`FinancialCalculator`](crate::FinancialCalculator) it holds no
/// state. Anything that depends on "now" has an `_at` variant.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoalRecommendationService;

impl GoalRecommendationService {
    /// Create a service
    pub fn new() -> Self {
        Self
    }

    /// Monthly saving that finishes `goal` within `time_remaining`
    pub fn recommend_monthly_savings(
        &self,
        goal: &Goal,
        time_remaining: Period,
    ) -> FinanceResult<SavingsRecommendation> {
        let remaining = goal.remaining_amount().context("remaining amount")?;
        let currency = remaining.currency().clone();

        if !remaining.is_positive() {
            return Ok(SavingsRecommendation {
                recommended_amount: Money::zero(currency.clone()),
                current_gap: Money::zero(currency),
                priority: RecommendationPriority::Low,
                rationale: "the goal has already been reached".to_string(),
                achievability: Achievability::Completed,
            });
        }

        let months = time_remaining.to_months();
        if months <= 0 {
            return Ok(SavingsRecommendation {
                recommended_amount: remaining.clone(),
                current_gap: remaining,
                priority: RecommendationPriority::High,
                rationale: "the deadline has passed; the remainder is due now".to_string(),
                achievability: Achievability::Overdue,
            });
        }

        let recommended_amount = Money::new(remaining.amount() / months as f64, currency)?;
        let current_gap = recommended_amount
            .subtract(goal.monthly_contribution())
            .context("gap to current contribution")?;
        let priority = savings_priority(goal.goal_type(), &current_gap, months);

        debug!(
            goal_id = %goal.id(),
            months,
            recommended = recommended_amount.amount(),
            ?priority,
            "Recommended monthly savings"
        );

        Ok(SavingsRecommendation {
            rationale: format!(
                "reaching the {} goal takes {recommended_amount} a month over the remaining {months} months",
                goal.goal_type().as_str()
            ),
            achievability: Achievability::for_monthly_amount(recommended_amount.amount()),
            recommended_amount,
            current_gap,
            priority,
        })
    }

    /// Adjustments that would make an unachievable goal reachable
    pub fn suggest_goal_adjustments(
        &self,
        goal: &Goal,
        profile: &FinancialProfile,
    ) -> FinanceResult<Vec<GoalRecommendation>> {
        self.suggest_goal_adjustments_at(goal, profile, Utc::now())
    }

    /// [`GoalRecommendationService::suggest_goal_adjustments`] evaluated at
    /// `now`.
    ///
    /// An achievable goal gets no suggestions. Otherwise the candidates are
    /// checked in a fixed order: more savings, a later deadline, a smaller
    /// target, lower spending, then investment strategy.
    pub fn suggest_goal_adjustments_at(
        &self,
        goal: &Goal,
        profile: &FinancialProfile,
        now: DateTime<Utc>,
    ) -> FinanceResult<Vec<GoalRecommendation>> {
        if goal
            .is_achievable_at(profile, now)
            .context("goal achievability")?
        {
            return Ok(Vec::new());
        }

        let net_savings = profile.calculate_net_savings().context("net savings")?;
        let required = goal
            .required_monthly_savings_at(now)
            .context("required monthly savings")?;

        let savings_increase = if net_savings.is_positive() {
            increase_savings(goal, &net_savings, &required)?
        } else {
            None
        };

        let candidates = [
            savings_increase,
            extend_deadline(goal, &net_savings, now)?,
            reduce_target(goal, &net_savings, now)?,
            reduce_expenses(profile, &net_savings, &required)?,
            investment_strategy(goal, profile, now),
        ];
        let recommendations: Vec<_> = candidates.into_iter().flatten().collect();

        debug!(
            goal_id = %goal.id(),
            count = recommendations.len(),
            "Suggested goal adjustments"
        );
        Ok(recommendations)
    }

    /// Feasibility of `goal` against `profile`
    pub fn analyze_goal_feasibility(
        &self,
        goal: &Goal,
        profile: &FinancialProfile,
    ) -> FinanceResult<GoalFeasibility> {
        self.analyze_goal_feasibility_at(goal, profile, Utc::now())
    }

    /// [`GoalRecommendationService::analyze_goal_feasibility`] evaluated at `now`
    pub fn analyze_goal_feasibility_at(
        &self,
        goal: &Goal,
        profile: &FinancialProfile,
        now: DateTime<Utc>,
    ) -> FinanceResult<GoalFeasibility> {
        let net_savings = profile.calculate_net_savings().context("net savings")?;
        let required_monthly_savings = goal
            .required_monthly_savings_at(now)
            .context("required monthly savings")?;
        let achievable = goal
            .is_achievable_at(profile, now)
            .context("goal achievability")?;
        let progress = goal.progress().context("goal progress")?;

        Ok(GoalFeasibility {
            goal_type: goal.goal_type(),
            target_amount: goal.target_amount().clone(),
            current_amount: goal.current_amount().clone(),
            remaining_days: goal.remaining_days_at(now),
            risk_level: self.assess_risk_level_at(goal, profile, now),
            net_savings,
            required_monthly_savings,
            achievable,
            progress,
        })
    }

    /// Risk of missing `goal` with the profile's net savings
    pub fn assess_risk_level(&self, goal: &Goal, profile: &FinancialProfile) -> RiskLevel {
        self.assess_risk_level_at(goal, profile, Utc::now())
    }

    /// [`GoalRecommendationService::assess_risk_level`] evaluated at `now`
    pub fn assess_risk_level_at(
        &self,
        goal: &Goal,
        profile: &FinancialProfile,
        now: DateTime<Utc>,
    ) -> RiskLevel {
        let net_savings = match profile.calculate_net_savings() {
            Ok(net) if !net.is_negative() => net,
            _ => return RiskLevel::High,
        };
        let required = match goal.required_monthly_savings_at(now) {
            Ok(required) => required,
            Err(_) => return RiskLevel::Unknown,
        };

        if required.is_zero() {
            return RiskLevel::Low;
        }
        if net_savings.is_zero() {
            return RiskLevel::High;
        }

        let ratio = required.amount() / net_savings.amount();
        if ratio <= 0.5 {
            RiskLevel::Low
        } else if ratio <= 0.8 {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }
}

fn savings_priority(goal_type: GoalType, gap: &Money, months: i64) -> RecommendationPriority {
    if goal_type == GoalType::Emergency || months <= URGENT_MONTHS {
        return RecommendationPriority::High;
    }
    if gap.amount() > LARGE_MONTHLY_GAP {
        return RecommendationPriority::High;
    }
    if goal_type == GoalType::Retirement {
        return RecommendationPriority::Medium;
    }
    RecommendationPriority::Low
}

fn increase_savings(
    goal: &Goal,
    net_savings: &Money,
    required: &Money,
) -> FinanceResult<Option<GoalRecommendation>> {
    if net_savings.greater_than(required)? {
        return Ok(None);
    }

    let additional = required.subtract(goal.monthly_contribution())?;
    Ok(Some(GoalRecommendation {
        kind: AdjustmentKind::IncreaseSavings,
        title: "Increase monthly savings".to_string(),
        description: format!("raise monthly savings to {required}"),
        priority: RecommendationPriority::High,
        impact: "the goal can be reached by its deadline".to_string(),
        new_value: RecommendedValue::MonthlySavings(required.clone()),
        reason: format!("the current contribution falls {additional} a month short"),
    }))
}

fn extend_deadline(
    goal: &Goal,
    net_savings: &Money,
    now: DateTime<Utc>,
) -> FinanceResult<Option<GoalRecommendation>> {
    if !net_savings.is_positive() {
        return Ok(None);
    }
    let remaining = goal.remaining_amount()?;
    if !remaining.is_positive() {
        return Ok(None);
    }
    net_savings.ensure_same_currency(&remaining, "deadline extension")?;

    let months_needed = (remaining.amount() / net_savings.amount()).ceil();
    let Some(new_date) = u32::try_from(months_needed as i64)
        .ok()
        .and_then(|months| now.checked_add_months(Months::new(months)))
    else {
        return Ok(None);
    };
    if new_date < goal.target_date() {
        return Ok(None);
    }

    let extension = months_needed as i64 - goal.remaining_days_at(now) / 30;
    Ok(Some(GoalRecommendation {
        kind: AdjustmentKind::ExtendDeadline,
        title: "Extend the deadline".to_string(),
        description: format!(
            "move the deadline {extension} months later, to {}",
            new_date.format("%Y-%m")
        ),
        priority: RecommendationPriority::Medium,
        impact: "the goal can be reached at the current savings pace".to_string(),
        new_value: RecommendedValue::TargetDate(new_date),
        reason: "a deadline that matches current saving capacity".to_string(),
    }))
}

fn reduce_target(
    goal: &Goal,
    net_savings: &Money,
    now: DateTime<Utc>,
) -> FinanceResult<Option<GoalRecommendation>> {
    if !net_savings.is_positive() {
        return Ok(None);
    }
    let remaining_days = goal.remaining_days_at(now);
    if remaining_days <= 0 {
        return Ok(None);
    }

    let saveable = net_savings.multiply_by((remaining_days / 30) as f64)?;
    let new_target = goal.current_amount().add(&saveable)?;
    if !new_target.less_than(goal.target_amount())? {
        return Ok(None);
    }

    let reduction = goal.target_amount().subtract(&new_target)?;
    Ok(Some(GoalRecommendation {
        kind: AdjustmentKind::ReduceTarget,
        title: "Adjust the target amount".to_string(),
        description: format!("lower the target to {new_target}"),
        priority: RecommendationPriority::Low,
        impact: "the target becomes reachable with current savings".to_string(),
        new_value: RecommendedValue::TargetAmount(new_target),
        reason: format!("the target exceeds current saving capacity by {reduction}"),
    }))
}

fn reduce_expenses(
    profile: &FinancialProfile,
    net_savings: &Money,
    required: &Money,
) -> FinanceResult<Option<GoalRecommendation>> {
    let shortfall = required.subtract(net_savings)?;
    if !shortfall.is_positive() {
        return Ok(None);
    }

    let share_of_income = shortfall.amount() / profile.monthly_income().amount() * 100.0;
    Ok(Some(GoalRecommendation {
        kind: AdjustmentKind::ReduceExpenses,
        title: "Review spending".to_string(),
        description: format!(
            "cut monthly spending by {shortfall} ({share_of_income:.1}% of income)"
        ),
        priority: RecommendationPriority::Medium,
        impact: "frees the monthly savings the goal needs".to_string(),
        new_value: RecommendedValue::ExpenseReduction(shortfall),
        reason: "current income leaves too little to save".to_string(),
    }))
}

fn investment_strategy(
    goal: &Goal,
    profile: &FinancialProfile,
    now: DateTime<Utc>,
) -> Option<GoalRecommendation> {
    if goal.remaining_days_at(now) < MIN_INVESTMENT_DAYS {
        return None;
    }
    let current = profile.investment_return();
    if current.as_percentage() >= ADEQUATE_RETURN_PERCENT {
        return None;
    }

    let (target_percent, strategy) = match goal.goal_type() {
        GoalType::Retirement => (6.0, "long horizon; consider an equity-weighted portfolio"),
        GoalType::Emergency => (2.0, "keep the reserve safe in deposits or government bonds"),
        GoalType::Savings | GoalType::Custom => (4.0, "consider balanced investment funds"),
    };
    let target = Rate::from_percentage(target_percent).ok()?;
    if !target.greater_than(current) {
        return None;
    }

    Some(GoalRecommendation {
        kind: AdjustmentKind::InvestmentStrategy,
        title: "Review investment strategy".to_string(),
        description: format!("aim for an annual return of {target_percent:.1}%"),
        priority: RecommendationPriority::Medium,
        impact: "compounding makes the goal easier to reach".to_string(),
        new_value: RecommendedValue::InvestmentReturn(target),
        reason: strategy.to_string(),
    })
}
