// Copyright 2025 Cowboy AI, LLC.

//! Read models produced by a financial plan

use chrono::{DateTime, Utc};
use schemars::schema::RootSchema;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::EmergencyFundStatus;
use crate::entities::{AssetProjection, Goal, GoalType, ProgressRate, RetirementCalculation};
use crate::entity::GoalId;
use crate::value_objects::Money;

/// Everything a plan projects forward, merged into one report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PlanProjection {
    /// One point per projected year
    pub asset_projections: Vec<AssetProjection>,
    /// Present when the plan has retirement data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retirement_calculation: Option<RetirementCalculation>,
    /// Emergency reserve against its requirement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_fund_status: Option<EmergencyFundStatus>,
    /// One entry per active goal, in plan order
    pub goal_progress: Vec<GoalProgress>,
}

impl PlanProjection {
    /// JSON Schema for the serialized report
    pub fn json_schema() -> RootSchema {
        schema_for!(PlanProjection)
    }
}

/// The goal fields a progress report needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GoalSummary {
    /// Goal identity
    pub goal_id: GoalId,
    /// Goal type
    pub goal_type: GoalType,
    /// Title
    pub title: String,
    /// Amount to reach
    pub target_amount: Money,
    /// Amount saved so far
    pub current_amount: Money,
    /// Deadline
    pub target_date: DateTime<Utc>,
}

impl From<&Goal> for GoalSummary {
    fn from(goal: &Goal) -> Self {
        Self {
            goal_id: goal.id(),
            goal_type: goal.goal_type(),
            title: goal.title().to_string(),
            target_amount: goal.target_amount().clone(),
            current_amount: goal.current_amount().clone(),
            target_date: goal.target_date(),
        }
    }
}

/// Verdict of a goal progress evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    /// Target reached
    Completed,
    /// At or ahead of the time-proportional expectation
    OnTrack,
    /// Slightly behind, within the policy's tolerance
    MostlyOnTrack,
    /// Behind the expectation
    Behind,
    /// Deadline passed without completion
    Overdue,
    /// Current net savings cannot reach the target in time
    NotAchievable,
    /// Evaluation hit a structural error
    EvaluationFailed,
}

impl ProgressStatus {
    /// Whether this verdict counts as on track
    pub fn is_on_track(&self) -> bool {
        matches!(
            self,
            ProgressStatus::Completed | ProgressStatus::OnTrack | ProgressStatus::MostlyOnTrack
        )
    }

    /// Human-readable explanation
    pub fn message(&self) -> &'static str {
        match self {
            ProgressStatus::Completed => "goal achieved",
            ProgressStatus::OnTrack => "progressing on schedule",
            ProgressStatus::MostlyOnTrack => "mostly on track",
            ProgressStatus::Behind => {
                "progress is behind schedule; consider increasing monthly savings"
            }
            ProgressStatus::Overdue => "goal deadline has passed",
            ProgressStatus::NotAchievable => "goal is hard to reach at the current pace",
            ProgressStatus::EvaluationFailed => "progress could not be evaluated",
        }
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Progress report for one goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GoalProgress {
    /// The goal being reported on
    pub goal: GoalSummary,
    /// Current progress toward the target
    pub progress: ProgressRate,
    /// Verdict
    pub status: ProgressStatus,
    /// `status.is_on_track()`
    pub on_track: bool,
    /// `status.message()`
    pub message: String,
}

impl GoalProgress {
    /// Build a report entry from a goal, its progress and the verdict
    pub fn new(goal: &Goal, progress: ProgressRate, status: ProgressStatus) -> Self {
        Self {
            goal: GoalSummary::from(goal),
            progress,
            status,
            on_track: status.is_on_track(),
            message: status.message().to_string(),
        }
    }
}

/// One advisory finding from plan validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationFinding {
    /// Which part of the plan the finding is about
    /// (`financial_profile`, `goals[i]`, `emergency_fund`)
    pub field: String,
    /// What is wrong
    pub message: String,
}

impl ValidationFinding {
    /// Create a finding
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(ProgressStatus::Completed, true)]
    #[test_case(ProgressStatus::OnTrack, true)]
    #[test_case(ProgressStatus::MostlyOnTrack, true)]
    #[test_case(ProgressStatus::Behind, false)]
    #[test_case(ProgressStatus::Overdue, false)]
    #[test_case(ProgressStatus::NotAchievable, false)]
    #[test_case(ProgressStatus::EvaluationFailed, false)]
    fn on_track_verdicts(status: ProgressStatus, expected: bool) {
        assert_eq!(status.is_on_track(), expected);
    }

    #[test]
    fn status_serializes_in_snake_case() {
        let json = serde_json::to_string(&ProgressStatus::MostlyOnTrack).unwrap();
        assert_eq!(json, "\"mostly_on_track\"");
    }

    #[test]
    fn finding_display() {
        let finding = ValidationFinding::new("goals[2]", "goal is not achievable");
        assert_eq!(finding.to_string(), "goals[2]: goal is not achievable");
    }

    #[test]
    fn schema_describes_top_level_fields() {
        let schema = PlanProjection::json_schema();
        let json = serde_json::to_value(&schema).unwrap();
        let properties = json["properties"].as_object().unwrap();

        assert!(properties.contains_key("asset_projections"));
        assert!(properties.contains_key("goal_progress"));
        assert!(properties.contains_key("emergency_fund_status"));

        let required = json["required"].as_array().unwrap();
        assert!(!required.iter().any(|r| r == "retirement_calculation"));
    }
}
