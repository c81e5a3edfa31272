// Copyright 2025 Cowboy AI, LLC.

//! The financial plan aggregate and the reports it produces

mod emergency_fund;
mod financial_plan;
mod projection;

pub use emergency_fund::{EmergencyFundConfig, EmergencyFundStatus};
pub use financial_plan::FinancialPlan;
pub use projection::{
    GoalProgress, GoalSummary, PlanProjection, ProgressStatus, ValidationFinding,
};
