// Copyright 2025 Cowboy AI, LLC.

//! Domain services that work on values rather than on one aggregate

mod calculator;
mod goal_recommendation;

pub use calculator::{
    CompoundInterestResult, FinancialCalculator, InflationAdjustmentResult, RetirementNeedsResult,
};
pub use goal_recommendation::{
    Achievability, AdjustmentKind, GoalFeasibility, GoalRecommendation,
    GoalRecommendationService, RecommendationPriority, RecommendedValue, RiskLevel,
    SavingsRecommendation,
};
