// Copyright 2025 Cowboy AI, LLC.

//! # FinPlan Domain
//!
//! Domain model for personal financial planning: value objects for money,
//! rates and periods, the entities that describe a household's finances,
//! and the plan aggregate that ties them together.
//!
//! - **Value Objects**: [`Money`], [`Currency`], [`Rate`], [`Period`]
//! - **Entities**: [`FinancialProfile`], [`Goal`], [`RetirementData`]
//! - **Aggregate**: [`FinancialPlan`] enforces goal exclusivity and
//!   achievability, and produces [`PlanProjection`] reports
//! - **Services**: [`FinancialCalculator`] for standalone time-value math,
//!   [`GoalRecommendationService`] for savings advice and goal adjustments
//! - **Sharing**: [`SharedPlan`] serializes writers across async tasks
//!
//! ## Design Principles
//!
//! 1. **Type Safety**: phantom-typed identities keep goal, plan and user
//!    ids apart at compile time
//! 2. **Validated Construction**: every constructor and deserializer checks
//!    its invariants, so an existing value is a valid value
//! 3. **Currency Discipline**: arithmetic across currencies is an error,
//!    never a silent conversion
//! 4. **Deterministic Time**: anything that depends on "now" has an `_at`
//!    variant taking the instant explicitly
//!
//! ```
//! use finplan_domain::{ExpenseItem, FinancialPlan, FinancialProfile, Money, Rate, UserId};
//!
//! let yen = |v| Money::jpy(v).unwrap();
//! let profile = FinancialProfile::new(
//!     UserId::new(),
//!     yen(400_000.0),
//!     vec![ExpenseItem::new("living", yen(260_000.0))].into(),
//!     Default::default(),
//!     Rate::from_percentage(5.0).unwrap(),
//!     Rate::from_percentage(2.0).unwrap(),
//! )
//! .unwrap();
//!
//! let plan = FinancialPlan::new(profile).unwrap();
//! let status = plan.calculate_emergency_fund_status().unwrap();
//! assert_eq!(status.required_amount, yen(780_000.0));
//! ```

#![warn(missing_docs)]

pub mod aggregates;
pub mod config;
pub mod entities;
mod entity;
pub mod errors;
pub mod services;
mod shared;
pub mod value_objects;

// Re-export core types
pub use aggregates::{
    EmergencyFundConfig, EmergencyFundStatus, FinancialPlan, GoalProgress, GoalSummary,
    PlanProjection, ProgressStatus, ValidationFinding,
};
pub use config::{PlanningPolicy, MAX_EMERGENCY_MONTHS};
pub use entities::{
    AssetProjection, ExpenseCollection, ExpenseItem, FinancialProfile, Goal, GoalType,
    ProgressRate, RetirementCalculation, RetirementData, SavingsCollection, SavingsItem,
    MAX_PROJECTION_YEARS,
};
pub use entity::{AggregateRoot, Entity, EntityId};
pub use entity::{GoalId, PlanId, ProfileId, RetirementDataId, UserId};
pub use errors::{FinanceError, FinanceResult, ResultExt};
pub use services::{
    Achievability, AdjustmentKind, CompoundInterestResult, FinancialCalculator, GoalFeasibility,
    GoalRecommendation, GoalRecommendationService, InflationAdjustmentResult,
    RecommendationPriority, RecommendedValue, RetirementNeedsResult, RiskLevel,
    SavingsRecommendation,
};
pub use shared::SharedPlan;
pub use value_objects::{Currency, Money, Period, Rate};

pub mod markers {
    //! Marker types for phantom type parameters
    pub use crate::entity::{GoalMarker, PlanMarker, ProfileMarker, RetirementMarker, UserMarker};
}

// Entity doctests name markers at the crate root
pub use markers::*;
