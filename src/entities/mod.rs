// Copyright 2025 Cowboy AI, LLC.

//! Entities owned by a financial plan
//!
//! Each entity carries an [`Entity`](crate::Entity) header with its typed id
//! and timestamps, validates on construction and re-validates on update.

mod goal;
mod profile;
mod retirement;

pub use goal::{Goal, GoalType, ProgressRate};
pub use profile::{
    AssetProjection, ExpenseCollection, ExpenseItem, FinancialProfile, SavingsCollection,
    SavingsItem, MAX_PROJECTION_YEARS,
};
pub use retirement::{RetirementCalculation, RetirementData};
