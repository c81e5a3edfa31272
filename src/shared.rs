// Copyright 2025 Cowboy AI, LLC.

//! Shared access to one plan across async tasks

use std::sync::Arc;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use crate::aggregates::{FinancialPlan, PlanProjection};
use crate::entity::{AggregateRoot, PlanId};
use crate::errors::FinanceResult;

/// Cloneable handle to a plan behind an async read/write lock.
///
/// Readers run concurrently; a writer waits for exclusive access, so at
/// most one task mutates the plan at a time.
#[derive(Debug, Clone)]
pub struct SharedPlan {
    id: PlanId,
    inner: Arc<RwLock<FinancialPlan>>,
}

impl SharedPlan {
    /// Take ownership of a plan
    pub fn new(plan: FinancialPlan) -> Self {
        Self {
            id: plan.id(),
            inner: Arc::new(RwLock::new(plan)),
        }
    }

    /// Identity of the wrapped plan
    pub fn id(&self) -> PlanId {
        self.id
    }

    /// Shared read access
    pub async fn read(&self) -> RwLockReadGuard<'_, FinancialPlan> {
        self.inner.read().await
    }

    /// Exclusive write access
    pub async fn write(&self) -> RwLockWriteGuard<'_, FinancialPlan> {
        self.inner.write().await
    }

    /// Run a fallible change under the write lock
    pub async fn update<T, F>(&self, change: F) -> FinanceResult<T>
    where
        F: FnOnce(&mut FinancialPlan) -> FinanceResult<T>,
    {
        let mut plan = self.inner.write().await;
        let before = plan.version();
        let result = change(&mut *plan);
        debug!(
            plan_id = %self.id,
            from_version = before,
            to_version = plan.version(),
            ok = result.is_ok(),
            "Applied shared plan update"
        );
        result
    }

    /// Clone of the current state
    pub async fn snapshot(&self) -> FinancialPlan {
        self.inner.read().await.clone()
    }

    /// Current aggregate version
    pub async fn version(&self) -> u64 {
        self.inner.read().await.version()
    }

    /// Project the current state under a read lock
    pub async fn generate_projection(&self, years: u32) -> FinanceResult<PlanProjection> {
        self.inner.read().await.generate_projection(years)
    }
}

impl From<FinancialPlan> for SharedPlan {
    fn from(plan: FinancialPlan) -> Self {
        Self::new(plan)
    }
}
