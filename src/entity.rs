// Copyright 2025 Cowboy AI, LLC.

//! Entity identity and lifecycle metadata

use chrono::{DateTime, Utc};
use schemars::gen::SchemaGenerator;
use schemars::schema::Schema;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use uuid::Uuid;

/// Identity plus creation/update timestamps shared by every entity
///
/// Financial entities embed this instead of carrying their own id and
/// timestamp fields, so `touch` is the only way `updated_at` moves.
///
/// # Examples
///
/// ```rust
/// use finplan_domain::{Entity, GoalMarker};
///
/// let goal = Entity::<GoalMarker>::new();
/// assert_eq!(goal.created_at, goal.updated_at);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity<T> {
    /// The unique identifier for this entity
    pub id: EntityId<T>,
    /// When this entity was created
    pub created_at: DateTime<Utc>,
    /// When this entity was last updated
    pub updated_at: DateTime<Utc>,
}

impl<T> Entity<T> {
    /// Create a new entity with a generated ID
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Rehydrate an entity from stored identity and timestamps
    pub fn restore(id: EntityId<T>, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self {
        Self {
            id,
            created_at,
            updated_at,
        }
    }

    /// Update the entity's timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl<T> Default for Entity<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A typed entity ID using phantom types for type safety
///
/// The phantom parameter keeps a goal id from being passed where a plan id
/// is expected.
///
/// ```rust
/// use finplan_domain::{GoalId, PlanId};
///
/// let goal_id = GoalId::new();
/// let plan_id = PlanId::new();
/// // let _: GoalId = plan_id; // does not compile
/// assert_ne!(goal_id.as_uuid(), plan_id.as_uuid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId<T> {
    id: Uuid,
    #[serde(skip)]
    _phantom: PhantomData<T>,
}

impl<T> EntityId<T> {
    /// Create a new random entity ID
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            _phantom: PhantomData,
        }
    }

    /// Create an entity ID from a UUID
    pub fn from_uuid(id: Uuid) -> Self {
        Self {
            id,
            _phantom: PhantomData,
        }
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.id
    }
}

impl<T> fmt::Display for EntityId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl<T> Default for EntityId<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<EntityId<T>> for Uuid {
    fn from(id: EntityId<T>) -> Self {
        id.id
    }
}

impl<T> JsonSchema for EntityId<T> {
    fn is_referenceable() -> bool {
        false
    }

    fn schema_name() -> String {
        "EntityId".to_string()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        let mut schema = String::json_schema(gen).into_object();
        schema.format = Some("uuid".to_string());
        schema.into()
    }
}

/// Marker trait for aggregate roots
///
/// All changes to entities within an aggregate go through the root. The
/// version is bumped on every accepted mutation so a storage layer can
/// detect lost updates.
pub trait AggregateRoot: Sized {
    /// The type of ID for this aggregate
    type Id: Copy + Eq + Send + Sync;

    /// Get the aggregate's ID
    fn id(&self) -> Self::Id;

    /// Get the aggregate's version for optimistic concurrency
    fn version(&self) -> u64;

    /// Increment the version
    fn increment_version(&mut self);
}

// Marker types for entity IDs
/// Marker for user (plan owner) identities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserMarker;

/// Marker for financial profiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProfileMarker;

/// Marker for goals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GoalMarker;

/// Marker for retirement data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RetirementMarker;

/// Marker for financial plans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlanMarker;

/// Identity of the user owning profiles, goals and plans
pub type UserId = EntityId<UserMarker>;
/// Identity of a financial profile
pub type ProfileId = EntityId<ProfileMarker>;
/// Identity of a goal
pub type GoalId = EntityId<GoalMarker>;
/// Identity of retirement data
pub type RetirementDataId = EntityId<RetirementMarker>;
/// Identity of a financial plan
pub type PlanId = EntityId<PlanMarker>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::thread;

    /// Test entity creation with generated ID
    ///
    /// ```mermaid
    /// graph LR
    ///     A[Entity::new] -->|Generates| B[UUID]
    ///     A -->|Sets| C[created_at]
    ///     A -->|Sets| D[updated_at]
    ///     C -->|Equals| D
    /// ```
    #[test]
    fn test_entity_new() {
        let entity: Entity<GoalMarker> = Entity::new();

        assert!(!entity.id.as_uuid().is_nil());
        assert_eq!(entity.created_at, entity.updated_at);
    }

    #[test]
    fn test_entity_restore_keeps_identity() {
        let id = GoalId::new();
        let created = Utc::now() - Duration::days(30);
        let updated = Utc::now() - Duration::days(2);

        let entity = Entity::restore(id, created, updated);

        assert_eq!(entity.id, id);
        assert_eq!(entity.created_at, created);
        assert_eq!(entity.updated_at, updated);
    }

    #[test]
    fn test_entity_touch() {
        let mut entity: Entity<PlanMarker> = Entity::new();
        let original_created = entity.created_at;
        let original_updated = entity.updated_at;
        let original_id = entity.id;

        thread::sleep(std::time::Duration::from_millis(5));
        entity.touch();

        assert_eq!(entity.id, original_id);
        assert_eq!(entity.created_at, original_created);
        assert!(entity.updated_at > original_updated);
    }

    #[test]
    fn test_entity_id_uniqueness() {
        let id1 = GoalId::new();
        let id2 = GoalId::new();

        assert_ne!(id1, id2);
        assert!(!id1.as_uuid().is_nil());
    }

    #[test]
    fn test_entity_id_display_and_uuid() {
        let uuid = Uuid::new_v4();
        let id = PlanId::from_uuid(uuid);

        assert_eq!(format!("{id}"), format!("{uuid}"));
        assert_eq!(Uuid::from(id), uuid);
    }

    /// Ids serialize as bare UUID strings
    #[test]
    fn test_entity_id_serde() {
        let original = ProfileId::new();

        let json = serde_json::to_string(&original).unwrap();
        assert_eq!(json, format!("\"{}\"", original.as_uuid()));

        let deserialized: ProfileId = serde_json::from_str(&json).unwrap();
        assert_eq!(original, deserialized);
    }

    #[test]
    fn test_entity_serde() {
        let original = Entity::<RetirementMarker>::new();

        let json = serde_json::to_string(&original).unwrap();
        let deserialized: Entity<RetirementMarker> = serde_json::from_str(&json).unwrap();

        assert_eq!(original, deserialized);
    }

    struct TestAggregate {
        id: PlanId,
        version: u64,
    }

    impl AggregateRoot for TestAggregate {
        type Id = PlanId;

        fn id(&self) -> Self::Id {
            self.id
        }

        fn version(&self) -> u64 {
            self.version
        }

        fn increment_version(&mut self) {
            self.version += 1;
        }
    }

    #[test]
    fn test_aggregate_root() {
        let mut aggregate = TestAggregate {
            id: PlanId::new(),
            version: 0,
        };
        let original_id = aggregate.id();

        aggregate.increment_version();
        aggregate.increment_version();

        assert_eq!(aggregate.version(), 2);
        assert_eq!(aggregate.id(), original_id);
    }
}
