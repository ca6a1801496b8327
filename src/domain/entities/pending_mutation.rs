use super::entity::{AppliedDelta, Entity};
use crate::domain::value_objects::{EntityId, MutationKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How to undo one optimistic apply, chosen by mutation kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum RollbackPlan {
    /// Re-apply the captured delta inverted (likes, votes, quantities).
    DeltaInvert { delta: AppliedDelta },
    /// Drop the locally created entity (failed message send).
    EntityRemove,
    /// Reinstate a captured record at its former display position
    /// (failed cart-item removal).
    FieldRestore { snapshot: Entity, position: usize },
}

/// An optimistic change the backend has not confirmed yet. The record is
/// created at apply time and destroyed at reconciliation; its lifecycle is
/// `Applied -> {Committed, RolledBack}` with no way back to pending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingMutationRecord {
    pub mutation_id: Uuid,
    pub entity_id: EntityId,
    pub kind: MutationKind,
    pub rollback: RollbackPlan,
    pub created_at: DateTime<Utc>,
    /// 1 for the first try; counts retries of the same action since the
    /// last commit.
    pub attempt: u32,
}

impl PendingMutationRecord {
    pub fn new(entity_id: EntityId, kind: MutationKind, rollback: RollbackPlan, attempt: u32) -> Self {
        Self {
            mutation_id: Uuid::new_v4(),
            entity_id,
            kind,
            rollback,
            created_at: Utc::now(),
            attempt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_carry_distinct_ids() {
        let id = EntityId::new("p1".to_string()).unwrap();
        let a = PendingMutationRecord::new(
            id.clone(),
            MutationKind::Like,
            RollbackPlan::DeltaInvert {
                delta: AppliedDelta::LikeToggle { delta: 1 },
            },
            1,
        );
        let b =
            PendingMutationRecord::new(id, MutationKind::SendMessage, RollbackPlan::EntityRemove, 2);
        assert_ne!(a.mutation_id, b.mutation_id);
        assert_eq!(b.attempt, 2);
    }
}
