use crate::application::ports::{Backend, MutationOutcome};
use crate::application::services::snapshot_service::SnapshotService;
use crate::domain::entities::{Entity, MessageRecord, PendingMutationRecord, RollbackPlan};
use crate::domain::value_objects::{EntityId, MutationKind, MutationPayload};
use crate::infrastructure::cache::EntityStore;
use crate::shared::error::MutationError;
use crate::shared::metrics::EngineMetrics;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

type PendingKey = (EntityId, MutationKind);

/// A confirmed mutation: the record as the store now holds it (`None`
/// after a committed removal) and which attempt finally landed.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationCommit {
    pub mutation_id: Uuid,
    pub entity: Option<Entity>,
    pub attempt: u32,
}

#[derive(Default)]
struct MutationLedger {
    pending: HashMap<PendingKey, PendingMutationRecord>,
    /// Failed tries per action since its last commit; feeds the attempt
    /// counter on the next pending record.
    failed_attempts: HashMap<PendingKey, u32>,
}

/// Applies user actions to the store before the backend confirms them,
/// tracking one pending record per `(entity, kind)` and reconciling on the
/// backend's answer: commit keeps the optimistic state (or an
/// authoritative replacement), any failure rolls back exactly.
pub struct MutationEngine {
    backend: Arc<dyn Backend>,
    store: Arc<RwLock<EntityStore<Entity>>>,
    ledger: RwLock<MutationLedger>,
    snapshots: Arc<SnapshotService>,
    metrics: Arc<EngineMetrics>,
}

impl MutationEngine {
    pub fn new(
        backend: Arc<dyn Backend>,
        store: Arc<RwLock<EntityStore<Entity>>>,
        snapshots: Arc<SnapshotService>,
        metrics: Arc<EngineMetrics>,
    ) -> Self {
        Self {
            backend,
            store,
            ledger: RwLock::new(MutationLedger::default()),
            snapshots,
            metrics,
        }
    }

    pub async fn apply(
        &self,
        entity_id: EntityId,
        kind: MutationKind,
        payload: MutationPayload,
    ) -> Result<MutationCommit, MutationError> {
        if payload.kind() != kind {
            return Err(MutationError::InvalidMutation(format!(
                "{} payload does not belong to a {kind} mutation",
                payload.kind()
            )));
        }
        let key = (entity_id.clone(), kind);

        // Optimistic apply. Everything in this block happens before the
        // backend call suspends, so the caller's next read already sees
        // the new state.
        let mutation_id = {
            let mut ledger = self.ledger.write().await;
            if ledger.pending.contains_key(&key) {
                return Err(MutationError::AlreadyPending { entity_id, kind });
            }

            let mut store = self.store.write().await;
            let rollback = Self::apply_optimistic(&mut store, &entity_id, kind, &payload)?;

            let attempt = ledger.failed_attempts.get(&key).copied().unwrap_or(0) + 1;
            let record = PendingMutationRecord::new(entity_id.clone(), kind, rollback, attempt);
            debug!(entity_id = %entity_id, kind = %kind, attempt, "applied optimistically");
            let mutation_id = record.mutation_id;
            ledger.pending.insert(key.clone(), record);
            mutation_id
        };
        self.snapshots.schedule_save();

        let outcome = self.backend.mutate(&entity_id, kind, &payload).await;

        let mut ledger = self.ledger.write().await;
        // Resolution is keyed by identity, not just (entity, kind): after a
        // reset cleared this record, a fresh mutation may already own the
        // key, and this outcome must not touch it.
        let record = match ledger.pending.remove(&key) {
            Some(record) if record.mutation_id == mutation_id => record,
            Some(replacement) => {
                ledger.pending.insert(key, replacement);
                debug!(entity_id = %entity_id, kind = %kind, "dropping outcome for a superseded mutation");
                return Err(MutationError::Superseded);
            }
            None => {
                // The context was reset while the call was in flight; the
                // store no longer holds anything this outcome could apply to.
                debug!(entity_id = %entity_id, kind = %kind, "dropping outcome for a superseded mutation");
                return Err(MutationError::Superseded);
            }
        };

        match outcome {
            MutationOutcome::Committed { authoritative } => {
                ledger.failed_attempts.remove(&key);
                let entity = {
                    let mut store = self.store.write().await;
                    Self::finalize_commit(&mut store, &entity_id, kind, authoritative)
                };
                drop(ledger);
                self.metrics.mutations.record_ok();
                self.snapshots.schedule_save();
                Ok(MutationCommit {
                    mutation_id: record.mutation_id,
                    entity,
                    attempt: record.attempt,
                })
            }
            MutationOutcome::Conflict { reason } => {
                self.resolve_failure(&mut ledger, key, &record).await;
                drop(ledger);
                self.snapshots.schedule_save();
                Err(MutationError::Conflict(reason))
            }
            MutationOutcome::Failed { reason } => {
                self.resolve_failure(&mut ledger, key, &record).await;
                drop(ledger);
                self.snapshots.schedule_save();
                Err(MutationError::Transient(reason))
            }
        }
    }

    pub async fn is_pending(&self, entity_id: &EntityId, kind: MutationKind) -> bool {
        let ledger = self.ledger.read().await;
        ledger.pending.contains_key(&(entity_id.clone(), kind))
    }

    pub async fn pending_count(&self) -> usize {
        self.ledger.read().await.pending.len()
    }

    pub async fn pending_records(&self) -> Vec<PendingMutationRecord> {
        let ledger = self.ledger.read().await;
        let mut records: Vec<_> = ledger.pending.values().cloned().collect();
        records.sort_by_key(|record| record.created_at);
        records
    }

    /// Context switch: in-flight outcomes resolve as superseded instead of
    /// touching the fresh store.
    pub async fn clear_pending(&self) {
        let mut ledger = self.ledger.write().await;
        ledger.pending.clear();
        ledger.failed_attempts.clear();
    }

    fn apply_optimistic(
        store: &mut EntityStore<Entity>,
        entity_id: &EntityId,
        kind: MutationKind,
        payload: &MutationPayload,
    ) -> Result<RollbackPlan, MutationError> {
        match kind {
            MutationKind::SendMessage => {
                let MutationPayload::Message { author, body } = payload else {
                    return Err(MutationError::InvalidMutation(
                        "send_message requires a message payload".to_string(),
                    ));
                };
                if store.get(entity_id).is_some() {
                    return Err(MutationError::InvalidMutation(format!(
                        "message id {entity_id} already exists"
                    )));
                }
                store.upsert(Entity::Message(MessageRecord::outgoing(
                    entity_id.clone(),
                    author.clone(),
                    body.clone(),
                )));
                Ok(RollbackPlan::EntityRemove)
            }
            MutationKind::RemoveItem => {
                match store.get(entity_id) {
                    None => return Err(MutationError::UnknownEntity(entity_id.clone())),
                    Some(Entity::CartItem(_)) => {}
                    Some(other) => {
                        return Err(MutationError::InvalidMutation(format!(
                            "remove_item cannot target a {}",
                            other.kind_name()
                        )))
                    }
                }
                let Some((snapshot, position)) = store.remove(entity_id) else {
                    return Err(MutationError::UnknownEntity(entity_id.clone()));
                };
                Ok(RollbackPlan::FieldRestore { snapshot, position })
            }
            MutationKind::Like | MutationKind::Vote | MutationKind::AdjustQuantity => {
                let Some(current) = store.get(entity_id) else {
                    return Err(MutationError::UnknownEntity(entity_id.clone()));
                };
                let mut updated = current.clone();
                let delta = updated.apply(kind, payload)?;
                store.upsert(updated);
                Ok(RollbackPlan::DeltaInvert { delta })
            }
        }
    }

    fn finalize_commit(
        store: &mut EntityStore<Entity>,
        entity_id: &EntityId,
        kind: MutationKind,
        authoritative: Option<Entity>,
    ) -> Option<Entity> {
        if kind == MutationKind::RemoveItem {
            return None;
        }

        let mut current = store.get(entity_id).cloned();
        if let Some(authoritative) = authoritative {
            if authoritative.id() == entity_id {
                store.upsert(authoritative.clone());
                current = Some(authoritative);
            } else {
                warn!(
                    expected = %entity_id,
                    received = %authoritative.id(),
                    "authoritative record id mismatch; keeping optimistic state"
                );
            }
        } else if kind == MutationKind::SendMessage {
            if let Some(Entity::Message(mut message)) = current.clone() {
                message.mark_sent();
                let entity = Entity::Message(message);
                store.upsert(entity.clone());
                current = Some(entity);
            }
        }
        current
    }

    async fn resolve_failure(
        &self,
        ledger: &mut MutationLedger,
        key: PendingKey,
        record: &PendingMutationRecord,
    ) {
        {
            let mut store = self.store.write().await;
            Self::roll_back(&mut store, record);
        }
        ledger.failed_attempts.insert(key, record.attempt);
        self.metrics.mutations.record_failure();
        debug!(
            entity_id = %record.entity_id,
            kind = %record.kind,
            attempt = record.attempt,
            "rolled back optimistic state"
        );
    }

    fn roll_back(store: &mut EntityStore<Entity>, record: &PendingMutationRecord) {
        match &record.rollback {
            RollbackPlan::DeltaInvert { delta } => {
                if let Some(current) = store.get(&record.entity_id) {
                    let mut reverted = current.clone();
                    reverted.invert(delta);
                    store.upsert(reverted);
                } else {
                    warn!(entity_id = %record.entity_id, "entity vanished before rollback");
                }
            }
            RollbackPlan::EntityRemove => {
                store.remove(&record.entity_id);
            }
            RollbackPlan::FieldRestore { snapshot, position } => {
                store.insert_at(*position, snapshot.clone());
            }
        }
    }
}
