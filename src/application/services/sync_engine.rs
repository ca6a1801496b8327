use crate::application::ports::{Backend, SnapshotStore};
use crate::application::services::fetch_coordinator::{FetchCoordinator, FetchOutcome};
use crate::application::services::mutation_engine::{MutationCommit, MutationEngine};
use crate::application::services::snapshot_service::SnapshotService;
use crate::domain::entities::{Entity, PendingMutationRecord};
use crate::domain::value_objects::{CacheNamespace, EntityId, MutationKind, MutationPayload};
use crate::infrastructure::cache::EntityStore;
use crate::shared::config::EngineConfig;
use crate::shared::error::{FetchError, MutationError};
use crate::shared::metrics::{EngineMetrics, MetricsSnapshot};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// What a caller renders from: the display order plus the list-level
/// flags. `error` tracks the last fetch failure; mutation failures are
/// surfaced per call instead.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineViewState {
    pub ordered_ids: Vec<EntityId>,
    pub loading: bool,
    pub error: Option<String>,
    pub has_more: bool,
    pub pending_mutations: usize,
}

/// One engine instance per logical list, explicitly constructed and
/// passed to consumers; nothing here is ambient module state.
pub struct SyncEngine {
    store: Arc<RwLock<EntityStore<Entity>>>,
    fetcher: FetchCoordinator,
    mutations: MutationEngine,
    snapshots: Arc<SnapshotService>,
    last_error: RwLock<Option<String>>,
    metrics: Arc<EngineMetrics>,
}

impl SyncEngine {
    pub fn new(
        backend: Arc<dyn Backend>,
        blobs: Arc<dyn SnapshotStore>,
        namespace: CacheNamespace,
        config: &EngineConfig,
    ) -> Self {
        let store = Arc::new(RwLock::new(EntityStore::new()));
        let metrics = Arc::new(EngineMetrics::new());
        let snapshots = Arc::new(SnapshotService::new(
            store.clone(),
            blobs,
            namespace,
            Duration::from_millis(config.persistence.save_debounce_ms),
            metrics.clone(),
        ));
        let fetcher = FetchCoordinator::new(backend.clone(), store.clone(), metrics.clone());
        let mutations =
            MutationEngine::new(backend, store.clone(), snapshots.clone(), metrics.clone());

        Self {
            store,
            fetcher,
            mutations,
            snapshots,
            last_error: RwLock::new(None),
            metrics,
        }
    }

    /// Seeds the store from the persisted cache, once, before the first
    /// fetch. Returns whether anything was restored; callers typically
    /// render the stale content and call `fetch_next` in parallel.
    pub async fn bootstrap(&self) -> bool {
        self.snapshots.load_into().await
    }

    pub async fn fetch_next(&self) -> Result<FetchOutcome, FetchError> {
        match self.fetcher.fetch_next().await {
            Ok(outcome) => {
                if matches!(outcome, FetchOutcome::Fetched { .. }) {
                    *self.last_error.write().await = None;
                    self.snapshots.schedule_save();
                }
                Ok(outcome)
            }
            Err(err) => {
                *self.last_error.write().await = Some(err.to_string());
                Err(err)
            }
        }
    }

    pub async fn mutate(
        &self,
        entity_id: EntityId,
        kind: MutationKind,
        payload: MutationPayload,
    ) -> Result<MutationCommit, MutationError> {
        self.mutations.apply(entity_id, kind, payload).await
    }

    /// Context switch (changing the active conversation, poll, or search
    /// query). The current state is flushed to its namespace, in-flight
    /// work is superseded, and the list starts over; passing a namespace
    /// additionally repoints persistence and seeds from that cache.
    /// Returns whether a cached snapshot was restored.
    pub async fn reset_context(&self, namespace: Option<CacheNamespace>) -> bool {
        self.snapshots.flush().await;
        self.fetcher.reset().await;
        self.mutations.clear_pending().await;
        {
            let mut store = self.store.write().await;
            store.clear();
            store.mark_clean();
        }
        *self.last_error.write().await = None;

        match namespace {
            Some(namespace) => {
                self.snapshots.switch_namespace(namespace).await;
                self.snapshots.load_into().await
            }
            None => false,
        }
    }

    pub async fn view_state(&self) -> EngineViewState {
        let ordered_ids = self.store.read().await.ordered_ids().to_vec();
        EngineViewState {
            ordered_ids,
            loading: self.fetcher.is_fetching().await,
            error: self.last_error.read().await.clone(),
            has_more: self.fetcher.has_more().await,
            pending_mutations: self.mutations.pending_count().await,
        }
    }

    pub async fn entity(&self, id: &EntityId) -> Option<Entity> {
        self.store.read().await.get(id).cloned()
    }

    pub async fn ordered_entities(&self) -> Vec<Entity> {
        self.store.read().await.ordered()
    }

    pub async fn is_pending(&self, entity_id: &EntityId, kind: MutationKind) -> bool {
        self.mutations.is_pending(entity_id, kind).await
    }

    pub async fn pending_records(&self) -> Vec<PendingMutationRecord> {
        self.mutations.pending_records().await
    }

    /// Immediate snapshot save, for shutdown paths.
    pub async fn flush(&self) {
        self.snapshots.flush().await;
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}
