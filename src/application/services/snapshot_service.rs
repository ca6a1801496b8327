use crate::application::ports::SnapshotStore;
use crate::domain::entities::{CacheSnapshot, Entity};
use crate::domain::value_objects::CacheNamespace;
use crate::infrastructure::cache::EntityStore;
use crate::shared::metrics::EngineMetrics;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Debounced persistence between the in-memory store and the blob store.
/// Durability is best-effort: every failure is logged and swallowed, and
/// the in-memory store stays authoritative for the session.
pub struct SnapshotService {
    store: Arc<RwLock<EntityStore<Entity>>>,
    blobs: Arc<dyn SnapshotStore>,
    namespace: Arc<RwLock<CacheNamespace>>,
    debounce: Duration,
    save_armed: Arc<AtomicBool>,
    metrics: Arc<EngineMetrics>,
}

impl SnapshotService {
    pub fn new(
        store: Arc<RwLock<EntityStore<Entity>>>,
        blobs: Arc<dyn SnapshotStore>,
        namespace: CacheNamespace,
        debounce: Duration,
        metrics: Arc<EngineMetrics>,
    ) -> Self {
        Self {
            store,
            blobs,
            namespace: Arc::new(RwLock::new(namespace)),
            debounce,
            save_armed: Arc::new(AtomicBool::new(false)),
            metrics,
        }
    }

    /// Seeds the store from the persisted snapshot, if one parses. Called
    /// once per namespace before the first fetch so stale content renders
    /// while the refresh is in flight.
    pub async fn load_into(&self) -> bool {
        let namespace = self.namespace.read().await.clone();
        let blob = match self.blobs.load(&namespace).await {
            Ok(Some(blob)) => blob,
            Ok(None) => return false,
            Err(err) => {
                warn!(namespace = %namespace, error = %err, "snapshot load failed; starting cold");
                return false;
            }
        };

        match serde_json::from_str::<CacheSnapshot<Entity>>(&blob) {
            Ok(snapshot) => {
                let restored = snapshot.entities.len();
                self.store.write().await.restore(snapshot);
                debug!(namespace = %namespace, restored, "seeded store from snapshot");
                restored > 0
            }
            Err(err) => {
                warn!(namespace = %namespace, error = %err, "snapshot blob unreadable; starting cold");
                false
            }
        }
    }

    /// Arms one delayed save; calls inside the window coalesce into it.
    pub fn schedule_save(&self) {
        if self.save_armed.swap(true, Ordering::SeqCst) {
            return;
        }

        let store = self.store.clone();
        let blobs = self.blobs.clone();
        let namespace = self.namespace.clone();
        let armed = self.save_armed.clone();
        let metrics = self.metrics.clone();
        let debounce = self.debounce;

        tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            armed.store(false, Ordering::SeqCst);
            Self::persist(&store, blobs.as_ref(), &namespace, &metrics).await;
        });
    }

    /// Immediate save, for shutdown and context switches.
    pub async fn flush(&self) {
        Self::persist(&self.store, self.blobs.as_ref(), &self.namespace, &self.metrics).await;
    }

    pub async fn switch_namespace(&self, namespace: CacheNamespace) {
        *self.namespace.write().await = namespace;
    }

    async fn persist(
        store: &RwLock<EntityStore<Entity>>,
        blobs: &dyn SnapshotStore,
        namespace: &RwLock<CacheNamespace>,
        metrics: &EngineMetrics,
    ) {
        let snapshot = {
            let mut store = store.write().await;
            if !store.take_dirty() {
                return;
            }
            store.snapshot()
        };

        let blob = match serde_json::to_string(&snapshot) {
            Ok(blob) => blob,
            Err(err) => {
                warn!(error = %err, "snapshot serialization failed; skipping save");
                metrics.snapshot_saves.record_failure();
                return;
            }
        };

        let namespace = namespace.read().await.clone();
        match blobs.save(&namespace, blob).await {
            Ok(()) => {
                debug!(namespace = %namespace, entities = snapshot.entities.len(), "snapshot saved");
                metrics.snapshot_saves.record_ok();
            }
            Err(err) => {
                warn!(namespace = %namespace, error = %err, "snapshot save failed; keeping in-memory state");
                metrics.snapshot_saves.record_failure();
            }
        }
    }
}
