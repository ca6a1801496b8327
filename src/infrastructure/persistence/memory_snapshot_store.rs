use crate::application::ports::SnapshotStore;
use crate::domain::value_objects::CacheNamespace;
use crate::shared::error::PersistenceError;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Volatile snapshot storage for tests and sessions that opt out of disk
/// persistence.
pub struct MemorySnapshotStore {
    blobs: RwLock<HashMap<String, String>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
        }
    }

    /// Test seam: pre-seed a namespace as if a previous session saved it.
    pub async fn preload(&self, namespace: &CacheNamespace, blob: String) {
        let mut blobs = self.blobs.write().await;
        blobs.insert(namespace.as_str().to_string(), blob);
    }

    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }
}

impl Default for MemorySnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn load(&self, namespace: &CacheNamespace) -> Result<Option<String>, PersistenceError> {
        let blobs = self.blobs.read().await;
        Ok(blobs.get(namespace.as_str()).cloned())
    }

    async fn save(&self, namespace: &CacheNamespace, blob: String) -> Result<(), PersistenceError> {
        let mut blobs = self.blobs.write().await;
        blobs.insert(namespace.as_str().to_string(), blob);
        Ok(())
    }
}
