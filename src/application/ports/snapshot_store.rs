use crate::domain::value_objects::CacheNamespace;
use crate::shared::error::PersistenceError;
use async_trait::async_trait;

/// Durable key-value storage for serialized list snapshots, one blob per
/// namespace. Blobs are UTF-8 JSON; the store never inspects them.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn load(&self, namespace: &CacheNamespace) -> Result<Option<String>, PersistenceError>;

    async fn save(&self, namespace: &CacheNamespace, blob: String) -> Result<(), PersistenceError>;
}
