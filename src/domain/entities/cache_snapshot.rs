use crate::domain::value_objects::EntityId;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// The persisted shape of one list: records plus their display order,
/// stamped with the save time (unix ms). Serialized as UTF-8 JSON.
/// There is no schema version field; the blob is best-effort cache, and a
/// parse failure on load is treated as a cold start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(serialize = "R: Serialize", deserialize = "R: DeserializeOwned"))]
pub struct CacheSnapshot<R> {
    pub entities: Vec<R>,
    pub order: Vec<EntityId>,
    pub saved_at: i64,
}

impl<R> CacheSnapshot<R> {
    pub fn new(entities: Vec<R>, order: Vec<EntityId>, saved_at: i64) -> Self {
        Self {
            entities,
            order,
            saved_at,
        }
    }
}
