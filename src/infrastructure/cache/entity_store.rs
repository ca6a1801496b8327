use crate::domain::entities::{CacheSnapshot, Entity};
use crate::domain::value_objects::EntityId;
use chrono::Utc;
use std::collections::HashMap;

/// Anything the store can hold: cloneable and identified by a stable id.
pub trait StoreRecord: Clone {
    fn record_id(&self) -> &EntityId;
}

impl StoreRecord for Entity {
    fn record_id(&self) -> &EntityId {
        self.id()
    }
}

/// Normalized in-memory map of records plus an explicit ordered id list
/// for display. Map iteration order is never used for rendering; the
/// order list is the only source of sequence, since pagination appends.
///
/// Mutating calls set the dirty flag so the snapshot service knows a save
/// is due; the flag is consumed with `take_dirty`.
#[derive(Debug, Clone)]
pub struct EntityStore<R: StoreRecord> {
    records: HashMap<EntityId, R>,
    order: Vec<EntityId>,
    dirty: bool,
}

impl<R: StoreRecord> EntityStore<R> {
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
            order: Vec::new(),
            dirty: false,
        }
    }

    pub fn get(&self, id: &EntityId) -> Option<&R> {
        self.records.get(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn ordered_ids(&self) -> &[EntityId] {
        &self.order
    }

    pub fn ordered(&self) -> Vec<R> {
        self.order
            .iter()
            .filter_map(|id| self.records.get(id).cloned())
            .collect()
    }

    /// Id-keyed overwrite; a known id keeps its display position, a new id
    /// is appended. Applying the same record twice yields the same state.
    pub fn upsert(&mut self, record: R) {
        let id = record.record_id().clone();
        if self.records.insert(id.clone(), record).is_none() {
            self.order.push(id);
        }
        self.dirty = true;
    }

    /// Removes a record, returning it together with its display position
    /// so a rollback can reinstate it where it was.
    pub fn remove(&mut self, id: &EntityId) -> Option<(R, usize)> {
        let record = self.records.remove(id)?;
        let position = self
            .order
            .iter()
            .position(|known| known == id)
            .unwrap_or(self.order.len());
        if position < self.order.len() {
            self.order.remove(position);
        }
        self.dirty = true;
        Some((record, position))
    }

    /// Reinstates a record at a display position (clamped to the current
    /// length). If the id reappeared in the meantime, this degrades to an
    /// overwrite in place so the order list stays duplicate-free.
    pub fn insert_at(&mut self, position: usize, record: R) {
        let id = record.record_id().clone();
        if self.records.contains_key(&id) {
            self.upsert(record);
            return;
        }
        self.records.insert(id.clone(), record);
        let position = position.min(self.order.len());
        self.order.insert(position, id);
        self.dirty = true;
    }

    /// First-page refresh only. Replacing mid-sequence would corrupt the
    /// caller's scroll position, so callers gate this on `cursor == None`.
    pub fn replace_all(&mut self, records: Vec<R>) {
        self.records.clear();
        self.order.clear();
        for record in records {
            self.upsert(record);
        }
        self.dirty = true;
    }

    /// Later pages. Known ids are refreshed in place, new ids appended.
    pub fn append(&mut self, records: Vec<R>) {
        for record in records {
            self.upsert(record);
        }
        self.dirty = true;
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.order.clear();
        self.dirty = true;
    }

    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub fn snapshot(&self) -> CacheSnapshot<R> {
        CacheSnapshot::new(
            self.ordered(),
            self.order.clone(),
            Utc::now().timestamp_millis(),
        )
    }

    /// Rebuilds the store from a persisted snapshot. Order entries without
    /// a matching record are dropped; records missing from the order list
    /// are appended after it, so a damaged blob still loads usably.
    pub fn restore(&mut self, snapshot: CacheSnapshot<R>) {
        self.records.clear();
        self.order.clear();
        let mut by_id: HashMap<EntityId, R> = snapshot
            .entities
            .into_iter()
            .map(|record| (record.record_id().clone(), record))
            .collect();
        for id in snapshot.order {
            if let Some(record) = by_id.remove(&id) {
                self.records.insert(id.clone(), record);
                self.order.push(id);
            }
        }
        let mut leftovers: Vec<R> = by_id.into_values().collect();
        leftovers.sort_by(|a, b| a.record_id().as_str().cmp(b.record_id().as_str()));
        for record in leftovers {
            let id = record.record_id().clone();
            self.records.insert(id.clone(), record);
            self.order.push(id);
        }
        self.dirty = false;
    }
}

impl<R: StoreRecord> Default for EntityStore<R> {
    fn default() -> Self {
        Self::new()
    }
}
