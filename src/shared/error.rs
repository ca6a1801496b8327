use crate::domain::value_objects::{EntityId, MutationKind};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("fetch failed: {0}")]
    Transient(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    #[error("mutation rejected by the backend: {0}")]
    Conflict(String),

    #[error("mutation failed: {0}")]
    Transient(String),

    #[error("a {kind} mutation is already pending for {entity_id}")]
    AlreadyPending {
        entity_id: EntityId,
        kind: MutationKind,
    },

    #[error("unknown entity: {0}")]
    UnknownEntity(EntityId),

    #[error("invalid mutation: {0}")]
    InvalidMutation(String),

    #[error("context was reset while the mutation was in flight")]
    Superseded,
}

impl MutationError {
    /// Local rejections never reached the backend, so nothing was applied
    /// and nothing needs rolling back.
    pub fn is_local_rejection(&self) -> bool {
        matches!(
            self,
            MutationError::AlreadyPending { .. }
                | MutationError::UnknownEntity(_)
                | MutationError::InvalidMutation(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    #[error("snapshot serialization failed: {0}")]
    Serialization(String),

    #[error("snapshot storage failed: {0}")]
    Storage(String),
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        PersistenceError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for PersistenceError {
    fn from(err: std::io::Error) -> Self {
        PersistenceError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_failures_are_not_local_rejections() {
        assert!(!MutationError::Conflict("taken".to_string()).is_local_rejection());
        assert!(!MutationError::Transient("offline".to_string()).is_local_rejection());
        assert!(!MutationError::Superseded.is_local_rejection());
        assert!(MutationError::AlreadyPending {
            entity_id: EntityId::new("p1".to_string()).unwrap(),
            kind: MutationKind::Like,
        }
        .is_local_rejection());
        assert!(MutationError::InvalidMutation("nope".to_string()).is_local_rejection());
    }
}
