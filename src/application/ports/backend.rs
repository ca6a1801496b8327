use crate::domain::entities::{Entity, Page};
use crate::domain::value_objects::{EntityId, MutationKind, MutationPayload, PageCursor};
use crate::shared::error::FetchError;
use async_trait::async_trait;

/// How the backend answered a mutation. Conflicts and failures are both
/// resolved outcomes; transport errors map to `Failed` so a pending
/// mutation can never be left dangling.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    Committed {
        /// Optional authoritative replacement for the mutated record. When
        /// present it overwrites the optimistic state wholesale.
        authoritative: Option<Entity>,
    },
    Conflict {
        reason: String,
    },
    Failed {
        reason: String,
    },
}

/// The single logical backend this client talks to. One implementation is
/// the simulated fixed-delay collaborator; real transports are additional
/// implementations of this trait, not a redesign.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn fetch_page(&self, cursor: Option<PageCursor>) -> Result<Page, FetchError>;

    async fn mutate(
        &self,
        entity_id: &EntityId,
        kind: MutationKind,
        payload: &MutationPayload,
    ) -> MutationOutcome;
}
