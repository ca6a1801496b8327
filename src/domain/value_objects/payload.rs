use super::mutation_kind::MutationKind;
use serde::{Deserialize, Serialize};

/// Kind-specific input carried alongside a mutation. Each variant belongs
/// to exactly one `MutationKind`; the engine rejects mismatched pairs
/// before anything is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MutationPayload {
    /// Like toggle; direction is derived from the entity's current state.
    Toggle,
    CastVote,
    Message { author: String, body: String },
    Quantity { delta: i64 },
    Removal,
}

impl MutationPayload {
    pub fn kind(&self) -> MutationKind {
        match self {
            MutationPayload::Toggle => MutationKind::Like,
            MutationPayload::CastVote => MutationKind::Vote,
            MutationPayload::Message { .. } => MutationKind::SendMessage,
            MutationPayload::Quantity { .. } => MutationKind::AdjustQuantity,
            MutationPayload::Removal => MutationKind::RemoveItem,
        }
    }
}
