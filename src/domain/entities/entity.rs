use crate::domain::value_objects::{DeliveryStatus, EntityId, MutationKind, MutationPayload};
use crate::shared::error::MutationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: EntityId,
    pub version: u64,
    pub author: String,
    pub body: String,
    pub likes: i64,
    pub liked_by_me: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollOptionRecord {
    pub id: EntityId,
    pub version: u64,
    pub label: String,
    pub votes: i64,
    pub voted_by_me: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: EntityId,
    pub version: u64,
    pub author: String,
    pub body: String,
    pub status: DeliveryStatus,
    pub sent_at: DateTime<Utc>,
}

impl MessageRecord {
    /// A locally originated message, not yet confirmed by the backend.
    pub fn outgoing(id: EntityId, author: String, body: String) -> Self {
        Self {
            id,
            version: 1,
            author,
            body,
            status: DeliveryStatus::Sending,
            sent_at: Utc::now(),
        }
    }

    pub fn mark_sent(&mut self) {
        self.status = DeliveryStatus::Sent;
        self.version += 1;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItemRecord {
    pub id: EntityId,
    pub version: u64,
    pub title: String,
    pub unit_price_cents: i64,
    pub quantity: i64,
}

/// The closed set of records the engine manages. Every variant carries the
/// same `{id, version}` envelope; feed posts and photo-feed photos share
/// the `Post` variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entity {
    Post(PostRecord),
    PollOption(PollOptionRecord),
    Message(MessageRecord),
    CartItem(CartItemRecord),
}

/// What an optimistic apply did to an entity, captured so a rollback can
/// restore the pre-mutation state exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum AppliedDelta {
    LikeToggle { delta: i64 },
    VoteCast,
    QuantityShift { delta: i64 },
}

impl Entity {
    pub fn id(&self) -> &EntityId {
        match self {
            Entity::Post(record) => &record.id,
            Entity::PollOption(record) => &record.id,
            Entity::Message(record) => &record.id,
            Entity::CartItem(record) => &record.id,
        }
    }

    pub fn version(&self) -> u64 {
        match self {
            Entity::Post(record) => record.version,
            Entity::PollOption(record) => record.version,
            Entity::Message(record) => record.version,
            Entity::CartItem(record) => record.version,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Entity::Post(_) => "post",
            Entity::PollOption(_) => "poll_option",
            Entity::Message(_) => "message",
            Entity::CartItem(_) => "cart_item",
        }
    }

    /// Applies a delta-style mutation in place and returns the inverse
    /// bookkeeping. Creation (`SendMessage`) and removal (`RemoveItem`)
    /// operate on the store, not on an existing record, and never get here.
    pub fn apply(
        &mut self,
        kind: MutationKind,
        payload: &MutationPayload,
    ) -> Result<AppliedDelta, MutationError> {
        match (self, kind, payload) {
            (Entity::Post(post), MutationKind::Like, MutationPayload::Toggle) => {
                let delta = if post.liked_by_me { -1 } else { 1 };
                post.likes += delta;
                post.liked_by_me = !post.liked_by_me;
                post.version += 1;
                Ok(AppliedDelta::LikeToggle { delta })
            }
            (Entity::PollOption(option), MutationKind::Vote, MutationPayload::CastVote) => {
                if option.voted_by_me {
                    return Err(MutationError::InvalidMutation(format!(
                        "option {} already carries this client's vote",
                        option.id
                    )));
                }
                option.votes += 1;
                option.voted_by_me = true;
                option.version += 1;
                Ok(AppliedDelta::VoteCast)
            }
            (
                Entity::CartItem(item),
                MutationKind::AdjustQuantity,
                MutationPayload::Quantity { delta },
            ) => {
                if *delta == 0 {
                    return Err(MutationError::InvalidMutation(
                        "quantity delta of zero".to_string(),
                    ));
                }
                let next = item.quantity + delta;
                if next < 1 {
                    return Err(MutationError::InvalidMutation(format!(
                        "quantity of {} cannot drop below one (delta {delta})",
                        item.id
                    )));
                }
                item.quantity = next;
                item.version += 1;
                Ok(AppliedDelta::QuantityShift { delta: *delta })
            }
            (entity, kind, _) => Err(MutationError::InvalidMutation(format!(
                "{kind} cannot target a {}",
                entity.kind_name()
            ))),
        }
    }

    /// Exact inverse of `apply`. The delta always originates from the same
    /// entity, so a shape mismatch is a bug upstream; it is logged and the
    /// entity left untouched rather than corrupted further.
    pub fn invert(&mut self, delta: &AppliedDelta) {
        match (self, delta) {
            (Entity::Post(post), AppliedDelta::LikeToggle { delta }) => {
                post.likes -= delta;
                post.liked_by_me = !post.liked_by_me;
                post.version = post.version.saturating_sub(1);
            }
            (Entity::PollOption(option), AppliedDelta::VoteCast) => {
                option.votes -= 1;
                option.voted_by_me = false;
                option.version = option.version.saturating_sub(1);
            }
            (Entity::CartItem(item), AppliedDelta::QuantityShift { delta }) => {
                item.quantity -= delta;
                item.version = item.version.saturating_sub(1);
            }
            (entity, delta) => {
                tracing::warn!(
                    entity = entity.kind_name(),
                    ?delta,
                    "rollback delta does not match entity shape"
                );
            }
        }
    }
}
