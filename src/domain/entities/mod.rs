pub mod cache_snapshot;
pub mod entity;
pub mod page;
pub mod pending_mutation;

pub use cache_snapshot::CacheSnapshot;
pub use entity::{AppliedDelta, CartItemRecord, Entity, MessageRecord, PollOptionRecord, PostRecord};
pub use page::Page;
pub use pending_mutation::{PendingMutationRecord, RollbackPlan};
