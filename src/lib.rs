pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;

pub use application::ports::{Backend, MutationOutcome, SnapshotStore};
pub use application::services::{
    EngineViewState, FetchCoordinator, FetchOutcome, MutationCommit, MutationEngine,
    SnapshotService, SyncEngine,
};
pub use domain::entities::{
    AppliedDelta, CacheSnapshot, CartItemRecord, Entity, MessageRecord, Page,
    PendingMutationRecord, PollOptionRecord, PostRecord, RollbackPlan,
};
pub use domain::value_objects::{
    CacheNamespace, DeliveryStatus, EntityId, MutationKind, MutationPayload, PageCursor,
};
pub use infrastructure::backend::SimulatedBackend;
pub use infrastructure::cache::{EntityStore, StoreRecord};
pub use infrastructure::persistence::{FileSnapshotStore, MemorySnapshotStore};
pub use shared::config::EngineConfig;
pub use shared::error::{FetchError, MutationError, PersistenceError};
pub use shared::metrics::MetricsSnapshot;
