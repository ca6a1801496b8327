pub mod fetch_coordinator;
pub mod mutation_engine;
pub mod snapshot_service;
pub mod sync_engine;

pub use fetch_coordinator::{FetchCoordinator, FetchOutcome};
pub use mutation_engine::{MutationCommit, MutationEngine};
pub use snapshot_service::SnapshotService;
pub use sync_engine::{EngineViewState, SyncEngine};
