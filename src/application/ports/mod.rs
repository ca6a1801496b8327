pub mod backend;
pub mod snapshot_store;

pub use backend::{Backend, MutationOutcome};
pub use snapshot_store::SnapshotStore;
