pub mod file_snapshot_store;
pub mod memory_snapshot_store;

pub use file_snapshot_store::FileSnapshotStore;
pub use memory_snapshot_store::MemorySnapshotStore;
