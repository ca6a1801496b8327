pub mod config;
pub mod error;
pub mod metrics;

pub use config::EngineConfig;
pub use error::{FetchError, MutationError, PersistenceError};
pub use metrics::{EngineMetrics, MetricsSnapshot, OpStats};
