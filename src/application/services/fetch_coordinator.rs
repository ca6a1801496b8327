use crate::application::ports::Backend;
use crate::domain::entities::Entity;
use crate::domain::value_objects::PageCursor;
use crate::infrastructure::cache::EntityStore;
use crate::shared::error::FetchError;
use crate::shared::metrics::EngineMetrics;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Fetched { appended: usize },
    /// A fetch was already in flight; the call did nothing.
    AlreadyInFlight,
    /// The list previously terminated; the call did nothing.
    Exhausted,
    /// The context was reset while the response was in flight; the
    /// response was discarded.
    Superseded,
}

#[derive(Debug)]
struct FetchState {
    cursor: Option<PageCursor>,
    has_more: bool,
    in_flight: bool,
    generation: u64,
}

impl FetchState {
    fn new() -> Self {
        Self {
            cursor: None,
            has_more: true,
            in_flight: false,
            generation: 0,
        }
    }
}

/// Cursor-paginated retrieval for one logical list: at most one fetch in
/// flight, terminal `has_more`, and retry-from-same-position on failure.
pub struct FetchCoordinator {
    backend: Arc<dyn Backend>,
    store: Arc<RwLock<EntityStore<Entity>>>,
    state: RwLock<FetchState>,
    metrics: Arc<EngineMetrics>,
}

impl FetchCoordinator {
    pub fn new(
        backend: Arc<dyn Backend>,
        store: Arc<RwLock<EntityStore<Entity>>>,
        metrics: Arc<EngineMetrics>,
    ) -> Self {
        Self {
            backend,
            store,
            state: RwLock::new(FetchState::new()),
            metrics,
        }
    }

    pub async fn fetch_next(&self) -> Result<FetchOutcome, FetchError> {
        let (cursor, generation) = {
            let mut state = self.state.write().await;
            if state.in_flight {
                return Ok(FetchOutcome::AlreadyInFlight);
            }
            if !state.has_more {
                return Ok(FetchOutcome::Exhausted);
            }
            state.in_flight = true;
            (state.cursor.clone(), state.generation)
        };

        let result = self.backend.fetch_page(cursor.clone()).await;

        let mut state = self.state.write().await;
        if state.generation != generation {
            // The in_flight flag belongs to the new context now; leave it.
            debug!("discarding fetch response for a superseded context");
            return Ok(FetchOutcome::Superseded);
        }
        state.in_flight = false;

        let page = match result {
            Ok(page) => page,
            Err(err) => {
                // Cursor and has_more are untouched so an explicit retry
                // resumes from the same position.
                self.metrics.fetches.record_failure();
                return Err(err);
            }
        };
        self.metrics.fetches.record_ok();

        let appended = page.items.len();
        let terminal = page.is_terminal();
        if appended > 0 {
            let mut store = self.store.write().await;
            if cursor.is_none() {
                store.replace_all(page.items);
            } else {
                store.append(page.items);
            }
        }

        if terminal {
            state.has_more = false;
        } else {
            state.cursor = page.next_cursor;
        }

        debug!(appended, has_more = state.has_more, "page applied");
        Ok(FetchOutcome::Fetched { appended })
    }

    /// Context switch: clears the cursor, reopens the list, and bumps the
    /// generation so any in-flight response is discarded on arrival.
    pub async fn reset(&self) {
        let mut state = self.state.write().await;
        state.generation += 1;
        state.cursor = None;
        state.has_more = true;
        state.in_flight = false;
    }

    pub async fn has_more(&self) -> bool {
        self.state.read().await.has_more
    }

    pub async fn is_fetching(&self) -> bool {
        self.state.read().await.in_flight
    }

    pub async fn cursor(&self) -> Option<PageCursor> {
        self.state.read().await.cursor.clone()
    }
}
