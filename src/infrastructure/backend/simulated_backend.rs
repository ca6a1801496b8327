use crate::application::ports::{Backend, MutationOutcome};
use crate::domain::entities::Page;
use crate::domain::value_objects::{EntityId, MutationKind, MutationPayload, PageCursor};
use crate::shared::config::SimulationConfig;
use crate::shared::error::FetchError;
use async_trait::async_trait;
use rand::Rng;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

const FIRST_PAGE_KEY: &str = "";

/// Scripted backend with fixed-delay responses, standing in for a real
/// transport. Pages are keyed by the cursor that requests them; mutation
/// outcomes are scripted per kind and default to a plain commit.
pub struct SimulatedBackend {
    latency: Duration,
    jitter_ms: u64,
    pages: RwLock<HashMap<String, Page>>,
    mutation_outcomes: RwLock<HashMap<MutationKind, MutationOutcome>>,
    fail_next_fetch: AtomicBool,
    fetch_calls: AtomicU64,
    mutation_calls: AtomicU64,
}

impl SimulatedBackend {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            jitter_ms: 0,
            pages: RwLock::new(HashMap::new()),
            mutation_outcomes: RwLock::new(HashMap::new()),
            fail_next_fetch: AtomicBool::new(false),
            fetch_calls: AtomicU64::new(0),
            mutation_calls: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        let mut backend = Self::new(Duration::from_millis(config.latency_ms));
        backend.jitter_ms = config.jitter_ms;
        backend
    }

    /// Serves `page` for the fetch that presents `after` as its cursor
    /// (`None` scripts the first page).
    pub async fn script_page(&self, after: Option<&PageCursor>, page: Page) {
        let key = after
            .map(|cursor| cursor.as_str().to_string())
            .unwrap_or_else(|| FIRST_PAGE_KEY.to_string());
        let mut pages = self.pages.write().await;
        pages.insert(key, page);
    }

    /// Every mutation of `kind` resolves with `outcome` until re-scripted.
    pub async fn script_mutation_outcome(&self, kind: MutationKind, outcome: MutationOutcome) {
        let mut outcomes = self.mutation_outcomes.write().await;
        outcomes.insert(kind, outcome);
    }

    /// The next fetch fails once with a transient error.
    pub fn fail_next_fetch(&self) {
        self.fail_next_fetch.store(true, Ordering::SeqCst);
    }

    pub fn fetch_calls(&self) -> u64 {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn mutation_calls(&self) -> u64 {
        self.mutation_calls.load(Ordering::SeqCst)
    }

    async fn simulate_latency(&self) {
        let jitter = if self.jitter_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=self.jitter_ms)
        };
        tokio::time::sleep(self.latency + Duration::from_millis(jitter)).await;
    }
}

#[async_trait]
impl Backend for SimulatedBackend {
    async fn fetch_page(&self, cursor: Option<PageCursor>) -> Result<Page, FetchError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        if self.fail_next_fetch.swap(false, Ordering::SeqCst) {
            return Err(FetchError::Transient(
                "simulated network failure".to_string(),
            ));
        }

        let key = cursor
            .map(|value| value.as_str().to_string())
            .unwrap_or_else(|| FIRST_PAGE_KEY.to_string());
        let pages = self.pages.read().await;
        Ok(pages.get(&key).cloned().unwrap_or_else(Page::empty))
    }

    async fn mutate(
        &self,
        _entity_id: &EntityId,
        kind: MutationKind,
        _payload: &MutationPayload,
    ) -> MutationOutcome {
        self.mutation_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        let outcomes = self.mutation_outcomes.read().await;
        outcomes
            .get(&kind)
            .cloned()
            .unwrap_or(MutationOutcome::Committed {
                authoritative: None,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Entity, PostRecord};
    use chrono::Utc;

    fn post(id: &str) -> Entity {
        Entity::Post(PostRecord {
            id: EntityId::new(id.to_string()).unwrap(),
            version: 1,
            author: "rin".to_string(),
            body: "hello".to_string(),
            likes: 0,
            liked_by_me: false,
            created_at: Utc::now(),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn serves_scripted_pages_by_cursor() {
        let backend = SimulatedBackend::new(Duration::from_millis(50));
        let cursor = PageCursor::new("c2".to_string()).unwrap();
        backend
            .script_page(None, Page::new(vec![post("a")], Some(cursor.clone())))
            .await;
        backend
            .script_page(Some(&cursor), Page::new(vec![post("b")], None))
            .await;

        let first = backend.fetch_page(None).await.unwrap();
        assert_eq!(first.items.len(), 1);
        assert_eq!(first.next_cursor, Some(cursor.clone()));

        let second = backend.fetch_page(Some(cursor)).await.unwrap();
        assert_eq!(second.items[0].id().as_str(), "b");
        assert_eq!(backend.fetch_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn unscripted_cursor_ends_the_list() {
        let backend = SimulatedBackend::new(Duration::from_millis(10));
        let page = backend.fetch_page(None).await.unwrap();
        assert!(page.items.is_empty());
        assert!(page.next_cursor.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn injected_fetch_failure_fires_once() {
        let backend = SimulatedBackend::new(Duration::from_millis(10));
        backend.script_page(None, Page::new(vec![post("a")], None)).await;
        backend.fail_next_fetch();

        assert!(backend.fetch_page(None).await.is_err());
        assert!(backend.fetch_page(None).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn mutations_commit_unless_scripted() {
        let backend = SimulatedBackend::new(Duration::from_millis(10));
        let id = EntityId::new("p1".to_string()).unwrap();

        let outcome = backend
            .mutate(&id, MutationKind::Like, &MutationPayload::Toggle)
            .await;
        assert_eq!(
            outcome,
            MutationOutcome::Committed {
                authoritative: None
            }
        );

        backend
            .script_mutation_outcome(
                MutationKind::Like,
                MutationOutcome::Conflict {
                    reason: "already liked".to_string(),
                },
            )
            .await;
        let outcome = backend
            .mutate(&id, MutationKind::Like, &MutationPayload::Toggle)
            .await;
        assert!(matches!(outcome, MutationOutcome::Conflict { .. }));
        assert_eq!(backend.mutation_calls(), 2);
    }
}
