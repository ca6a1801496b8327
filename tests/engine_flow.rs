mod common;

use common::{cart_item, entity_id, init_test_logging, namespace, poll_option, post, preload_snapshot};
use kagami::{
    DeliveryStatus, EngineConfig, Entity, FetchOutcome, MemorySnapshotStore, MutationError,
    MutationKind, MutationOutcome, MutationPayload, Page, PageCursor, SimulatedBackend, SyncEngine,
};
use std::sync::Arc;

fn quick_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.persistence.save_debounce_ms = 5;
    config.simulation.latency_ms = 10;
    config.simulation.jitter_ms = 0;
    config
}

fn engine_with(
    backend: Arc<SimulatedBackend>,
    blobs: Arc<MemorySnapshotStore>,
    ns: &str,
) -> Arc<SyncEngine> {
    Arc::new(SyncEngine::new(
        backend,
        blobs,
        namespace(ns),
        &quick_config(),
    ))
}

fn cursor(value: &str) -> PageCursor {
    PageCursor::new(value.to_string()).expect("cursor")
}

async fn settle() {
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn stale_cache_serves_while_the_refresh_is_in_flight() {
    init_test_logging();
    let blobs = Arc::new(MemorySnapshotStore::new());
    let ns = namespace("feed");
    preload_snapshot(&blobs, &ns, vec![post("cached-1", 2, false), post("cached-2", 7, true)])
        .await;

    let backend = Arc::new(SimulatedBackend::from_config(&quick_config().simulation));
    backend
        .script_page(
            None,
            Page::new(vec![post("fresh-1", 3, false), post("cached-2", 8, true)], None),
        )
        .await;
    let engine = engine_with(backend, blobs, "feed");

    assert!(engine.bootstrap().await);
    let stale = engine.view_state().await;
    assert_eq!(stale.ordered_ids.len(), 2);
    assert_eq!(stale.ordered_ids[0].as_str(), "cached-1");

    engine.fetch_next().await.unwrap();
    let fresh = engine.view_state().await;
    assert_eq!(fresh.ordered_ids.len(), 2);
    assert_eq!(fresh.ordered_ids[0].as_str(), "fresh-1");
    match engine.entity(&entity_id("cached-2")).await.unwrap() {
        Entity::Post(record) => assert_eq!(record.likes, 8),
        _ => unreachable!(),
    }
}

#[tokio::test(start_paused = true)]
async fn like_conflict_rolls_the_post_back() {
    init_test_logging();
    let backend = Arc::new(SimulatedBackend::from_config(&quick_config().simulation));
    backend
        .script_page(None, Page::new(vec![post("p1", 10, false)], None))
        .await;
    backend
        .script_mutation_outcome(
            MutationKind::Like,
            MutationOutcome::Conflict {
                reason: "liked on another device".to_string(),
            },
        )
        .await;
    let engine = engine_with(backend, Arc::new(MemorySnapshotStore::new()), "feed");

    engine.fetch_next().await.unwrap();

    let err = engine
        .mutate(entity_id("p1"), MutationKind::Like, MutationPayload::Toggle)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        MutationError::Conflict("liked on another device".to_string())
    );

    match engine.entity(&entity_id("p1")).await.unwrap() {
        Entity::Post(record) => {
            assert_eq!(record.likes, 10);
            assert!(!record.liked_by_me);
        }
        _ => unreachable!(),
    }
}

#[tokio::test(start_paused = true)]
async fn cursor_walk_ends_terminally_until_reset() {
    init_test_logging();
    let backend = Arc::new(SimulatedBackend::from_config(&quick_config().simulation));
    backend
        .script_page(
            None,
            Page::new(vec![post("a", 0, false), post("b", 0, false)], Some(cursor("c2"))),
        )
        .await;
    backend.script_page(Some(&cursor("c2")), Page::empty()).await;
    let engine = engine_with(backend.clone(), Arc::new(MemorySnapshotStore::new()), "feed");

    assert_eq!(
        engine.fetch_next().await.unwrap(),
        FetchOutcome::Fetched { appended: 2 }
    );
    assert_eq!(
        engine.fetch_next().await.unwrap(),
        FetchOutcome::Fetched { appended: 0 }
    );
    let state = engine.view_state().await;
    assert!(!state.has_more);
    assert_eq!(state.ordered_ids.len(), 2);

    // Terminal: the third call does not reach the backend.
    assert_eq!(engine.fetch_next().await.unwrap(), FetchOutcome::Exhausted);
    assert_eq!(backend.fetch_calls(), 2);

    engine.reset_context(None).await;
    assert!(engine.view_state().await.has_more);
    assert_eq!(
        engine.fetch_next().await.unwrap(),
        FetchOutcome::Fetched { appended: 2 }
    );
}

#[tokio::test(start_paused = true)]
async fn double_click_vote_fires_one_backend_call() {
    init_test_logging();
    let backend = Arc::new(SimulatedBackend::from_config(&quick_config().simulation));
    backend
        .script_page(None, Page::new(vec![poll_option("opt-a", 4)], None))
        .await;
    let engine = engine_with(backend.clone(), Arc::new(MemorySnapshotStore::new()), "poll");

    engine.fetch_next().await.unwrap();

    let first = {
        let engine = engine.clone();
        tokio::spawn(async move {
            engine
                .mutate(entity_id("opt-a"), MutationKind::Vote, MutationPayload::CastVote)
                .await
        })
    };
    settle().await;

    let second = engine
        .mutate(entity_id("opt-a"), MutationKind::Vote, MutationPayload::CastVote)
        .await
        .unwrap_err();
    assert!(matches!(second, MutationError::AlreadyPending { .. }));

    first.await.unwrap().unwrap();
    match engine.entity(&entity_id("opt-a")).await.unwrap() {
        Entity::PollOption(record) => {
            assert_eq!(record.votes, 5);
            assert!(record.voted_by_me);
        }
        _ => unreachable!(),
    }
    assert_eq!(backend.mutation_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn liked_state_survives_a_reload_through_the_cache() {
    init_test_logging();
    let blobs = Arc::new(MemorySnapshotStore::new());
    let backend = Arc::new(SimulatedBackend::from_config(&quick_config().simulation));
    backend
        .script_page(None, Page::new(vec![post("p1", 10, false)], None))
        .await;

    {
        let engine = engine_with(backend.clone(), blobs.clone(), "feed");
        engine.fetch_next().await.unwrap();
        engine
            .mutate(entity_id("p1"), MutationKind::Like, MutationPayload::Toggle)
            .await
            .unwrap();
        engine.flush().await;
    }

    // A fresh session seeds from the cache before any fetch completes.
    let engine = engine_with(backend, blobs, "feed");
    assert!(engine.bootstrap().await);
    match engine.entity(&entity_id("p1")).await.unwrap() {
        Entity::Post(record) => {
            assert_eq!(record.likes, 11);
            assert!(record.liked_by_me);
        }
        _ => unreachable!(),
    }
}

#[tokio::test(start_paused = true)]
async fn chat_send_failure_leaves_only_the_delivered_message() {
    init_test_logging();
    let backend = Arc::new(SimulatedBackend::from_config(&quick_config().simulation));
    let engine = engine_with(backend.clone(), Arc::new(MemorySnapshotStore::new()), "chat:a");

    engine
        .mutate(
            entity_id("m1"),
            MutationKind::SendMessage,
            MutationPayload::Message {
                author: "aya".to_string(),
                body: "first".to_string(),
            },
        )
        .await
        .unwrap();

    backend
        .script_mutation_outcome(
            MutationKind::SendMessage,
            MutationOutcome::Failed {
                reason: "connection dropped".to_string(),
            },
        )
        .await;
    let err = engine
        .mutate(
            entity_id("m2"),
            MutationKind::SendMessage,
            MutationPayload::Message {
                author: "aya".to_string(),
                body: "second".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err, MutationError::Transient("connection dropped".to_string()));

    let entities = engine.ordered_entities().await;
    assert_eq!(entities.len(), 1);
    match &entities[0] {
        Entity::Message(record) => {
            assert_eq!(record.body, "first");
            assert_eq!(record.status, DeliveryStatus::Sent);
        }
        _ => unreachable!(),
    }
}

#[tokio::test(start_paused = true)]
async fn cart_edits_round_trip_with_rollback_on_conflict() {
    init_test_logging();
    let backend = Arc::new(SimulatedBackend::from_config(&quick_config().simulation));
    backend
        .script_page(
            None,
            Page::new(vec![cart_item("sku-1", 2), cart_item("sku-2", 1)], None),
        )
        .await;
    let engine = engine_with(backend.clone(), Arc::new(MemorySnapshotStore::new()), "cart");

    engine.fetch_next().await.unwrap();

    engine
        .mutate(
            entity_id("sku-1"),
            MutationKind::AdjustQuantity,
            MutationPayload::Quantity { delta: 3 },
        )
        .await
        .unwrap();
    match engine.entity(&entity_id("sku-1")).await.unwrap() {
        Entity::CartItem(record) => assert_eq!(record.quantity, 5),
        _ => unreachable!(),
    }

    backend
        .script_mutation_outcome(
            MutationKind::RemoveItem,
            MutationOutcome::Conflict {
                reason: "order already placed".to_string(),
            },
        )
        .await;
    let before = engine.ordered_entities().await;
    let err = engine
        .mutate(entity_id("sku-1"), MutationKind::RemoveItem, MutationPayload::Removal)
        .await
        .unwrap_err();
    assert!(matches!(err, MutationError::Conflict(_)));
    assert_eq!(engine.ordered_entities().await, before);
}
