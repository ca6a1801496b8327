use chrono::Utc;
use kagami::{
    CacheNamespace, CacheSnapshot, CartItemRecord, Entity, EntityId, MemorySnapshotStore,
    PollOptionRecord, PostRecord,
};

pub fn entity_id(value: &str) -> EntityId {
    EntityId::new(value.to_string()).expect("entity id")
}

pub fn namespace(value: &str) -> CacheNamespace {
    CacheNamespace::new(value.to_string()).expect("namespace")
}

pub fn post(id: &str, likes: i64, liked: bool) -> Entity {
    Entity::Post(PostRecord {
        id: entity_id(id),
        version: 1,
        author: "rin".to_string(),
        body: format!("body of {id}"),
        likes,
        liked_by_me: liked,
        created_at: Utc::now(),
    })
}

pub fn poll_option(id: &str, votes: i64) -> Entity {
    Entity::PollOption(PollOptionRecord {
        id: entity_id(id),
        version: 1,
        label: format!("option {id}"),
        votes,
        voted_by_me: false,
    })
}

pub fn cart_item(id: &str, quantity: i64) -> Entity {
    Entity::CartItem(CartItemRecord {
        id: entity_id(id),
        version: 1,
        title: format!("item {id}"),
        unit_price_cents: 450,
        quantity,
    })
}

pub async fn preload_snapshot(
    blobs: &MemorySnapshotStore,
    ns: &CacheNamespace,
    entities: Vec<Entity>,
) {
    let order = entities.iter().map(|e| e.id().clone()).collect();
    let snapshot = CacheSnapshot::new(entities, order, Utc::now().timestamp_millis());
    blobs
        .preload(ns, serde_json::to_string(&snapshot).expect("snapshot json"))
        .await;
}

pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}
