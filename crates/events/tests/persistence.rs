use std::sync::Arc;
use std::time::Duration;

use navmate_db::repositories::EventRepo;
use navmate_events::{EventBus, EventPersistence, PlatformEvent};
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_persist_writes_event_row(pool: PgPool) {
    let event = PlatformEvent::new("payment.captured")
        .with_source("payment", 12)
        .with_payload(serde_json::json!({"external_ref": "pay_abc"}));

    let id = EventPersistence::persist(&pool, &event).await.unwrap();
    assert!(id > 0);

    let (source_type, payload): (Option<String>, serde_json::Value) =
        sqlx::query_as("SELECT source_entity_type, payload FROM events WHERE id = $1")
            .bind(id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(source_type.as_deref(), Some("payment"));
    assert_eq!(payload["external_ref"], "pay_abc");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_run_persists_bus_events_until_closed(pool: PgPool) {
    let bus = Arc::new(EventBus::default());
    let task = tokio::spawn(EventPersistence::run(pool.clone(), bus.subscribe()));

    bus.publish(PlatformEvent::new("safety.overdue").with_source("trip_plan", 1));
    bus.publish(PlatformEvent::new("safety.overdue").with_source("trip_plan", 2));
    drop(bus);

    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("persistence stops when the bus is dropped")
        .unwrap();

    assert_eq!(EventRepo::count_by_type(&pool, "safety.overdue").await.unwrap(), 2);
}
