use chrono::NaiveDate;
use sea_orm::EntityTrait;

use subscriptions::db::entities::subscription;
use subscriptions::db::enums::SubscriptionStatus;
use subscriptions::db::models::{SubscriptionFilter, SubscriptionInput};
use subscriptions::db::schema::ensure_schema;
use subscriptions::db::services::{SeaOrmSubscriptionStore, StoreError, SubscriptionStore};

async fn store() -> SeaOrmSubscriptionStore {
    SeaOrmSubscriptionStore::connect("sqlite::memory:", 1)
        .await
        .expect("sqlite store")
}

fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
}

fn input(service_name: &str, price: i64, user_id: &str, start: &str) -> SubscriptionInput {
    SubscriptionInput {
        service_name: service_name.to_string(),
        price,
        user_id: user_id.to_string(),
        start_date: date(start),
        end_date: None,
    }
}

#[tokio::test]
async fn crud_roundtrip() {
    let store = store().await;
    assert_eq!(store.backend_name(), "sqlite");
    store.health_check().await.unwrap();

    let created = store
        .create(input("Netflix", 10000, "u1", "2026-01-01"))
        .await
        .unwrap();
    assert!(created.id > 0);
    assert_eq!(created.status, SubscriptionStatus::Active);
    assert!(created.deleted_at.is_none());

    let fetched = store.get_by_id(created.id).await.unwrap();
    assert_eq!(fetched.service_name, "Netflix");
    assert_eq!(fetched.price, 10000);
    assert_eq!(fetched.start_date, date("2026-01-01"));

    let mut changes = input("Netflix Premium", 15000, "u1", "2026-01-01");
    changes.end_date = Some(date("2026-12-31"));
    let updated = store.update(created.id, changes).await.unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.service_name, "Netflix Premium");
    assert_eq!(updated.end_date, Some(date("2026-12-31")));
    assert_eq!(updated.created_at, created.created_at);

    store.delete(created.id).await.unwrap();
    assert!(matches!(
        store.get_by_id(created.id).await,
        Err(StoreError::NotFound)
    ));
}

#[tokio::test]
async fn delete_keeps_the_row_as_a_tombstone() {
    let store = store().await;
    let created = store
        .create(input("Spotify", 500, "u1", "2026-02-01"))
        .await
        .unwrap();

    store.delete(created.id).await.unwrap();
    // A second delete and a delete of an unknown id both succeed.
    store.delete(created.id).await.unwrap();
    store.delete(9999).await.unwrap();

    let row = subscription::Entity::find_by_id(created.id)
        .one(store.connection())
        .await
        .unwrap()
        .expect("row is retained");
    assert_eq!(row.status, SubscriptionStatus::Deleted);
    assert!(row.deleted_at.is_some());

    assert!(store.list(&SubscriptionFilter::default()).await.unwrap().is_empty());
    assert!(matches!(
        store
            .update(created.id, input("Spotify", 600, "u1", "2026-02-01"))
            .await,
        Err(StoreError::NotUpdated(_))
    ));

    let next = store
        .create(input("Spotify", 500, "u1", "2026-02-01"))
        .await
        .unwrap();
    assert!(next.id > created.id);
}

#[tokio::test]
async fn negative_price_violates_check_constraint() {
    let store = store().await;
    let result = store.create(input("Netflix", -1, "u1", "2026-01-01")).await;
    assert!(matches!(result, Err(StoreError::Constraint(_))), "{result:?}");

    let created = store
        .create(input("Netflix", 1, "u1", "2026-01-01"))
        .await
        .unwrap();
    let result = store
        .update(created.id, input("Netflix", -100, "u1", "2026-01-01"))
        .await;
    assert!(matches!(result, Err(StoreError::Constraint(_))), "{result:?}");
    assert_eq!(store.get_by_id(created.id).await.unwrap().price, 1);
}

#[tokio::test]
async fn update_of_missing_id_is_not_updated() {
    let store = store().await;
    let result = store
        .update(404, input("Netflix", 100, "u1", "2026-01-01"))
        .await;
    assert!(matches!(result, Err(StoreError::NotUpdated(404))));
}

#[tokio::test]
async fn list_and_total_apply_filters() {
    let store = store().await;
    store
        .create(input("Netflix", 10000, "u1", "2026-01-01"))
        .await
        .unwrap();
    store
        .create(input("Spotify", 500, "u1", "2026-03-15"))
        .await
        .unwrap();
    let gone = store
        .create(input("Netflix", 7000, "u2", "2026-03-01"))
        .await
        .unwrap();
    store
        .create(input("Netflix", 9000, "u2", "2026-05-01"))
        .await
        .unwrap();
    store.delete(gone.id).await.unwrap();

    let all = store.list(&SubscriptionFilter::default()).await.unwrap();
    assert_eq!(all.len(), 3);
    assert!(all.windows(2).all(|pair| pair[0].id < pair[1].id));

    let netflix = SubscriptionFilter {
        service_name: Some("Netflix".to_string()),
        ..Default::default()
    };
    assert_eq!(store.list(&netflix).await.unwrap().len(), 2);
    assert_eq!(store.total_price(&netflix).await.unwrap(), 19000);

    let u1_spring = SubscriptionFilter {
        user_id: Some("u1".to_string()),
        start_from: Some(date("2026-02-01")),
        start_to: Some(date("2026-04-30")),
        ..Default::default()
    };
    let rows = store.list(&u1_spring).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].service_name, "Spotify");
    assert_eq!(store.total_price(&u1_spring).await.unwrap(), 500);

    let nobody = SubscriptionFilter {
        user_id: Some("nobody".to_string()),
        ..Default::default()
    };
    assert!(store.list(&nobody).await.unwrap().is_empty());
    assert_eq!(store.total_price(&nobody).await.unwrap(), 0);
}

#[tokio::test]
async fn ensure_schema_is_idempotent() {
    let store = store().await;
    store
        .create(input("Netflix", 100, "u1", "2026-01-01"))
        .await
        .unwrap();

    ensure_schema(store.connection()).await.unwrap();

    assert_eq!(
        store
            .total_price(&SubscriptionFilter::default())
            .await
            .unwrap(),
        100
    );
}
