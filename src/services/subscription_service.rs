use chrono::NaiveDate;
use std::sync::Arc;
use tracing::debug;

use crate::db::models::{Subscription, SubscriptionFilter, SubscriptionInput};
use crate::db::services::{StoreResult, SubscriptionStore};

/// Optional query parameters shared by list and total-price requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubscriptionParams<'a> {
    pub user_id: Option<&'a str>,
    pub service_name: Option<&'a str>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl SubscriptionParams<'_> {
    /// Blank strings mean "no filter", matching how empty query parameters arrive.
    pub fn to_filter(&self) -> SubscriptionFilter {
        fn present(value: Option<&str>) -> Option<String> {
            value.filter(|v| !v.is_empty()).map(str::to_string)
        }

        SubscriptionFilter {
            user_id: present(self.user_id),
            service_name: present(self.service_name),
            start_from: self.from,
            start_to: self.to,
        }
    }
}

/// Thin layer between handlers and the store. Store errors pass through unchanged.
#[derive(Clone)]
pub struct SubscriptionService {
    store: Arc<dyn SubscriptionStore>,
}

impl SubscriptionService {
    pub fn new(store: Arc<dyn SubscriptionStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn SubscriptionStore> {
        &self.store
    }

    pub async fn create(&self, input: SubscriptionInput) -> StoreResult<Subscription> {
        self.store.create(input).await.map(Subscription::from)
    }

    pub async fn get_by_id(&self, id: i64) -> StoreResult<Subscription> {
        self.store.get_by_id(id).await.map(Subscription::from)
    }

    pub async fn list(&self, params: SubscriptionParams<'_>) -> StoreResult<Vec<Subscription>> {
        let filter = params.to_filter();
        if filter.is_empty() {
            debug!("Listing all active subscriptions without filters.");
        }
        let rows = self.store.list(&filter).await?;
        Ok(rows.into_iter().map(Subscription::from).collect())
    }

    pub async fn update(&self, id: i64, input: SubscriptionInput) -> StoreResult<Subscription> {
        self.store.update(id, input).await.map(Subscription::from)
    }

    pub async fn delete(&self, id: i64) -> StoreResult<()> {
        self.store.delete(id).await
    }

    pub async fn total_price(&self, params: SubscriptionParams<'_>) -> StoreResult<i64> {
        self.store.total_price(&params.to_filter()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::services::InMemorySubscriptionStore;

    fn service() -> SubscriptionService {
        SubscriptionService::new(Arc::new(InMemorySubscriptionStore::new()))
    }

    fn input(service_name: &str, price: i64, user_id: &str, start: &str) -> SubscriptionInput {
        SubscriptionInput {
            service_name: service_name.to_string(),
            price,
            user_id: user_id.to_string(),
            start_date: start.parse().unwrap(),
            end_date: None,
        }
    }

    #[test]
    fn test_blank_params_are_dropped() {
        let params = SubscriptionParams {
            user_id: Some(""),
            service_name: Some("Netflix"),
            ..Default::default()
        };
        let filter = params.to_filter();
        assert_eq!(filter.user_id, None);
        assert_eq!(filter.service_name.as_deref(), Some("Netflix"));
    }

    #[tokio::test]
    async fn test_total_price_by_owner_and_period() {
        let service = service();
        service.create(input("Netflix", 10000, "u1", "2026-01-01")).await.unwrap();
        service.create(input("Spotify", 500, "u1", "2026-02-15")).await.unwrap();
        service.create(input("Spotify", 700, "u2", "2026-02-15")).await.unwrap();
        service.create(input("Netflix", 9000, "u1", "2026-05-01")).await.unwrap();

        let total = service
            .total_price(SubscriptionParams {
                user_id: Some("u1"),
                from: Some("2026-01-01".parse().unwrap()),
                to: Some("2026-03-01".parse().unwrap()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(total, 10500);

        let spotify_total = service
            .total_price(SubscriptionParams {
                service_name: Some("Spotify"),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(spotify_total, 1200);
    }

    #[tokio::test]
    async fn test_create_then_get_round_trip() {
        let service = service();
        let created = service
            .create(input("Netflix", 10000, "u1", "2026-01-01"))
            .await
            .unwrap();
        let fetched = service.get_by_id(created.id).await.unwrap();

        assert_eq!(fetched.service_name, "Netflix");
        assert_eq!(fetched.price, 10000);
        assert_eq!(fetched.user_id, "u1");
        assert_eq!(fetched.start_date.to_string(), "2026-01-01");
        assert_eq!(fetched.created_at, created.created_at);
    }
}
