//! In-memory implementation of the subscription store.
//!
//! Rows live in a `BTreeMap` keyed by id behind a `tokio::sync::RwLock`, so listing comes back in id
//! order like the SQL backend. Nothing is durable: state is lost on restart. Soft delete, the
//! non-negative price rule, and id allocation follow the SQL backend so the two are interchangeable.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::{StoreError, StoreResult, SubscriptionStore};
use crate::db::entities::subscription;
use crate::db::enums::SubscriptionStatus;
use crate::db::models::{SubscriptionFilter, SubscriptionInput};

#[derive(Debug, Default)]
struct Table {
    // Ids start at 1 and are never handed out twice, deleted rows included.
    last_id: i64,
    rows: BTreeMap<i64, subscription::Model>,
}

#[derive(Debug, Default)]
pub struct InMemorySubscriptionStore {
    table: RwLock<Table>,
}

impl InMemorySubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_price(price: i64) -> StoreResult<()> {
        if price < 0 {
            return Err(StoreError::Constraint(format!(
                "price must be non-negative, got {price}"
            )));
        }
        Ok(())
    }

    /// Number of stored rows, deleted ones included.
    pub async fn stored_rows(&self) -> usize {
        self.table.read().await.rows.len()
    }
}

fn is_active(model: &subscription::Model) -> bool {
    model.status == SubscriptionStatus::Active
}

#[async_trait]
impl SubscriptionStore for InMemorySubscriptionStore {
    async fn create(&self, input: SubscriptionInput) -> StoreResult<subscription::Model> {
        Self::check_price(input.price)?;

        let mut table = self.table.write().await;
        table.last_id += 1;
        let now = Utc::now();
        let model = subscription::Model {
            id: table.last_id,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            status: SubscriptionStatus::Active,
            service_name: input.service_name,
            price: input.price,
            user_id: input.user_id,
            start_date: input.start_date,
            end_date: input.end_date,
        };
        table.rows.insert(model.id, model.clone());
        Ok(model)
    }

    async fn get_by_id(&self, id: i64) -> StoreResult<subscription::Model> {
        let table = self.table.read().await;
        table
            .rows
            .get(&id)
            .filter(|model| is_active(model))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list(&self, filter: &SubscriptionFilter) -> StoreResult<Vec<subscription::Model>> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .filter(|model| is_active(model) && filter.matches(model))
            .cloned()
            .collect())
    }

    async fn update(&self, id: i64, input: SubscriptionInput) -> StoreResult<subscription::Model> {
        Self::check_price(input.price)?;

        let mut table = self.table.write().await;
        let model = table
            .rows
            .get_mut(&id)
            .filter(|model| is_active(model))
            .ok_or(StoreError::NotUpdated(id))?;

        model.service_name = input.service_name;
        model.price = input.price;
        model.user_id = input.user_id;
        model.start_date = input.start_date;
        model.end_date = input.end_date;
        model.updated_at = Utc::now();
        Ok(model.clone())
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        let mut table = self.table.write().await;
        if let Some(model) = table.rows.get_mut(&id).filter(|model| is_active(model)) {
            model.status = SubscriptionStatus::Deleted;
            model.deleted_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn total_price(&self, filter: &SubscriptionFilter) -> StoreResult<i64> {
        let table = self.table.read().await;
        table
            .rows
            .values()
            .filter(|model| is_active(model) && filter.matches(model))
            .try_fold(0i64, |total, model| total.checked_add(model.price))
            .ok_or(StoreError::Overflow)
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
