//! The `services` module is the persistence gateway for subscriptions.
//!
//! Callers talk to the [`SubscriptionStore`] trait and never see SQL. Two backends implement it:
//! [`SeaOrmSubscriptionStore`] over a sea-orm connection pool (PostgreSQL or SQLite), and
//! [`InMemorySubscriptionStore`] for runs without a database.

use async_trait::async_trait;
use sea_orm::DbErr;
use thiserror::Error;

use crate::db::entities::subscription;
use crate::db::models::{SubscriptionFilter, SubscriptionInput};

pub mod memory_store;
pub mod subscription_store;

pub use memory_store::InMemorySubscriptionStore;
pub use subscription_store::SeaOrmSubscriptionStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("subscription {0} was not updated: no active record with that id")]
    NotUpdated(i64),
    #[error("constraint violated: {0}")]
    Constraint(String),
    #[error("total price is out of the 64-bit range")]
    Overflow,
    #[error(transparent)]
    Database(#[from] DbErr),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn create(&self, input: SubscriptionInput) -> StoreResult<subscription::Model>;
    /// Returns the active row with `id`, or `StoreError::NotFound`.
    async fn get_by_id(&self, id: i64) -> StoreResult<subscription::Model>;
    async fn list(&self, filter: &SubscriptionFilter) -> StoreResult<Vec<subscription::Model>>;
    /// Replaces the client-controlled fields of the active row with `id`.
    async fn update(&self, id: i64, input: SubscriptionInput) -> StoreResult<subscription::Model>;
    /// Soft-deletes the row. Missing or already deleted ids are not an error.
    async fn delete(&self, id: i64) -> StoreResult<()>;
    /// Sum of `price` over matching active rows; 0 when nothing matches.
    async fn total_price(&self, filter: &SubscriptionFilter) -> StoreResult<i64>;

    async fn health_check(&self) -> StoreResult<()>;
    fn backend_name(&self) -> &'static str;
}
