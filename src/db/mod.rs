use std::sync::Arc;

use sea_orm::DbErr;
use tracing::{info, warn};

use crate::server::config::ServerConfig;

pub mod entities;
pub mod enums;
pub mod models;
pub mod schema;
pub mod services;

use services::{InMemorySubscriptionStore, SeaOrmSubscriptionStore, SubscriptionStore};

/// Picks the store backend from configuration. Without a `database_url` the service runs on the
/// in-memory store, which keeps nothing across restarts.
pub async fn connect_store(config: &ServerConfig) -> Result<Arc<dyn SubscriptionStore>, DbErr> {
    let store: Arc<dyn SubscriptionStore> = match config.database_url.as_deref() {
        Some(url) => Arc::new(SeaOrmSubscriptionStore::connect(url, config.db_max_connections).await?),
        None => {
            warn!("DATABASE_URL is not set. Subscriptions will be kept in memory only.");
            Arc::new(InMemorySubscriptionStore::new())
        }
    };
    info!(backend = store.backend_name(), "Subscription store initialized.");
    Ok(store)
}
