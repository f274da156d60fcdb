use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectOptions, ConnectionTrait, Database,
    DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, RuntimeErr,
    Select, Set,
    sea_query::{Alias, Expr, Func, SimpleExpr},
};
use tracing::{debug, info, warn};

use super::{StoreError, StoreResult, SubscriptionStore};
use crate::db::entities::subscription;
use crate::db::enums::SubscriptionStatus;
use crate::db::models::{SubscriptionFilter, SubscriptionInput};
use crate::db::schema::ensure_schema;

/// Persistence gateway over a sea-orm connection pool.
#[derive(Clone)]
pub struct SeaOrmSubscriptionStore {
    db: DatabaseConnection,
}

impl SeaOrmSubscriptionStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Opens a pool against `database_url` and makes sure the table exists.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, DbErr> {
        let mut opt = ConnectOptions::new(database_url.to_owned());
        opt.max_connections(max_connections);

        let db = Database::connect(opt).await?;
        ensure_schema(&db).await?;
        info!(max_connections, "Connected to subscriptions database.");
        Ok(Self::new(db))
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Every read starts here, so deleted rows never leak into a result.
    fn active() -> Select<subscription::Entity> {
        subscription::Entity::find()
            .filter(subscription::Column::Status.eq(SubscriptionStatus::Active))
    }

    fn condition(filter: &SubscriptionFilter) -> Condition {
        let mut condition = Condition::all();
        if let Some(user_id) = &filter.user_id {
            condition = condition.add(subscription::Column::UserId.eq(user_id.as_str()));
        }
        if let Some(service_name) = &filter.service_name {
            condition = condition.add(subscription::Column::ServiceName.eq(service_name.as_str()));
        }
        if let Some(from) = filter.start_from {
            condition = condition.add(subscription::Column::StartDate.gte(from));
        }
        if let Some(to) = filter.start_to {
            condition = condition.add(subscription::Column::StartDate.lte(to));
        }
        condition
    }
}

fn classify(err: DbErr) -> StoreError {
    let violation = match &err {
        DbErr::Exec(RuntimeErr::SqlxError(sqlx::Error::Database(db_err)))
        | DbErr::Query(RuntimeErr::SqlxError(sqlx::Error::Database(db_err)))
            if db_err.is_check_violation() =>
        {
            Some(db_err.message().to_string())
        }
        _ => None,
    };

    match violation {
        Some(message) => {
            warn!(error = %message, "Subscription rejected by a table constraint.");
            StoreError::Constraint(message)
        }
        None => StoreError::Database(err),
    }
}

#[async_trait]
impl SubscriptionStore for SeaOrmSubscriptionStore {
    async fn create(&self, input: SubscriptionInput) -> StoreResult<subscription::Model> {
        let now = Utc::now();
        let new_subscription = subscription::ActiveModel {
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
            status: Set(SubscriptionStatus::Active),
            service_name: Set(input.service_name),
            price: Set(input.price),
            user_id: Set(input.user_id),
            start_date: Set(input.start_date),
            end_date: Set(input.end_date),
            ..Default::default() // id is assigned by the database
        };

        new_subscription.insert(&self.db).await.map_err(classify)
    }

    async fn get_by_id(&self, id: i64) -> StoreResult<subscription::Model> {
        Self::active()
            .filter(subscription::Column::Id.eq(id))
            .one(&self.db)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn list(&self, filter: &SubscriptionFilter) -> StoreResult<Vec<subscription::Model>> {
        let rows = Self::active()
            .filter(Self::condition(filter))
            .order_by_asc(subscription::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows)
    }

    async fn update(&self, id: i64, input: SubscriptionInput) -> StoreResult<subscription::Model> {
        let changes = subscription::ActiveModel {
            service_name: Set(input.service_name),
            price: Set(input.price),
            user_id: Set(input.user_id),
            start_date: Set(input.start_date),
            end_date: Set(input.end_date),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };

        let result = subscription::Entity::update_many()
            .set(changes)
            .filter(subscription::Column::Id.eq(id))
            .filter(subscription::Column::Status.eq(SubscriptionStatus::Active))
            .exec(&self.db)
            .await
            .map_err(classify)?;

        if result.rows_affected == 0 {
            return Err(StoreError::NotUpdated(id));
        }
        self.get_by_id(id).await
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        let tombstone = subscription::ActiveModel {
            status: Set(SubscriptionStatus::Deleted),
            deleted_at: Set(Some(Utc::now())),
            ..Default::default()
        };

        let result = subscription::Entity::update_many()
            .set(tombstone)
            .filter(subscription::Column::Id.eq(id))
            .filter(subscription::Column::Status.eq(SubscriptionStatus::Active))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            debug!(subscription_id = id, "Delete matched no active subscription.");
        }
        Ok(())
    }

    async fn total_price(&self, filter: &SubscriptionFilter) -> StoreResult<i64> {
        // SUM over BIGINT is NUMERIC on PostgreSQL, cast it back so it decodes as i64
        let sum = SimpleExpr::from(Func::cast_as(
            Func::sum(Expr::col(subscription::Column::Price)),
            Alias::new("BIGINT"),
        ));

        let total: Option<Option<i64>> = Self::active()
            .filter(Self::condition(filter))
            .select_only()
            .column_as(sum, "total_price")
            .into_tuple::<Option<i64>>()
            .one(&self.db)
            .await?;

        Ok(total.flatten().unwrap_or(0))
    }

    async fn health_check(&self) -> StoreResult<()> {
        self.db.ping().await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        match self.db.get_database_backend() {
            sea_orm::DatabaseBackend::Postgres => "postgres",
            sea_orm::DatabaseBackend::Sqlite => "sqlite",
            _ => "sql",
        }
    }
}
