use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::db::enums::SubscriptionStatus;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subscriptions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
    pub deleted_at: Option<ChronoDateTimeUtc>,
    pub status: SubscriptionStatus,
    pub service_name: String,
    // Smallest currency unit; the table carries CHECK (price >= 0)
    pub price: i64,
    // Opaque owner id, not a foreign key
    pub user_id: String,
    pub start_date: Date,
    pub end_date: Option<Date>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
