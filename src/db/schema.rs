use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbErr,
    sea_query::{ColumnDef, Expr, Index, Table},
};
use tracing::info;

use crate::db::entities::subscription;

/// Creates the `subscriptions` table and its owner index when they are missing.
/// There is no migration history; an existing table is left as it is.
pub async fn ensure_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();

    let table = Table::create()
        .table(subscription::Entity)
        .if_not_exists()
        .col(
            ColumnDef::new(subscription::Column::Id)
                .big_integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(
            ColumnDef::new(subscription::Column::CreatedAt)
                .timestamp_with_time_zone()
                .not_null(),
        )
        .col(
            ColumnDef::new(subscription::Column::UpdatedAt)
                .timestamp_with_time_zone()
                .not_null(),
        )
        .col(
            ColumnDef::new(subscription::Column::DeletedAt)
                .timestamp_with_time_zone()
                .null(),
        )
        .col(
            ColumnDef::new(subscription::Column::Status)
                .text()
                .not_null()
                .default("active"),
        )
        .col(
            ColumnDef::new(subscription::Column::ServiceName)
                .string()
                .not_null(),
        )
        .col(
            ColumnDef::new(subscription::Column::Price)
                .big_integer()
                .not_null()
                .check(Expr::col(subscription::Column::Price).gte(0)),
        )
        .col(ColumnDef::new(subscription::Column::UserId).string().not_null())
        .col(ColumnDef::new(subscription::Column::StartDate).date().not_null())
        .col(ColumnDef::new(subscription::Column::EndDate).date().null())
        .to_owned();
    db.execute(backend.build(&table)).await?;

    let user_index = Index::create()
        .if_not_exists()
        .name("idx_subscriptions_user_id")
        .table(subscription::Entity)
        .col(subscription::Column::UserId)
        .to_owned();
    db.execute(backend.build(&user_index)).await?;

    info!(backend = ?backend, "Subscriptions schema is ready.");
    Ok(())
}
