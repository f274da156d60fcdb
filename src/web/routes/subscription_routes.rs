use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    routing::{get, post, put},
};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::db::models::Subscription;
use crate::web::models::{
    MessageResponse, SubscriptionQuery, SubscriptionRequest, TotalPriceResponse,
};
use crate::web::{AppError, AppState};

fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.parse::<u64>()
        .ok()
        .and_then(|id| i64::try_from(id).ok())
        .ok_or_else(|| {
            warn!(id = raw, "Failed to parse subscription id.");
            AppError::InvalidInput("invalid id".to_string())
        })
}

fn bind_id(path: Result<Path<String>, PathRejection>) -> Result<i64, AppError> {
    let Path(raw) = path.map_err(|rejection| {
        warn!(error = %rejection, "Failed to extract subscription id.");
        AppError::from(rejection)
    })?;
    parse_id(&raw)
}

fn bind_query(
    query: Result<Query<SubscriptionQuery>, QueryRejection>,
) -> Result<SubscriptionQuery, AppError> {
    let Query(query) = query.map_err(|rejection| {
        warn!(error = %rejection, "Failed to bind subscription query.");
        AppError::from(rejection)
    })?;
    Ok(query)
}

fn bind_body(
    payload: Result<Json<SubscriptionRequest>, JsonRejection>,
) -> Result<SubscriptionRequest, AppError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => {
            warn!(error = %rejection, "Failed to bind subscription body.");
            Err(rejection.into())
        }
    }
}

// --- Route Handlers ---

async fn create_subscription_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<SubscriptionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Subscription>), AppError> {
    let input = bind_body(payload)?.into_input()?;

    let subscription = app_state
        .subscription_service
        .create(input)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create subscription.");
            AppError::from(e)
        })?;

    info!(subscription_id = subscription.id, "Subscription created.");
    Ok((StatusCode::CREATED, Json(subscription)))
}

async fn get_subscription_handler(
    State(app_state): State<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Subscription>, AppError> {
    let id = bind_id(path)?;

    let subscription = app_state
        .subscription_service
        .get_by_id(id)
        .await
        .map_err(|e| {
            warn!(subscription_id = id, error = %e, "Failed to get subscription.");
            AppError::from(e)
        })?;
    Ok(Json(subscription))
}

async fn list_subscriptions_handler(
    State(app_state): State<Arc<AppState>>,
    query: Result<Query<SubscriptionQuery>, QueryRejection>,
) -> Result<Json<Vec<Subscription>>, AppError> {
    let query = bind_query(query)?;
    let subscriptions = app_state
        .subscription_service
        .list(query.params())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to list subscriptions.");
            AppError::from(e)
        })?;
    Ok(Json(subscriptions))
}

async fn update_subscription_handler(
    State(app_state): State<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<SubscriptionRequest>, JsonRejection>,
) -> Result<Json<Subscription>, AppError> {
    let id = bind_id(path)?;
    // The path id wins over anything the body says.
    let input = bind_body(payload)?.into_input()?;

    let subscription = app_state
        .subscription_service
        .update(id, input)
        .await
        .map_err(|e| {
            error!(subscription_id = id, error = %e, "Failed to update subscription.");
            AppError::from(e)
        })?;

    info!(subscription_id = id, "Subscription updated.");
    Ok(Json(subscription))
}

async fn delete_subscription_handler(
    State(app_state): State<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = bind_id(path)?;

    app_state
        .subscription_service
        .delete(id)
        .await
        .map_err(|e| {
            error!(subscription_id = id, error = %e, "Failed to delete subscription.");
            AppError::from(e)
        })?;

    info!(subscription_id = id, "Subscription deleted.");
    Ok(Json(MessageResponse {
        message: "deleted".to_string(),
    }))
}

async fn total_price_handler(
    State(app_state): State<Arc<AppState>>,
    query: Result<Query<SubscriptionQuery>, QueryRejection>,
) -> Result<Json<TotalPriceResponse>, AppError> {
    let query = bind_query(query)?;
    let total_price = app_state
        .subscription_service
        .total_price(query.params())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to calculate total price.");
            AppError::from(e)
        })?;
    Ok(Json(TotalPriceResponse { total_price }))
}

// --- Routers ---

/// Mutating routes. Mounted behind the required auth gate.
pub fn create_protected_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/subscriptions", post(create_subscription_handler))
        .route(
            "/subscriptions/{id}",
            put(update_subscription_handler).delete(delete_subscription_handler),
        )
}

/// Read routes. Mounted behind the optional auth gate.
pub fn create_public_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/subscriptions", get(list_subscriptions_handler))
        .route("/subscriptions/total", get(total_price_handler))
        .route("/subscriptions/{id}", get(get_subscription_handler))
}
