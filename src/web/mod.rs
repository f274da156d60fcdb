use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::Method,
    middleware as axum_middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::db::services::SubscriptionStore;
use crate::server::config::ServerConfig;
use crate::services::auth_service::{self, StaticTokenAuth, TokenVerifier};
use crate::services::subscription_service::SubscriptionService;
use crate::web::{
    middleware::auth::{self, AuthGate},
    models::{LoginRequest, LoginResponse},
    routes::subscription_routes,
};

pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;

pub use error::AppError;

#[derive(Clone)]
pub struct AppState {
    pub subscription_service: SubscriptionService,
    pub auth: Arc<StaticTokenAuth>,
}

impl AppState {
    pub fn new(store: Arc<dyn SubscriptionStore>, config: &ServerConfig) -> Self {
        let auth = Arc::new(StaticTokenAuth::new(
            config.auth_token.clone(),
            config.admin_username.clone(),
            config.admin_password.clone(),
        ));
        AppState {
            subscription_service: SubscriptionService::new(store),
            auth,
        }
    }
}

async fn login_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(payload) = payload.map_err(|e| {
        warn!(error = %e, "Failed to bind login body.");
        AppError::InvalidInput("invalid request".to_string())
    })?;

    let login_response = app_state.auth.login(&payload)?;
    Ok(Json(login_response))
}

async fn health_check_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<&'static str, AppError> {
    let store = app_state.subscription_service.store();
    store.health_check().await.map_err(|e| {
        error!(backend = store.backend_name(), error = %e, "Store health check failed.");
        AppError::from(e)
    })?;
    Ok("OK")
}

pub fn create_axum_router(app_state: Arc<AppState>) -> Router {
    let verifier: Arc<dyn TokenVerifier> = app_state.auth.clone();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(vec![Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check_handler))
        .route("/login", post(login_handler))
        .route(
            "/me",
            get(auth_service::me).route_layer(axum_middleware::from_fn_with_state(
                AuthGate::required(verifier.clone()),
                auth::auth,
            )),
        )
        .merge(
            subscription_routes::create_protected_router().route_layer(
                axum_middleware::from_fn_with_state(AuthGate::required(verifier.clone()), auth::auth),
            ),
        )
        .merge(
            subscription_routes::create_public_router().route_layer(
                axum_middleware::from_fn_with_state(AuthGate::optional(verifier), auth::auth),
            ),
        )
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
