#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::Request;
use std::sync::Arc;

use subscriptions::db::services::{InMemorySubscriptionStore, SubscriptionStore};
use subscriptions::server::config::ServerConfig;
use subscriptions::web::{AppState, create_axum_router};

pub const TOKEN: &str = "test-token";

pub fn app_with_store(store: Arc<dyn SubscriptionStore>) -> Router {
    create_axum_router(Arc::new(AppState::new(store, &ServerConfig::default())))
}

pub fn app() -> Router {
    app_with_store(Arc::new(InMemorySubscriptionStore::new()))
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn authed_json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {TOKEN}"))
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn authed_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {TOKEN}"))
        .body(Body::empty())
        .expect("request")
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

pub fn netflix() -> serde_json::Value {
    serde_json::json!({
        "service_name": "Netflix",
        "price": 10000,
        "user_id": "u1",
        "start_date": "2026-01-01"
    })
}
