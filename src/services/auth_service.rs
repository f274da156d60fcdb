use async_trait::async_trait;
use axum::Extension;
use tracing::warn;

use crate::web::error::AppError;
use crate::web::models::{LoginRequest, LoginResponse, Principal};

/// Checks a bearer token and says who it belongs to. The auth middleware only talks to this trait,
/// so the static verifier below can be swapped for a real identity provider.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Principal, AppError>;
}

/// Single shared token handed out to a single configured admin account.
/// No expiry, no per-user tokens.
#[derive(Debug, Clone)]
pub struct StaticTokenAuth {
    token: String,
    username: String,
    password: String,
}

impl StaticTokenAuth {
    pub fn new(
        token: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            token: token.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn login(&self, req: &LoginRequest) -> Result<LoginResponse, AppError> {
        if req.username != self.username || req.password != self.password {
            warn!(username = %req.username, "Rejected login attempt.");
            return Err(AppError::InvalidCredentials);
        }

        Ok(LoginResponse {
            token: self.token.clone(),
        })
    }
}

#[async_trait]
impl TokenVerifier for StaticTokenAuth {
    async fn verify(&self, token: &str) -> Result<Principal, AppError> {
        if token.is_empty() || token != self.token {
            return Err(AppError::Unauthorized("Invalid token".to_string()));
        }
        Ok(Principal {
            subject: self.username.clone(),
        })
    }
}

/// Echoes the caller resolved by the auth middleware.
pub async fn me(Extension(principal): Extension<Principal>) -> axum::Json<Principal> {
    axum::Json(principal)
}
