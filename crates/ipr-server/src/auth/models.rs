//! Authentication data models

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::response::ErrorResponse;

/// An authenticated user, as attached to request extensions by the bearer
/// middleware
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AuthUser {
    pub id: i32,
    pub ident: Uuid,
    pub username: String,
    pub auth_type: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

/// Login request body
#[derive(Debug, Clone, Deserialize)]
pub struct SessionRequest {
    pub username: String,
    pub password: String,
}

/// Login response: the raw token is only ever returned here
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: AuthUser,
}

/// Internal user row including the credential hash; never serialized
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: i32,
    pub ident: Uuid,
    pub username: String,
    pub auth_type: String,
    pub password_hash: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

impl From<UserRecord> for AuthUser {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            ident: record.ident,
            username: record.username,
            auth_type: record.auth_type,
            first_name: record.first_name,
            last_name: record.last_name,
            email: record.email,
        }
    }
}

/// Authentication failures
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Missing bearer token")]
    TokenMissing,
    #[error("Invalid bearer token")]
    TokenInvalid,
    #[error("Token has expired")]
    TokenExpired,
    #[error("External authentication is not configured")]
    ExternalAuthNotConfigured,
    #[error("External authentication service error: {0}")]
    ExternalService(#[from] reqwest::Error),
    #[error("Password hash error: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::InvalidCredentials => {
                let error = ErrorResponse::new("UNAUTHORIZED", self.to_string());
                (StatusCode::UNAUTHORIZED, Json(error)).into_response()
            },
            AuthError::TokenMissing | AuthError::TokenInvalid | AuthError::TokenExpired => {
                let error = ErrorResponse::new("UNAUTHORIZED", self.to_string());
                (StatusCode::UNAUTHORIZED, Json(error)).into_response()
            },
            AuthError::ExternalAuthNotConfigured => {
                tracing::error!("bcgsc login attempted without IPR_BCGSC_URL configured");
                let error =
                    ErrorResponse::new("SERVICE_UNAVAILABLE", "External authentication unavailable");
                (StatusCode::SERVICE_UNAVAILABLE, Json(error)).into_response()
            },
            AuthError::ExternalService(ref e) => {
                tracing::error!("External authentication service error: {}", e);
                let error =
                    ErrorResponse::new("SERVICE_UNAVAILABLE", "External authentication unavailable");
                (StatusCode::SERVICE_UNAVAILABLE, Json(error)).into_response()
            },
            AuthError::Hash(ref e) => {
                tracing::error!("Password hash error: {}", e);
                let error = ErrorResponse::new("INTERNAL_ERROR", "An internal error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
            AuthError::Database(ref e) => {
                tracing::error!("Database error during authentication: {}", e);
                let error = ErrorResponse::new("INTERNAL_ERROR", "A database error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
        }
    }
}
