//! Session endpoint wiring

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::response::ApiResponse;
use crate::AppState;

use super::middleware::bearer_token;
use super::models::{AuthError, SessionRequest};
use super::session;

/// Routes for `/session`: login is unauthenticated, logout revokes the
/// presented token
pub fn session_routes() -> Router<AppState> {
    Router::new().route("/", post(login).delete(logout))
}

#[tracing::instrument(skip(state, request))]
async fn login(
    State(state): State<AppState>,
    Json(request): Json<SessionRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let response = session::login(&state.db, &state.config.auth, request).await?;
    Ok(Json(ApiResponse::success(response)))
}

#[tracing::instrument(skip(state, headers))]
async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AuthError> {
    let token = bearer_token(&headers)?;
    session::logout(&state.db, token).await?;
    Ok(Json(ApiResponse::success(serde_json::json!({
        "revoked": true
    }))))
}
