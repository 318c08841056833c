//! Feature slices
//!
//! Each feature owns its commands, queries, and routes. The versioned
//! sub-entity features are nested under their owning report's routes.

use axum::{http::Uri, middleware::from_fn_with_state, routing::get, Json, Router};
use serde_json::json;

use crate::auth;
use crate::error::AppError;
use crate::AppState;

pub mod mutation_signatures;
pub mod patients;
pub mod reports;
pub mod shared;
pub mod small_mutations;
pub mod structural_variants;
pub mod therapeutic_targets;

/// Build the application router
///
/// Everything except `/session` and the health check requires a valid
/// bearer token.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .nest("/patients", patients::patients_routes())
        .nest("/reports", reports::reports_routes())
        .nest(
            "/reports/:report_ident/small-mutations",
            small_mutations::small_mutations_routes(),
        )
        .nest(
            "/reports/:report_ident/mutation-signatures",
            mutation_signatures::mutation_signatures_routes(),
        )
        .nest(
            "/reports/:report_ident/structural-variants",
            structural_variants::structural_variants_routes(),
        )
        .nest(
            "/reports/:report_ident/therapeutic-targets",
            therapeutic_targets::therapeutic_targets_routes(),
        )
        .route_layer(from_fn_with_state(
            state.clone(),
            auth::middleware::require_auth,
        ));

    Router::new()
        .route("/healthz", get(health))
        .nest("/session", auth::session_routes())
        .merge(protected)
        .fallback(unknown_route)
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn unknown_route(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}
