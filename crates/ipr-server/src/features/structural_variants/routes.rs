use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Extension, Json, Router,
};
use serde_json::json;
use uuid::Uuid;

use crate::api::response::{ApiResponse, ErrorResponse};
use crate::auth::AuthUser;
use crate::features::reports::models::resolve_report_id;
use crate::versioning::ReviseError;
use crate::AppState;

use super::commands::{
    CreateStructuralVariantCommand, ReviseStructuralVariantCommand, StructuralVariantCommandError,
};
use super::queries::StructuralVariantQueryError;

/// Routes nested under `/reports/:report_ident/structural-variants`
pub fn structural_variants_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_variants).post(create_variant))
        .route(
            "/:ident",
            get(get_variant).put(revise_variant).delete(remove_variant),
        )
}

async fn report_id_for(
    state: &AppState,
    report_ident: Uuid,
) -> Result<i32, StructuralVariantApiError> {
    resolve_report_id(&state.db, report_ident)
        .await
        .map_err(|e| StructuralVariantApiError::Query(StructuralVariantQueryError::Database(e)))?
        .ok_or(StructuralVariantApiError::ReportNotFound(report_ident))
}

#[tracing::instrument(skip(state), fields(report_ident = %report_ident))]
async fn list_variants(
    State(state): State<AppState>,
    Path(report_ident): Path<Uuid>,
) -> Result<Response, StructuralVariantApiError> {
    let report_id = report_id_for(&state, report_ident).await?;
    let records = super::queries::list(&state.db, report_id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(records))).into_response())
}

#[tracing::instrument(skip(state, command), fields(report_ident = %report_ident))]
async fn create_variant(
    State(state): State<AppState>,
    Path(report_ident): Path<Uuid>,
    Json(mut command): Json<CreateStructuralVariantCommand>,
) -> Result<Response, StructuralVariantApiError> {
    command.report_id = report_id_for(&state, report_ident).await?;
    let record = super::commands::create(&state.db, command).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(record))).into_response())
}

#[tracing::instrument(skip(state), fields(ident = %ident))]
async fn get_variant(
    State(state): State<AppState>,
    Path((report_ident, ident)): Path<(Uuid, Uuid)>,
) -> Result<Response, StructuralVariantApiError> {
    let report_id = report_id_for(&state, report_ident).await?;
    let record = super::queries::get(&state.db, report_id, ident).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(record))).into_response())
}

#[tracing::instrument(skip(state, user, command), fields(ident = %ident))]
async fn revise_variant(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((report_ident, ident)): Path<(Uuid, Uuid)>,
    Json(mut command): Json<ReviseStructuralVariantCommand>,
) -> Result<Response, StructuralVariantApiError> {
    command.ident = ident;
    command.report_id = report_id_for(&state, report_ident).await?;
    command.actor = Some(user.id);
    let record = super::commands::revise_entry(&state.db, command).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(record))).into_response())
}

#[tracing::instrument(skip(state), fields(ident = %ident))]
async fn remove_variant(
    State(state): State<AppState>,
    Path((report_ident, ident)): Path<(Uuid, Uuid)>,
) -> Result<Response, StructuralVariantApiError> {
    let report_id = report_id_for(&state, report_ident).await?;
    super::commands::remove(&state.db, report_id, ident).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(json!({ "deleted": true }))),
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
enum StructuralVariantApiError {
    #[error("Report '{0}' not found")]
    ReportNotFound(Uuid),
    #[error(transparent)]
    Command(#[from] StructuralVariantCommandError),
    #[error(transparent)]
    Query(#[from] StructuralVariantQueryError),
}

impl IntoResponse for StructuralVariantApiError {
    fn into_response(self) -> Response {
        match self {
            StructuralVariantApiError::ReportNotFound(_)
            | StructuralVariantApiError::Query(StructuralVariantQueryError::NotFound(_))
            | StructuralVariantApiError::Command(StructuralVariantCommandError::NotFound(_))
            | StructuralVariantApiError::Command(StructuralVariantCommandError::Revise(
                ReviseError::NotFound(_),
            )) => {
                let error = ErrorResponse::new("NOT_FOUND", self.to_string());
                (StatusCode::NOT_FOUND, Json(error)).into_response()
            },
            StructuralVariantApiError::Command(StructuralVariantCommandError::Revise(
                ReviseError::VersionConflict(_, _),
            )) => {
                let error = ErrorResponse::new("CONFLICT", self.to_string());
                (StatusCode::CONFLICT, Json(error)).into_response()
            },
            StructuralVariantApiError::Command(StructuralVariantCommandError::Comment(_))
            | StructuralVariantApiError::Command(StructuralVariantCommandError::Revise(
                ReviseError::MissingRequiredField(_)
                | ReviseError::UnknownColumn(_)
                | ReviseError::InvalidSnapshot(_),
            )) => {
                let error = ErrorResponse::new("VALIDATION_ERROR", self.to_string());
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            _ => {
                tracing::error!("Error in structural variant endpoint: {}", self);
                let error = ErrorResponse::new("INTERNAL_ERROR", "An internal error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
        }
    }
}
