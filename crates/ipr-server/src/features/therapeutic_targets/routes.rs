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
    CreateTherapeuticTargetCommand, CreateTherapeuticTargetError, RemoveTherapeuticTargetError,
    ReviseTherapeuticTargetCommand, ReviseTherapeuticTargetError,
};
use super::queries::{GetTherapeuticTargetError, ListTherapeuticTargetsError};

/// Routes nested under `/reports/:report_ident/therapeutic-targets`
pub fn therapeutic_targets_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_targets).post(create_target))
        .route(
            "/:ident",
            get(get_target).put(revise_target).delete(remove_target),
        )
}

async fn report_id_for(
    state: &AppState,
    report_ident: Uuid,
) -> Result<i32, TherapeuticTargetApiError> {
    resolve_report_id(&state.db, report_ident)
        .await
        .map_err(|e| TherapeuticTargetApiError::List(ListTherapeuticTargetsError::Database(e)))?
        .ok_or(TherapeuticTargetApiError::ReportNotFound(report_ident))
}

#[tracing::instrument(skip(state), fields(report_ident = %report_ident))]
async fn list_targets(
    State(state): State<AppState>,
    Path(report_ident): Path<Uuid>,
) -> Result<Response, TherapeuticTargetApiError> {
    let report_id = report_id_for(&state, report_ident).await?;
    let records = super::queries::list::handle(&state.db, report_id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(records))).into_response())
}

#[tracing::instrument(skip(state, command), fields(report_ident = %report_ident))]
async fn create_target(
    State(state): State<AppState>,
    Path(report_ident): Path<Uuid>,
    Json(mut command): Json<CreateTherapeuticTargetCommand>,
) -> Result<Response, TherapeuticTargetApiError> {
    command.report_id = report_id_for(&state, report_ident).await?;
    let record = super::commands::create::handle(&state.db, command).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(record))).into_response())
}

#[tracing::instrument(skip(state), fields(ident = %ident))]
async fn get_target(
    State(state): State<AppState>,
    Path((report_ident, ident)): Path<(Uuid, Uuid)>,
) -> Result<Response, TherapeuticTargetApiError> {
    let report_id = report_id_for(&state, report_ident).await?;
    let record = super::queries::get::handle(&state.db, report_id, ident).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(record))).into_response())
}

#[tracing::instrument(skip(state, user, command), fields(ident = %ident))]
async fn revise_target(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((report_ident, ident)): Path<(Uuid, Uuid)>,
    Json(mut command): Json<ReviseTherapeuticTargetCommand>,
) -> Result<Response, TherapeuticTargetApiError> {
    command.ident = ident;
    command.report_id = report_id_for(&state, report_ident).await?;
    command.actor = Some(user.id);

    let record = super::commands::revise::handle(&state.db, command).await?;

    tracing::info!(new_version = record.data_version, "Therapeutic target revised via API");

    Ok((StatusCode::OK, Json(ApiResponse::success(record))).into_response())
}

#[tracing::instrument(skip(state), fields(ident = %ident))]
async fn remove_target(
    State(state): State<AppState>,
    Path((report_ident, ident)): Path<(Uuid, Uuid)>,
) -> Result<Response, TherapeuticTargetApiError> {
    let report_id = report_id_for(&state, report_ident).await?;
    super::commands::remove::handle(&state.db, report_id, ident).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(json!({ "deleted": true }))),
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
enum TherapeuticTargetApiError {
    #[error("Report '{0}' not found")]
    ReportNotFound(Uuid),
    #[error(transparent)]
    Create(#[from] CreateTherapeuticTargetError),
    #[error(transparent)]
    Revise(#[from] ReviseTherapeuticTargetError),
    #[error(transparent)]
    Remove(#[from] RemoveTherapeuticTargetError),
    #[error(transparent)]
    Get(#[from] GetTherapeuticTargetError),
    #[error(transparent)]
    List(#[from] ListTherapeuticTargetsError),
}

impl IntoResponse for TherapeuticTargetApiError {
    fn into_response(self) -> Response {
        match self {
            TherapeuticTargetApiError::ReportNotFound(_)
            | TherapeuticTargetApiError::Get(GetTherapeuticTargetError::NotFound(_))
            | TherapeuticTargetApiError::Remove(RemoveTherapeuticTargetError::NotFound(_))
            | TherapeuticTargetApiError::Revise(ReviseTherapeuticTargetError::Revise(
                ReviseError::NotFound(_),
            )) => {
                let error = ErrorResponse::new("NOT_FOUND", self.to_string());
                (StatusCode::NOT_FOUND, Json(error)).into_response()
            },
            TherapeuticTargetApiError::Create(
                CreateTherapeuticTargetError::UnknownTargetType(_),
            )
            | TherapeuticTargetApiError::Revise(ReviseTherapeuticTargetError::Comment(_))
            | TherapeuticTargetApiError::Revise(ReviseTherapeuticTargetError::Revise(
                ReviseError::MissingRequiredField(_)
                | ReviseError::UnknownColumn(_)
                | ReviseError::InvalidSnapshot(_),
            )) => {
                let error = ErrorResponse::new("VALIDATION_ERROR", self.to_string());
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            TherapeuticTargetApiError::Revise(ReviseTherapeuticTargetError::Revise(
                ReviseError::VersionConflict(_, _),
            )) => {
                let error = ErrorResponse::new("CONFLICT", self.to_string());
                (StatusCode::CONFLICT, Json(error)).into_response()
            },
            _ => {
                tracing::error!("Error in therapeutic target endpoint: {}", self);
                let error = ErrorResponse::new("INTERNAL_ERROR", "An internal error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
        }
    }
}
