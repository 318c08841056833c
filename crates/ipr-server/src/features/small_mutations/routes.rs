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
    CreateSmallMutationCommand, ReviseSmallMutationCommand, SmallMutationCommandError,
};
use super::queries::SmallMutationQueryError;

/// Routes nested under `/reports/:report_ident/small-mutations`
pub fn small_mutations_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_mutations).post(create_mutation))
        .route(
            "/:ident",
            get(get_mutation).put(revise_mutation).delete(remove_mutation),
        )
}

async fn report_id_for(state: &AppState, report_ident: Uuid) -> Result<i32, SmallMutationApiError> {
    resolve_report_id(&state.db, report_ident)
        .await
        .map_err(|e| SmallMutationApiError::Query(SmallMutationQueryError::Database(e)))?
        .ok_or(SmallMutationApiError::ReportNotFound(report_ident))
}

#[tracing::instrument(skip(state), fields(report_ident = %report_ident))]
async fn list_mutations(
    State(state): State<AppState>,
    Path(report_ident): Path<Uuid>,
) -> Result<Response, SmallMutationApiError> {
    let report_id = report_id_for(&state, report_ident).await?;
    let records = super::queries::list(&state.db, report_id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(records))).into_response())
}

#[tracing::instrument(skip(state, command), fields(report_ident = %report_ident))]
async fn create_mutation(
    State(state): State<AppState>,
    Path(report_ident): Path<Uuid>,
    Json(mut command): Json<CreateSmallMutationCommand>,
) -> Result<Response, SmallMutationApiError> {
    command.report_id = report_id_for(&state, report_ident).await?;
    let record = super::commands::create(&state.db, command).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(record))).into_response())
}

#[tracing::instrument(skip(state), fields(ident = %ident))]
async fn get_mutation(
    State(state): State<AppState>,
    Path((report_ident, ident)): Path<(Uuid, Uuid)>,
) -> Result<Response, SmallMutationApiError> {
    let report_id = report_id_for(&state, report_ident).await?;
    let record = super::queries::get(&state.db, report_id, ident).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(record))).into_response())
}

#[tracing::instrument(skip(state, user, command), fields(ident = %ident))]
async fn revise_mutation(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((report_ident, ident)): Path<(Uuid, Uuid)>,
    Json(mut command): Json<ReviseSmallMutationCommand>,
) -> Result<Response, SmallMutationApiError> {
    command.ident = ident;
    command.report_id = report_id_for(&state, report_ident).await?;
    command.actor = Some(user.id);
    let record = super::commands::revise_entry(&state.db, command).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(record))).into_response())
}

#[tracing::instrument(skip(state), fields(ident = %ident))]
async fn remove_mutation(
    State(state): State<AppState>,
    Path((report_ident, ident)): Path<(Uuid, Uuid)>,
) -> Result<Response, SmallMutationApiError> {
    let report_id = report_id_for(&state, report_ident).await?;
    super::commands::remove(&state.db, report_id, ident).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(json!({ "deleted": true }))),
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
enum SmallMutationApiError {
    #[error("Report '{0}' not found")]
    ReportNotFound(Uuid),
    #[error(transparent)]
    Command(#[from] SmallMutationCommandError),
    #[error(transparent)]
    Query(#[from] SmallMutationQueryError),
}

impl IntoResponse for SmallMutationApiError {
    fn into_response(self) -> Response {
        match self {
            SmallMutationApiError::ReportNotFound(_)
            | SmallMutationApiError::Query(SmallMutationQueryError::NotFound(_))
            | SmallMutationApiError::Command(SmallMutationCommandError::NotFound(_))
            | SmallMutationApiError::Command(SmallMutationCommandError::Revise(
                ReviseError::NotFound(_),
            )) => {
                let error = ErrorResponse::new("NOT_FOUND", self.to_string());
                (StatusCode::NOT_FOUND, Json(error)).into_response()
            },
            SmallMutationApiError::Command(SmallMutationCommandError::Revise(
                ReviseError::VersionConflict(_, _),
            )) => {
                let error = ErrorResponse::new("CONFLICT", self.to_string());
                (StatusCode::CONFLICT, Json(error)).into_response()
            },
            SmallMutationApiError::Command(SmallMutationCommandError::Comment(_))
            | SmallMutationApiError::Command(SmallMutationCommandError::Revise(
                ReviseError::MissingRequiredField(_)
                | ReviseError::UnknownColumn(_)
                | ReviseError::InvalidSnapshot(_),
            )) => {
                let error = ErrorResponse::new("VALIDATION_ERROR", self.to_string());
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            _ => {
                tracing::error!("Error in small mutation endpoint: {}", self);
                let error = ErrorResponse::new("INTERNAL_ERROR", "An internal error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
        }
    }
}
