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
    CreateMutationSignatureCommand, CreateMutationSignatureError, RemoveMutationSignatureError,
    ReviseMutationSignatureCommand, ReviseMutationSignatureError,
};
use super::queries::{GetMutationSignatureError, ListMutationSignaturesError};

/// Routes nested under `/reports/:report_ident/mutation-signatures`
pub fn mutation_signatures_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_signatures).post(create_signature))
        .route(
            "/:ident",
            get(get_signature).put(revise_signature).delete(remove_signature),
        )
}

async fn report_id_for(
    state: &AppState,
    report_ident: Uuid,
) -> Result<i32, MutationSignatureApiError> {
    resolve_report_id(&state.db, report_ident)
        .await
        .map_err(|e| MutationSignatureApiError::List(ListMutationSignaturesError::Database(e)))?
        .ok_or(MutationSignatureApiError::ReportNotFound(report_ident))
}

#[tracing::instrument(skip(state), fields(report_ident = %report_ident))]
async fn list_signatures(
    State(state): State<AppState>,
    Path(report_ident): Path<Uuid>,
) -> Result<Response, MutationSignatureApiError> {
    let report_id = report_id_for(&state, report_ident).await?;
    let records = super::queries::list::handle(&state.db, report_id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(records))).into_response())
}

#[tracing::instrument(skip(state, command), fields(report_ident = %report_ident))]
async fn create_signature(
    State(state): State<AppState>,
    Path(report_ident): Path<Uuid>,
    Json(mut command): Json<CreateMutationSignatureCommand>,
) -> Result<Response, MutationSignatureApiError> {
    command.report_id = report_id_for(&state, report_ident).await?;
    let record = super::commands::create::handle(&state.db, command).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(record))).into_response())
}

#[tracing::instrument(skip(state), fields(ident = %ident))]
async fn get_signature(
    State(state): State<AppState>,
    Path((report_ident, ident)): Path<(Uuid, Uuid)>,
) -> Result<Response, MutationSignatureApiError> {
    let report_id = report_id_for(&state, report_ident).await?;
    let record = super::queries::get::handle(&state.db, report_id, ident).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(record))).into_response())
}

#[tracing::instrument(skip(state, user, command), fields(ident = %ident))]
async fn revise_signature(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((report_ident, ident)): Path<(Uuid, Uuid)>,
    Json(mut command): Json<ReviseMutationSignatureCommand>,
) -> Result<Response, MutationSignatureApiError> {
    command.ident = ident;
    command.report_id = report_id_for(&state, report_ident).await?;
    command.actor = Some(user.id);

    let record = super::commands::revise::handle(&state.db, command).await?;

    tracing::info!(new_version = record.data_version, "Mutation signature revised via API");

    Ok((StatusCode::OK, Json(ApiResponse::success(record))).into_response())
}

#[tracing::instrument(skip(state), fields(ident = %ident))]
async fn remove_signature(
    State(state): State<AppState>,
    Path((report_ident, ident)): Path<(Uuid, Uuid)>,
) -> Result<Response, MutationSignatureApiError> {
    let report_id = report_id_for(&state, report_ident).await?;
    super::commands::remove::handle(&state.db, report_id, ident).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(json!({ "deleted": true }))),
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
enum MutationSignatureApiError {
    #[error("Report '{0}' not found")]
    ReportNotFound(Uuid),
    #[error(transparent)]
    Create(#[from] CreateMutationSignatureError),
    #[error(transparent)]
    Revise(#[from] ReviseMutationSignatureError),
    #[error(transparent)]
    Remove(#[from] RemoveMutationSignatureError),
    #[error(transparent)]
    Get(#[from] GetMutationSignatureError),
    #[error(transparent)]
    List(#[from] ListMutationSignaturesError),
}

impl IntoResponse for MutationSignatureApiError {
    fn into_response(self) -> Response {
        match self {
            MutationSignatureApiError::ReportNotFound(_)
            | MutationSignatureApiError::Get(GetMutationSignatureError::NotFound(_))
            | MutationSignatureApiError::Remove(RemoveMutationSignatureError::NotFound(_))
            | MutationSignatureApiError::Revise(ReviseMutationSignatureError::Revise(
                ReviseError::NotFound(_),
            )) => {
                let error = ErrorResponse::new("NOT_FOUND", self.to_string());
                (StatusCode::NOT_FOUND, Json(error)).into_response()
            },
            MutationSignatureApiError::Revise(ReviseMutationSignatureError::Revise(
                ReviseError::VersionConflict(_, _),
            )) => {
                let error = ErrorResponse::new("CONFLICT", self.to_string());
                (StatusCode::CONFLICT, Json(error)).into_response()
            },
            MutationSignatureApiError::Revise(ReviseMutationSignatureError::Comment(_))
            | MutationSignatureApiError::Revise(ReviseMutationSignatureError::Revise(
                ReviseError::MissingRequiredField(_)
                | ReviseError::UnknownColumn(_)
                | ReviseError::InvalidSnapshot(_),
            )) => {
                let error = ErrorResponse::new("VALIDATION_ERROR", self.to_string());
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            _ => {
                tracing::error!("Error in mutation signature endpoint: {}", self);
                let error = ErrorResponse::new("INTERNAL_ERROR", "An internal error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_conflict_maps_to_409() {
        let err = MutationSignatureApiError::Revise(ReviseMutationSignatureError::Revise(
            ReviseError::VersionConflict(Uuid::new_v4(), 3),
        ));
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_routes_structure() {
        let router = mutation_signatures_routes();
        assert!(format!("{:?}", router).contains("Router"));
    }
}
