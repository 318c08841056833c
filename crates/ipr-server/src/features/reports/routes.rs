use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Extension, Json, Router,
};
use serde_json::json;
use uuid::Uuid;

use crate::api::response::{ApiResponse, ErrorResponse};
use crate::auth::AuthUser;
use crate::history::{self, HistoryQuery};
use crate::AppState;

use super::commands::{
    CreateReportCommand, CreateReportError, DeleteReportError, UpdateReportStateCommand,
    UpdateReportStateError,
};
use super::models::resolve_report_id;
use super::queries::{GetReportError, ListReportsError, ListReportsQuery};

pub fn reports_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_reports).post(create_report))
        .route("/:report_ident", get(get_report).delete(delete_report))
        .route("/:report_ident/state", put(update_state))
        .route("/:report_ident/history", get(list_history))
}

#[tracing::instrument(skip(state, user, command), fields(patient_identifier = %command.patient_identifier))]
async fn create_report(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(mut command): Json<CreateReportCommand>,
) -> Result<Response, ReportApiError> {
    command.created_by_id = Some(user.id);

    let report = super::commands::create::handle(&state.db, command).await?;

    tracing::info!(report_ident = %report.ident, "Report created via API");

    Ok((StatusCode::CREATED, Json(ApiResponse::success(report))).into_response())
}

#[tracing::instrument(skip(state), fields(report_ident = %report_ident))]
async fn get_report(
    State(state): State<AppState>,
    Path(report_ident): Path<Uuid>,
) -> Result<Response, ReportApiError> {
    let report = super::queries::get::handle(&state.db, report_ident).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(report))).into_response())
}

#[tracing::instrument(skip(state, query))]
async fn list_reports(
    State(state): State<AppState>,
    Query(query): Query<ListReportsQuery>,
) -> Result<Response, ReportApiError> {
    let page = super::queries::list::handle(&state.db, query).await?;
    let meta = json!({ "pagination": page.pagination });
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success_with_meta(page.items, meta)),
    )
        .into_response())
}

#[tracing::instrument(skip(state, command), fields(report_ident = %report_ident))]
async fn update_state(
    State(state): State<AppState>,
    Path(report_ident): Path<Uuid>,
    Json(mut command): Json<UpdateReportStateCommand>,
) -> Result<Response, ReportApiError> {
    command.ident = report_ident;

    let report = super::commands::update_state::handle(&state.db, command).await?;

    tracing::info!(report_ident = %report.ident, state = %report.state, "Report state updated via API");

    Ok((StatusCode::OK, Json(ApiResponse::success(report))).into_response())
}

#[tracing::instrument(skip(state), fields(report_ident = %report_ident))]
async fn delete_report(
    State(state): State<AppState>,
    Path(report_ident): Path<Uuid>,
) -> Result<Response, ReportApiError> {
    super::commands::delete::handle(&state.db, report_ident).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(json!({ "deleted": true }))),
    )
        .into_response())
}

#[tracing::instrument(skip(state, query), fields(report_ident = %report_ident))]
async fn list_history(
    State(state): State<AppState>,
    Path(report_ident): Path<Uuid>,
    Query(query): Query<HistoryQuery>,
) -> Result<Response, ReportApiError> {
    let report_id = resolve_report_id(&state.db, report_ident)
        .await
        .map_err(|e| ReportApiError::Get(GetReportError::Database(e)))?
        .ok_or(ReportApiError::Get(GetReportError::NotFound(report_ident)))?;

    let records = history::queries::list_for_report(&state.db, report_id, &query)
        .await
        .map_err(|e| ReportApiError::Get(GetReportError::Database(e)))?;
    let total = history::queries::count_for_report(&state.db, report_id)
        .await
        .map_err(|e| ReportApiError::Get(GetReportError::Database(e)))?;

    let meta = json!({ "total": total, "limit": query.limit(), "offset": query.offset() });
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success_with_meta(records, meta)),
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
enum ReportApiError {
    #[error(transparent)]
    Create(#[from] CreateReportError),
    #[error(transparent)]
    UpdateState(#[from] UpdateReportStateError),
    #[error(transparent)]
    Delete(#[from] DeleteReportError),
    #[error(transparent)]
    Get(#[from] GetReportError),
    #[error(transparent)]
    List(#[from] ListReportsError),
}

impl IntoResponse for ReportApiError {
    fn into_response(self) -> Response {
        match self {
            ReportApiError::UpdateState(UpdateReportStateError::UnknownState(_))
            | ReportApiError::List(ListReportsError::InvalidPagination(_)) => {
                let error = ErrorResponse::new("VALIDATION_ERROR", self.to_string());
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            ReportApiError::UpdateState(UpdateReportStateError::InvalidTransition { .. }) => {
                let error = ErrorResponse::new("CONFLICT", self.to_string());
                (StatusCode::CONFLICT, Json(error)).into_response()
            },
            ReportApiError::Create(CreateReportError::PatientNotFound(_))
            | ReportApiError::UpdateState(UpdateReportStateError::NotFound(_))
            | ReportApiError::Delete(DeleteReportError::NotFound(_))
            | ReportApiError::Get(GetReportError::NotFound(_)) => {
                let error = ErrorResponse::new("NOT_FOUND", self.to_string());
                (StatusCode::NOT_FOUND, Json(error)).into_response()
            },
            ReportApiError::Create(CreateReportError::Database(_))
            | ReportApiError::UpdateState(UpdateReportStateError::Database(_))
            | ReportApiError::Delete(DeleteReportError::Database(_))
            | ReportApiError::Get(GetReportError::Database(_))
            | ReportApiError::List(ListReportsError::Database(_)) => {
                tracing::error!("Database error in report endpoint: {}", self);
                let error = ErrorResponse::new("INTERNAL_ERROR", "A database error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
        }
    }
}
