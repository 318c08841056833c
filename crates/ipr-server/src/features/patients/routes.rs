use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;

use crate::api::response::{ApiResponse, ErrorResponse};
use crate::AppState;

use super::commands::{UpsertPatientCommand, UpsertPatientError};
use super::queries::{GetPatientError, ListPatientsError, ListPatientsQuery};

pub fn patients_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_patients).post(upsert_patient))
        .route("/:patient_identifier", get(get_patient))
}

#[tracing::instrument(skip(state, command), fields(patient_identifier = %command.patient_identifier))]
async fn upsert_patient(
    State(state): State<AppState>,
    Json(command): Json<UpsertPatientCommand>,
) -> Result<Response, PatientApiError> {
    let patient = super::commands::upsert::handle(&state.db, command).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(patient))).into_response())
}

#[tracing::instrument(skip(state))]
async fn get_patient(
    State(state): State<AppState>,
    Path(patient_identifier): Path<String>,
) -> Result<Response, PatientApiError> {
    let patient = super::queries::get::handle(&state.db, &patient_identifier).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(patient))).into_response())
}

#[tracing::instrument(skip(state, query))]
async fn list_patients(
    State(state): State<AppState>,
    Query(query): Query<ListPatientsQuery>,
) -> Result<Response, PatientApiError> {
    let page = super::queries::list::handle(&state.db, query).await?;
    let meta = json!({ "pagination": page.pagination });
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success_with_meta(page.items, meta)),
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
enum PatientApiError {
    #[error(transparent)]
    Upsert(#[from] UpsertPatientError),
    #[error(transparent)]
    Get(#[from] GetPatientError),
    #[error(transparent)]
    List(#[from] ListPatientsError),
}

impl IntoResponse for PatientApiError {
    fn into_response(self) -> Response {
        match self {
            PatientApiError::Upsert(UpsertPatientError::Validation(_))
            | PatientApiError::List(ListPatientsError::InvalidPagination(_)) => {
                let error = ErrorResponse::new("VALIDATION_ERROR", self.to_string());
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            PatientApiError::Get(GetPatientError::NotFound(_)) => {
                let error = ErrorResponse::new("NOT_FOUND", self.to_string());
                (StatusCode::NOT_FOUND, Json(error)).into_response()
            },
            PatientApiError::Upsert(UpsertPatientError::Database(_))
            | PatientApiError::Get(GetPatientError::Database(_))
            | PatientApiError::List(ListPatientsError::Database(_)) => {
                tracing::error!("Database error in patient endpoint: {}", self);
                let error = ErrorResponse::new("INTERNAL_ERROR", "A database error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let err = PatientApiError::Get(GetPatientError::NotFound("POG1".to_string()));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_routes_structure() {
        let router = patients_routes();
        assert!(format!("{:?}", router).contains("Router"));
    }
}
