use serde::Deserialize;
use sqlx::PgPool;

use crate::features::shared::pagination::{Paginated, PaginationParams};

use super::super::models::ReportRecord;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ListReportsQuery {
    /// Exact match on the owning patient's identifier
    #[serde(default)]
    pub patient: Option<String>,
    /// Exact match on report state
    #[serde(default)]
    pub state: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, thiserror::Error)]
pub enum ListReportsError {
    #[error("Invalid pagination: {0}")]
    InvalidPagination(&'static str),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[tracing::instrument(skip(pool, query), fields(patient = ?query.patient, state = ?query.state))]
pub async fn handle(
    pool: &PgPool,
    query: ListReportsQuery,
) -> Result<Paginated<ReportRecord>, ListReportsError> {
    query
        .pagination
        .validate()
        .map_err(ListReportsError::InvalidPagination)?;

    let total = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM reports r
        JOIN patients p ON p.id = r.patient_id
        WHERE r.deleted_at IS NULL
          AND ($1::text IS NULL OR p.patient_identifier = $1)
          AND ($2::text IS NULL OR r.state = $2)
        "#,
    )
    .bind(&query.patient)
    .bind(&query.state)
    .fetch_one(pool)
    .await?;

    let items = sqlx::query_as::<_, ReportRecord>(
        r#"
        SELECT r.id, r.ident, r.patient_id, p.patient_identifier,
               r.biopsy_name, r.alternate_identifier, r.state, r.created_by_id,
               r.created_at, r.updated_at
        FROM reports r
        JOIN patients p ON p.id = r.patient_id
        WHERE r.deleted_at IS NULL
          AND ($1::text IS NULL OR p.patient_identifier = $1)
          AND ($2::text IS NULL OR r.state = $2)
        ORDER BY r.created_at DESC, r.id DESC
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(&query.patient)
    .bind(&query.state)
    .bind(query.pagination.per_page())
    .bind(query.pagination.offset())
    .fetch_all(pool)
    .await?;

    Ok(Paginated::from_items(items, &query.pagination, total))
}
