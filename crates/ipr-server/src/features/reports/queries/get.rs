use sqlx::PgPool;
use uuid::Uuid;

use super::super::models::ReportRecord;

#[derive(Debug, thiserror::Error)]
pub enum GetReportError {
    #[error("Report '{0}' not found")]
    NotFound(Uuid),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Fetch a live report by public ident
#[tracing::instrument(skip(pool), fields(report_ident = %ident))]
pub async fn handle(pool: &PgPool, ident: Uuid) -> Result<ReportRecord, GetReportError> {
    sqlx::query_as::<_, ReportRecord>(
        r#"
        SELECT r.id, r.ident, r.patient_id, p.patient_identifier,
               r.biopsy_name, r.alternate_identifier, r.state, r.created_by_id,
               r.created_at, r.updated_at
        FROM reports r
        JOIN patients p ON p.id = r.patient_id
        WHERE r.ident = $1 AND r.deleted_at IS NULL
        "#,
    )
    .bind(ident)
    .fetch_optional(pool)
    .await?
    .ok_or(GetReportError::NotFound(ident))
}
