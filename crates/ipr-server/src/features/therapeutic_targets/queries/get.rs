use sqlx::PgPool;
use uuid::Uuid;

use super::super::models::{TherapeuticTargetRecord, TARGET_COLUMNS};

#[derive(Debug, thiserror::Error)]
pub enum GetTherapeuticTargetError {
    #[error("Therapeutic target '{0}' not found")]
    NotFound(Uuid),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[tracing::instrument(skip(pool), fields(ident = %ident))]
pub async fn handle(
    pool: &PgPool,
    report_id: i32,
    ident: Uuid,
) -> Result<TherapeuticTargetRecord, GetTherapeuticTargetError> {
    let sql = format!(
        "SELECT {TARGET_COLUMNS} FROM therapeutic_targets \
         WHERE ident = $1 AND report_id = $2 AND deleted_at IS NULL \
         ORDER BY data_version DESC LIMIT 1"
    );

    sqlx::query_as::<_, TherapeuticTargetRecord>(&sql)
        .bind(ident)
        .bind(report_id)
        .fetch_optional(pool)
        .await?
        .ok_or(GetTherapeuticTargetError::NotFound(ident))
}
