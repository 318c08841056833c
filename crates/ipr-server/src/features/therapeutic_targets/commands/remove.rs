//! Soft-delete a therapeutic target entry (no history row)

use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum RemoveTherapeuticTargetError {
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
) -> Result<(), RemoveTherapeuticTargetError> {
    let result = sqlx::query(
        "UPDATE therapeutic_targets SET deleted_at = NOW(), updated_at = NOW() \
         WHERE ident = $1 AND report_id = $2 AND deleted_at IS NULL",
    )
    .bind(ident)
    .bind(report_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RemoveTherapeuticTargetError::NotFound(ident));
    }

    tracing::info!("Therapeutic target removed");

    Ok(())
}
