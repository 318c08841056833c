//! Soft-delete a mutation signature entry
//!
//! Plain removal, not a revision: the entry simply stops being live and no
//! history row is written.

use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum RemoveMutationSignatureError {
    #[error("Mutation signature '{0}' not found")]
    NotFound(Uuid),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[tracing::instrument(skip(pool), fields(ident = %ident))]
pub async fn handle(
    pool: &PgPool,
    report_id: i32,
    ident: Uuid,
) -> Result<(), RemoveMutationSignatureError> {
    let result = sqlx::query(
        "UPDATE mutation_signatures SET deleted_at = NOW(), updated_at = NOW() \
         WHERE ident = $1 AND report_id = $2 AND deleted_at IS NULL",
    )
    .bind(ident)
    .bind(report_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RemoveMutationSignatureError::NotFound(ident));
    }

    tracing::info!("Mutation signature removed");

    Ok(())
}
