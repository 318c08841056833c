use sqlx::PgPool;
use uuid::Uuid;

use super::super::models::{MutationSignatureRecord, SIGNATURE_COLUMNS};

#[derive(Debug, thiserror::Error)]
pub enum GetMutationSignatureError {
    #[error("Mutation signature '{0}' not found")]
    NotFound(Uuid),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Fetch the live version of an entry by stable ident, scoped to its report
#[tracing::instrument(skip(pool), fields(ident = %ident))]
pub async fn handle(
    pool: &PgPool,
    report_id: i32,
    ident: Uuid,
) -> Result<MutationSignatureRecord, GetMutationSignatureError> {
    let sql = format!(
        "SELECT {SIGNATURE_COLUMNS} FROM mutation_signatures \
         WHERE ident = $1 AND report_id = $2 AND deleted_at IS NULL \
         ORDER BY data_version DESC LIMIT 1"
    );

    sqlx::query_as::<_, MutationSignatureRecord>(&sql)
        .bind(ident)
        .bind(report_id)
        .fetch_optional(pool)
        .await?
        .ok_or(GetMutationSignatureError::NotFound(ident))
}
