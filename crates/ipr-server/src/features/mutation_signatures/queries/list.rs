use sqlx::PgPool;

use super::super::models::{MutationSignatureRecord, SIGNATURE_COLUMNS};

#[derive(Debug, thiserror::Error)]
pub enum ListMutationSignaturesError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// List live entries for a report, stable order
#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: &PgPool,
    report_id: i32,
) -> Result<Vec<MutationSignatureRecord>, ListMutationSignaturesError> {
    let sql = format!(
        "SELECT {SIGNATURE_COLUMNS} FROM mutation_signatures \
         WHERE report_id = $1 AND deleted_at IS NULL \
         ORDER BY signature NULLS LAST, id"
    );

    let records = sqlx::query_as::<_, MutationSignatureRecord>(&sql)
        .bind(report_id)
        .fetch_all(pool)
        .await?;

    Ok(records)
}
