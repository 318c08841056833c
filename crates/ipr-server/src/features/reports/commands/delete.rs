//! Soft-delete a report and its sub-entities

use sqlx::PgPool;
use uuid::Uuid;

use crate::versioning::VersionedTable;

#[derive(Debug, thiserror::Error)]
pub enum DeleteReportError {
    #[error("Report '{0}' not found")]
    NotFound(Uuid),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Soft-delete the report plus every live sub-entity row, atomically
#[tracing::instrument(skip(pool), fields(report_ident = %ident))]
pub async fn handle(pool: &PgPool, ident: Uuid) -> Result<(), DeleteReportError> {
    let mut tx = pool.begin().await?;

    let report_id = sqlx::query_scalar::<_, i32>(
        r#"
        UPDATE reports SET deleted_at = NOW(), updated_at = NOW()
        WHERE ident = $1 AND deleted_at IS NULL
        RETURNING id
        "#,
    )
    .bind(ident)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(DeleteReportError::NotFound(ident))?;

    for table in VersionedTable::ALL {
        let sql = format!(
            "UPDATE {} SET deleted_at = NOW() WHERE report_id = $1 AND deleted_at IS NULL",
            table.table()
        );
        sqlx::query(&sql).bind(report_id).execute(&mut *tx).await?;
    }

    tx.commit().await?;

    tracing::info!(report_id, "Report soft-deleted");

    Ok(())
}
