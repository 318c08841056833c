//! Read queries for structural variants

use sqlx::PgPool;
use uuid::Uuid;

use super::{StructuralVariantRecord, VARIANT_COLUMNS};

#[derive(Debug, thiserror::Error)]
pub enum StructuralVariantQueryError {
    #[error("Structural variant '{0}' not found")]
    NotFound(Uuid),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// List live entries for a report
#[tracing::instrument(skip(pool))]
pub async fn list(
    pool: &PgPool,
    report_id: i32,
) -> Result<Vec<StructuralVariantRecord>, StructuralVariantQueryError> {
    let sql = format!(
        "SELECT {VARIANT_COLUMNS} FROM structural_variants \
         WHERE report_id = $1 AND deleted_at IS NULL \
         ORDER BY gene1 NULLS LAST, gene2 NULLS LAST, id"
    );

    Ok(sqlx::query_as::<_, StructuralVariantRecord>(&sql)
        .bind(report_id)
        .fetch_all(pool)
        .await?)
}

/// Fetch the live version of an entry by stable ident, scoped to its report
#[tracing::instrument(skip(pool), fields(ident = %ident))]
pub async fn get(
    pool: &PgPool,
    report_id: i32,
    ident: Uuid,
) -> Result<StructuralVariantRecord, StructuralVariantQueryError> {
    let sql = format!(
        "SELECT {VARIANT_COLUMNS} FROM structural_variants \
         WHERE ident = $1 AND report_id = $2 AND deleted_at IS NULL \
         ORDER BY data_version DESC LIMIT 1"
    );

    sqlx::query_as::<_, StructuralVariantRecord>(&sql)
        .bind(ident)
        .bind(report_id)
        .fetch_optional(pool)
        .await?
        .ok_or(StructuralVariantQueryError::NotFound(ident))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_get_unknown_is_not_found(pool: PgPool) {
        let result = get(&pool, 1, Uuid::new_v4()).await;
        assert!(matches!(result, Err(StructuralVariantQueryError::NotFound(_))));
    }
}
