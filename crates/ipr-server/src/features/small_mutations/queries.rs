//! Read queries for small mutations

use sqlx::PgPool;
use uuid::Uuid;

use super::{SmallMutationRecord, MUTATION_COLUMNS};

#[derive(Debug, thiserror::Error)]
pub enum SmallMutationQueryError {
    #[error("Small mutation '{0}' not found")]
    NotFound(Uuid),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// List live entries for a report
#[tracing::instrument(skip(pool))]
pub async fn list(
    pool: &PgPool,
    report_id: i32,
) -> Result<Vec<SmallMutationRecord>, SmallMutationQueryError> {
    let sql = format!(
        "SELECT {MUTATION_COLUMNS} FROM small_mutations \
         WHERE report_id = $1 AND deleted_at IS NULL \
         ORDER BY gene NULLS LAST, id"
    );

    Ok(sqlx::query_as::<_, SmallMutationRecord>(&sql)
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
) -> Result<SmallMutationRecord, SmallMutationQueryError> {
    let sql = format!(
        "SELECT {MUTATION_COLUMNS} FROM small_mutations \
         WHERE ident = $1 AND report_id = $2 AND deleted_at IS NULL \
         ORDER BY data_version DESC LIMIT 1"
    );

    sqlx::query_as::<_, SmallMutationRecord>(&sql)
        .bind(ident)
        .bind(report_id)
        .fetch_optional(pool)
        .await?
        .ok_or(SmallMutationQueryError::NotFound(ident))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_get_unknown_is_not_found(pool: PgPool) {
        let result = get(&pool, 1, Uuid::new_v4()).await;
        assert!(matches!(result, Err(SmallMutationQueryError::NotFound(_))));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_get_is_scoped_to_owning_report(pool: PgPool) {
        let patient_id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO patients (patient_identifier) VALUES ('POG1234') RETURNING id",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        let owning_report = sqlx::query_scalar::<_, i32>(
            "INSERT INTO reports (patient_id) VALUES ($1) RETURNING id",
        )
        .bind(patient_id)
        .fetch_one(&pool)
        .await
        .unwrap();
        let other_report = sqlx::query_scalar::<_, i32>(
            "INSERT INTO reports (patient_id) VALUES ($1) RETURNING id",
        )
        .bind(patient_id)
        .fetch_one(&pool)
        .await
        .unwrap();
        let ident = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO small_mutations (report_id, gene) VALUES ($1, 'KRAS') RETURNING ident",
        )
        .bind(owning_report)
        .fetch_one(&pool)
        .await
        .unwrap();

        let found = get(&pool, owning_report, ident).await.unwrap();
        assert_eq!(found.gene.as_deref(), Some("KRAS"));

        let denied = get(&pool, other_report, ident).await;
        assert!(matches!(denied, Err(SmallMutationQueryError::NotFound(_))));
    }
}
