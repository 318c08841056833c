use serde::Deserialize;
use sqlx::PgPool;

use crate::features::shared::pagination::{Paginated, PaginationParams};

use super::super::models::PatientRecord;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ListPatientsQuery {
    /// Case-insensitive substring match on `patient_identifier`
    #[serde(default)]
    pub search: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, thiserror::Error)]
pub enum ListPatientsError {
    #[error("Invalid pagination: {0}")]
    InvalidPagination(&'static str),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[tracing::instrument(skip(pool, query))]
pub async fn handle(
    pool: &PgPool,
    query: ListPatientsQuery,
) -> Result<Paginated<PatientRecord>, ListPatientsError> {
    query
        .pagination
        .validate()
        .map_err(ListPatientsError::InvalidPagination)?;

    let pattern = query
        .search
        .as_deref()
        .map(|s| format!("%{}%", s.trim()));

    let total = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM patients
        WHERE deleted_at IS NULL
          AND ($1::text IS NULL OR patient_identifier ILIKE $1)
        "#,
    )
    .bind(&pattern)
    .fetch_one(pool)
    .await?;

    let items = sqlx::query_as::<_, PatientRecord>(
        r#"
        SELECT id, ident, patient_identifier, physician, gender, age_of_consent,
               created_at, updated_at
        FROM patients
        WHERE deleted_at IS NULL
          AND ($1::text IS NULL OR patient_identifier ILIKE $1)
        ORDER BY patient_identifier
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(&pattern)
    .bind(query.pagination.per_page())
    .bind(query.pagination.offset())
    .fetch_all(pool)
    .await?;

    Ok(Paginated::from_items(items, &query.pagination, total))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seed(pool: &PgPool, identifier: &str) {
        sqlx::query("INSERT INTO patients (patient_identifier) VALUES ($1)")
            .bind(identifier)
            .execute(pool)
            .await
            .unwrap();
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_lists_and_filters(pool: PgPool) {
        seed(&pool, "POG1001").await;
        seed(&pool, "POG1002").await;
        seed(&pool, "TEST-01").await;

        let all = handle(&pool, ListPatientsQuery::default()).await.unwrap();
        assert_eq!(all.pagination.total, 3);

        let filtered = handle(
            &pool,
            ListPatientsQuery {
                search: Some("pog".to_string()),
                pagination: PaginationParams::default(),
            },
        )
        .await
        .unwrap();
        assert_eq!(filtered.pagination.total, 2);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_rejects_invalid_pagination(pool: PgPool) {
        let result = handle(
            &pool,
            ListPatientsQuery {
                search: None,
                pagination: PaginationParams::new(Some(0), None),
            },
        )
        .await;
        assert!(matches!(result, Err(ListPatientsError::InvalidPagination(_))));
    }
}
