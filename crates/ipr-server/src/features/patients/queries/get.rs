use sqlx::PgPool;

use super::super::models::PatientRecord;

#[derive(Debug, thiserror::Error)]
pub enum GetPatientError {
    #[error("Patient '{0}' not found")]
    NotFound(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Fetch a live patient by external identifier
#[tracing::instrument(skip(pool))]
pub async fn handle(pool: &PgPool, patient_identifier: &str) -> Result<PatientRecord, GetPatientError> {
    sqlx::query_as::<_, PatientRecord>(
        r#"
        SELECT id, ident, patient_identifier, physician, gender, age_of_consent,
               created_at, updated_at
        FROM patients
        WHERE patient_identifier = $1 AND deleted_at IS NULL
        "#,
    )
    .bind(patient_identifier)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| GetPatientError::NotFound(patient_identifier.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_missing_patient_is_not_found(pool: PgPool) {
        let result = handle(&pool, "POG9999").await;
        assert!(matches!(result, Err(GetPatientError::NotFound(_))));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_soft_deleted_patient_is_not_found(pool: PgPool) {
        sqlx::query(
            "INSERT INTO patients (patient_identifier, deleted_at) VALUES ('POG1234', NOW())",
        )
        .execute(&pool)
        .await
        .unwrap();

        let result = handle(&pool, "POG1234").await;
        assert!(matches!(result, Err(GetPatientError::NotFound(_))));
    }
}
