//! Create a report for an existing patient

use serde::Deserialize;
use sqlx::PgPool;

use super::super::models::ReportRecord;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateReportCommand {
    pub patient_identifier: String,
    #[serde(default)]
    pub biopsy_name: Option<String>,
    #[serde(default)]
    pub alternate_identifier: Option<String>,
    /// Set from the authenticated user, not the request body
    #[serde(skip)]
    pub created_by_id: Option<i32>,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateReportError {
    #[error("Patient '{0}' not found")]
    PatientNotFound(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[tracing::instrument(skip(pool, command), fields(patient_identifier = %command.patient_identifier))]
pub async fn handle(
    pool: &PgPool,
    command: CreateReportCommand,
) -> Result<ReportRecord, CreateReportError> {
    let patient_id = sqlx::query_scalar::<_, i32>(
        "SELECT id FROM patients WHERE patient_identifier = $1 AND deleted_at IS NULL",
    )
    .bind(&command.patient_identifier)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| CreateReportError::PatientNotFound(command.patient_identifier.clone()))?;

    let report = sqlx::query_as::<_, ReportRecord>(
        r#"
        INSERT INTO reports (patient_id, biopsy_name, alternate_identifier, created_by_id)
        VALUES ($1, $2, $3, $4)
        RETURNING id, ident, patient_id,
                  (SELECT patient_identifier FROM patients WHERE id = $1) AS patient_identifier,
                  biopsy_name, alternate_identifier, state, created_by_id,
                  created_at, updated_at
        "#,
    )
    .bind(patient_id)
    .bind(&command.biopsy_name)
    .bind(&command.alternate_identifier)
    .bind(command.created_by_id)
    .fetch_one(pool)
    .await?;

    tracing::info!(report_id = report.id, report_ident = %report.ident, "Report created");

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_creates_report_in_ready_state(pool: PgPool) {
        sqlx::query("INSERT INTO patients (patient_identifier) VALUES ('POG1234')")
            .execute(&pool)
            .await
            .unwrap();

        let report = handle(
            &pool,
            CreateReportCommand {
                patient_identifier: "POG1234".to_string(),
                biopsy_name: Some("biop1".to_string()),
                alternate_identifier: None,
                created_by_id: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(report.state, "ready");
        assert_eq!(report.patient_identifier, "POG1234");
        assert_eq!(report.biopsy_name.as_deref(), Some("biop1"));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_unknown_patient_is_rejected(pool: PgPool) {
        let result = handle(
            &pool,
            CreateReportCommand {
                patient_identifier: "POG9999".to_string(),
                biopsy_name: None,
                alternate_identifier: None,
                created_by_id: None,
            },
        )
        .await;

        assert!(matches!(result, Err(CreateReportError::PatientNotFound(_))));
    }
}
