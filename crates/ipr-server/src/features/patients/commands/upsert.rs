//! Create or update a patient by external identifier
//!
//! Loaders call this repeatedly for the same patient, so the operation is
//! an upsert keyed on the live `patient_identifier`.

use serde::Deserialize;
use sqlx::PgPool;

use crate::features::shared::validation::{validate_identifier, IdentifierValidationError};

use super::super::models::PatientRecord;

#[derive(Debug, Clone, Deserialize)]
pub struct UpsertPatientCommand {
    pub patient_identifier: String,
    #[serde(default)]
    pub physician: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub age_of_consent: Option<i32>,
}

#[derive(Debug, thiserror::Error)]
pub enum UpsertPatientError {
    #[error("Invalid patient identifier: {0}")]
    Validation(#[from] IdentifierValidationError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[tracing::instrument(skip(pool), fields(patient_identifier = %command.patient_identifier))]
pub async fn handle(
    pool: &PgPool,
    command: UpsertPatientCommand,
) -> Result<PatientRecord, UpsertPatientError> {
    validate_identifier(&command.patient_identifier)?;
    let identifier = command.patient_identifier.trim();

    let patient = sqlx::query_as::<_, PatientRecord>(
        r#"
        INSERT INTO patients (patient_identifier, physician, gender, age_of_consent)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (patient_identifier) WHERE deleted_at IS NULL
        DO UPDATE SET
            physician = COALESCE(EXCLUDED.physician, patients.physician),
            gender = COALESCE(EXCLUDED.gender, patients.gender),
            age_of_consent = COALESCE(EXCLUDED.age_of_consent, patients.age_of_consent),
            updated_at = NOW()
        RETURNING id, ident, patient_identifier, physician, gender, age_of_consent,
                  created_at, updated_at
        "#,
    )
    .bind(identifier)
    .bind(&command.physician)
    .bind(&command.gender)
    .bind(command.age_of_consent)
    .fetch_one(pool)
    .await?;

    tracing::info!(patient_id = patient.id, "Patient upserted");

    Ok(patient)
}
