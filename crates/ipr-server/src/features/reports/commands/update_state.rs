//! Move a report through its lifecycle states

use std::str::FromStr;

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use ipr_common::types::ReportState;

use super::super::models::ReportRecord;

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateReportStateCommand {
    #[serde(skip)]
    pub ident: Uuid,
    pub state: String,
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateReportStateError {
    #[error("Report '{0}' not found")]
    NotFound(Uuid),
    #[error("Unknown report state '{0}'")]
    UnknownState(String),
    #[error("Cannot transition report from '{from}' to '{to}'")]
    InvalidTransition { from: ReportState, to: ReportState },
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[tracing::instrument(skip(pool, command), fields(report_ident = %command.ident, state = %command.state))]
pub async fn handle(
    pool: &PgPool,
    command: UpdateReportStateCommand,
) -> Result<ReportRecord, UpdateReportStateError> {
    let to = ReportState::from_str(&command.state)
        .map_err(|_| UpdateReportStateError::UnknownState(command.state.clone()))?;

    let current = sqlx::query_scalar::<_, String>(
        "SELECT state FROM reports WHERE ident = $1 AND deleted_at IS NULL",
    )
    .bind(command.ident)
    .fetch_optional(pool)
    .await?
    .ok_or(UpdateReportStateError::NotFound(command.ident))?;

    let from = ReportState::from_str(&current)
        .map_err(|_| UpdateReportStateError::UnknownState(current.clone()))?;

    if !from.can_transition_to(to) {
        return Err(UpdateReportStateError::InvalidTransition { from, to });
    }

    let report = sqlx::query_as::<_, ReportRecord>(
        r#"
        UPDATE reports r
        SET state = $2, updated_at = NOW()
        WHERE r.ident = $1 AND r.deleted_at IS NULL
        RETURNING r.id, r.ident, r.patient_id,
                  (SELECT patient_identifier FROM patients WHERE id = r.patient_id)
                      AS patient_identifier,
                  r.biopsy_name, r.alternate_identifier, r.state, r.created_by_id,
                  r.created_at, r.updated_at
        "#,
    )
    .bind(command.ident)
    .bind(to.to_string())
    .fetch_optional(pool)
    .await?
    .ok_or(UpdateReportStateError::NotFound(command.ident))?;

    tracing::info!(report_id = report.id, from = %from, to = %to, "Report state changed");

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seed_report(pool: &PgPool, state: &str) -> Uuid {
        let patient_id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO patients (patient_identifier) VALUES ('POG1234') RETURNING id",
        )
        .fetch_one(pool)
        .await
        .unwrap();

        sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO reports (patient_id, state) VALUES ($1, $2) RETURNING ident",
        )
        .bind(patient_id)
        .bind(state)
        .fetch_one(pool)
        .await
        .unwrap()
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_allowed_transition(pool: PgPool) {
        let ident = seed_report(&pool, "ready").await;

        let report = handle(
            &pool,
            UpdateReportStateCommand {
                ident,
                state: "active".to_string(),
            },
        )
        .await
        .unwrap();

        assert_eq!(report.state, "active");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_disallowed_transition(pool: PgPool) {
        let ident = seed_report(&pool, "ready").await;

        let result = handle(
            &pool,
            UpdateReportStateCommand {
                ident,
                state: "completed".to_string(),
            },
        )
        .await;

        assert!(matches!(
            result,
            Err(UpdateReportStateError::InvalidTransition { .. })
        ));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_unknown_state_is_rejected(pool: PgPool) {
        let ident = seed_report(&pool, "ready").await;

        let result = handle(
            &pool,
            UpdateReportStateCommand {
                ident,
                state: "finished".to_string(),
            },
        )
        .await;

        assert!(matches!(result, Err(UpdateReportStateError::UnknownState(_))));
    }
}
