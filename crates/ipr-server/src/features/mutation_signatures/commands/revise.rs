//! Revise a mutation signature entry through the versioning protocol

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::features::shared::validation::{validate_comment, CommentValidationError};
use crate::versioning::{revise, ReviseError, ReviseRequest, VersionedTable};

use super::super::models::{MutationSignatureRecord, SIGNATURE_COLUMNS};

/// Columns a revision may change
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MutationSignaturePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pearson: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nnls: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub associations: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_cancer_types: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancer_types: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_by_id: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviseMutationSignatureCommand {
    /// From the URL
    #[serde(skip)]
    pub ident: Uuid,
    /// Resolved from the report ident in the URL
    #[serde(skip)]
    pub report_id: i32,
    /// From the authenticated user
    #[serde(skip)]
    pub actor: Option<i32>,
    /// The version the caller's edit was based on; defaults to the current
    /// live version
    #[serde(default)]
    pub data_version: Option<i32>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(flatten)]
    pub patch: MutationSignaturePatch,
}

#[derive(Debug, thiserror::Error)]
pub enum ReviseMutationSignatureError {
    #[error(transparent)]
    Revise(#[from] ReviseError),
    #[error("Invalid comment: {0}")]
    Comment(#[from] CommentValidationError),
    #[error("Could not serialize patch: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[tracing::instrument(skip(pool, command), fields(ident = %command.ident))]
pub async fn handle(
    pool: &PgPool,
    command: ReviseMutationSignatureCommand,
) -> Result<MutationSignatureRecord, ReviseMutationSignatureError> {
    if let Some(comment) = command.comment.as_deref() {
        validate_comment(comment)?;
    }

    // The lookup doubles as the report-ownership check; an entry under a
    // different report is not found.
    let live_version = current_live_version(pool, command.report_id, command.ident)
        .await?
        .ok_or(ReviseError::NotFound(command.ident))?;
    let data_version = command.data_version.unwrap_or(live_version);

    let mut current = Map::new();
    current.insert("ident".into(), Value::String(command.ident.to_string()));
    current.insert("data_version".into(), Value::from(data_version));

    let patch = match serde_json::to_value(&command.patch)? {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    let revision = revise(
        pool,
        ReviseRequest::new(VersionedTable::MutationSignatures, current, patch)
            .with_actor(command.actor)
            .with_comment(command.comment),
    )
    .await?;

    let sql = format!("SELECT {SIGNATURE_COLUMNS} FROM mutation_signatures WHERE id = $1");
    let record = sqlx::query_as::<_, MutationSignatureRecord>(&sql)
        .bind(revision.created.id)
        .fetch_one(pool)
        .await?;

    Ok(record)
}

async fn current_live_version(
    pool: &PgPool,
    report_id: i32,
    ident: Uuid,
) -> Result<Option<i32>, sqlx::Error> {
    sqlx::query_scalar::<_, i32>(
        "SELECT data_version FROM mutation_signatures \
         WHERE ident = $1 AND report_id = $2 AND deleted_at IS NULL",
    )
    .bind(ident)
    .bind(report_id)
    .fetch_optional(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seed(pool: &PgPool) -> (i32, Uuid) {
        let patient_id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO patients (patient_identifier) VALUES ('POG1234') RETURNING id",
        )
        .fetch_one(pool)
        .await
        .unwrap();
        let report_id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO reports (patient_id) VALUES ($1) RETURNING id",
        )
        .bind(patient_id)
        .fetch_one(pool)
        .await
        .unwrap();
        let ident = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO mutation_signatures (report_id, signature) \
             VALUES ($1, 'SBS1') RETURNING ident",
        )
        .bind(report_id)
        .fetch_one(pool)
        .await
        .unwrap();
        (report_id, ident)
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_revision_carries_report_and_bumps_version(pool: PgPool) {
        let (report_id, ident) = seed(&pool).await;

        let record = handle(
            &pool,
            ReviseMutationSignatureCommand {
                ident,
                report_id,
                actor: None,
                data_version: None,
                comment: Some("corrected exposure".to_string()),
                patch: MutationSignaturePatch {
                    signature: Some("SBS5".to_string()),
                    ..Default::default()
                },
            },
        )
        .await
        .unwrap();

        assert_eq!(record.ident, ident);
        assert_eq!(record.data_version, 1);
        assert_eq!(record.report_id, report_id);
        assert_eq!(record.signature.as_deref(), Some("SBS5"));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_revising_missing_entry_fails(pool: PgPool) {
        let result = handle(
            &pool,
            ReviseMutationSignatureCommand {
                ident: Uuid::new_v4(),
                report_id: 1,
                actor: None,
                data_version: None,
                comment: None,
                patch: MutationSignaturePatch::default(),
            },
        )
        .await;

        assert!(matches!(
            result,
            Err(ReviseMutationSignatureError::Revise(ReviseError::NotFound(_)))
        ));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_revising_under_other_report_fails(pool: PgPool) {
        let (report_id, ident) = seed(&pool).await;
        let other_report = sqlx::query_scalar::<_, i32>(
            "INSERT INTO reports (patient_id) SELECT patient_id FROM reports \
             WHERE id = $1 RETURNING id",
        )
        .bind(report_id)
        .fetch_one(&pool)
        .await
        .unwrap();

        let result = handle(
            &pool,
            ReviseMutationSignatureCommand {
                ident,
                report_id: other_report,
                actor: None,
                data_version: Some(0),
                comment: None,
                patch: MutationSignaturePatch {
                    signature: Some("SBS5".to_string()),
                    ..Default::default()
                },
            },
        )
        .await;

        assert!(matches!(
            result,
            Err(ReviseMutationSignatureError::Revise(ReviseError::NotFound(_)))
        ));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_oversized_comment_rejected(pool: PgPool) {
        let (report_id, ident) = seed(&pool).await;

        let result = handle(
            &pool,
            ReviseMutationSignatureCommand {
                ident,
                report_id,
                actor: None,
                data_version: None,
                comment: Some("x".repeat(
                    crate::features::shared::validation::MAX_COMMENT_LENGTH + 1,
                )),
                patch: MutationSignaturePatch::default(),
            },
        )
        .await;

        assert!(matches!(result, Err(ReviseMutationSignatureError::Comment(_))));
    }
}
