//! Revise a therapeutic target entry through the versioning protocol

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::features::shared::validation::{validate_comment, CommentValidationError};
use crate::versioning::{revise, ReviseError, ReviseRequest, VersionedTable};

use super::super::models::{TherapeuticTargetRecord, TARGET_COLUMNS};

/// Columns a revision may change
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TherapeuticTargetPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gene: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gene_graphkb_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_graphkb_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub therapy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviseTherapeuticTargetCommand {
    #[serde(skip)]
    pub ident: Uuid,
    /// Resolved from the report ident in the URL
    #[serde(skip)]
    pub report_id: i32,
    #[serde(skip)]
    pub actor: Option<i32>,
    #[serde(default)]
    pub data_version: Option<i32>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(flatten)]
    pub patch: TherapeuticTargetPatch,
}

#[derive(Debug, thiserror::Error)]
pub enum ReviseTherapeuticTargetError {
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
    command: ReviseTherapeuticTargetCommand,
) -> Result<TherapeuticTargetRecord, ReviseTherapeuticTargetError> {
    if let Some(comment) = command.comment.as_deref() {
        validate_comment(comment)?;
    }

    // The lookup doubles as the report-ownership check; an entry under a
    // different report is not found.
    let live_version = sqlx::query_scalar::<_, i32>(
        "SELECT data_version FROM therapeutic_targets \
         WHERE ident = $1 AND report_id = $2 AND deleted_at IS NULL",
    )
    .bind(command.ident)
    .bind(command.report_id)
    .fetch_optional(pool)
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
        ReviseRequest::new(VersionedTable::TherapeuticTargets, current, patch)
            .with_actor(command.actor)
            .with_comment(command.comment),
    )
    .await?;

    let sql = format!("SELECT {TARGET_COLUMNS} FROM therapeutic_targets WHERE id = $1");
    let record = sqlx::query_as::<_, TherapeuticTargetRecord>(&sql)
        .bind(revision.created.id)
        .fetch_one(pool)
        .await?;

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_rank_change_preserves_other_fields_defaults(pool: PgPool) {
        let patient_id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO patients (patient_identifier) VALUES ('POG1234') RETURNING id",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        let report_id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO reports (patient_id) VALUES ($1) RETURNING id",
        )
        .bind(patient_id)
        .fetch_one(&pool)
        .await
        .unwrap();
        let ident = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO therapeutic_targets (report_id, gene, rank) \
             VALUES ($1, 'EGFR', 1) RETURNING ident",
        )
        .bind(report_id)
        .fetch_one(&pool)
        .await
        .unwrap();

        let record = handle(
            &pool,
            ReviseTherapeuticTargetCommand {
                ident,
                report_id,
                actor: None,
                data_version: None,
                comment: None,
                patch: TherapeuticTargetPatch {
                    rank: Some(2),
                    gene: Some("EGFR".to_string()),
                    ..Default::default()
                },
            },
        )
        .await
        .unwrap();

        assert_eq!(record.data_version, 1);
        assert_eq!(record.rank, 2);
        assert_eq!(record.gene.as_deref(), Some("EGFR"));
        assert_eq!(record.report_id, report_id);
    }
}
