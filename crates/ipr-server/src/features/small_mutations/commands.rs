//! Create, revise, and remove small mutation entries

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::features::shared::validation::{validate_comment, CommentValidationError};
use crate::versioning::{revise, ReviseError, ReviseRequest, VersionedTable};

use super::{SmallMutationRecord, MUTATION_COLUMNS};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSmallMutationCommand {
    /// Resolved from the report ident in the URL
    #[serde(skip)]
    pub report_id: i32,
    #[serde(default)]
    pub gene: Option<String>,
    #[serde(default)]
    pub transcript: Option<String>,
    #[serde(default)]
    pub protein_change: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub zygosity: Option<String>,
    #[serde(default)]
    pub tumour_reads: Option<String>,
    #[serde(default)]
    pub rna_reads: Option<String>,
    #[serde(default)]
    pub detected_in: Option<String>,
    #[serde(default)]
    pub reviewed_by_id: Option<i32>,
    #[serde(default)]
    pub comments: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum SmallMutationCommandError {
    #[error("Small mutation '{0}' not found")]
    NotFound(Uuid),
    #[error(transparent)]
    Revise(#[from] ReviseError),
    #[error("Invalid comment: {0}")]
    Comment(#[from] CommentValidationError),
    #[error("Could not serialize patch: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[tracing::instrument(skip(pool, command), fields(report_id = command.report_id))]
pub async fn create(
    pool: &PgPool,
    command: CreateSmallMutationCommand,
) -> Result<SmallMutationRecord, SmallMutationCommandError> {
    let sql = format!(
        r#"
        INSERT INTO small_mutations (
            report_id, gene, transcript, protein_change, location, zygosity,
            tumour_reads, rna_reads, detected_in, reviewed_by_id, comments
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING {MUTATION_COLUMNS}
        "#
    );

    let record = sqlx::query_as::<_, SmallMutationRecord>(&sql)
        .bind(command.report_id)
        .bind(&command.gene)
        .bind(&command.transcript)
        .bind(&command.protein_change)
        .bind(&command.location)
        .bind(&command.zygosity)
        .bind(&command.tumour_reads)
        .bind(&command.rna_reads)
        .bind(&command.detected_in)
        .bind(command.reviewed_by_id)
        .bind(&command.comments)
        .fetch_one(pool)
        .await?;

    tracing::info!(ident = %record.ident, "Small mutation created");

    Ok(record)
}

/// Columns a revision may change
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SmallMutationPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gene: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein_change: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zygosity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tumour_reads: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rna_reads: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_in: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_by_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviseSmallMutationCommand {
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
    pub patch: SmallMutationPatch,
}

#[tracing::instrument(skip(pool, command), fields(ident = %command.ident))]
pub async fn revise_entry(
    pool: &PgPool,
    command: ReviseSmallMutationCommand,
) -> Result<SmallMutationRecord, SmallMutationCommandError> {
    if let Some(comment) = command.comment.as_deref() {
        validate_comment(comment)?;
    }

    // The lookup doubles as the report-ownership check; an entry under a
    // different report is not found.
    let live_version = sqlx::query_scalar::<_, i32>(
        "SELECT data_version FROM small_mutations \
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
        ReviseRequest::new(VersionedTable::SmallMutations, current, patch)
            .with_actor(command.actor)
            .with_comment(command.comment),
    )
    .await?;

    let sql = format!("SELECT {MUTATION_COLUMNS} FROM small_mutations WHERE id = $1");
    let record = sqlx::query_as::<_, SmallMutationRecord>(&sql)
        .bind(revision.created.id)
        .fetch_one(pool)
        .await?;

    Ok(record)
}

/// Soft-delete without a history row
#[tracing::instrument(skip(pool), fields(ident = %ident))]
pub async fn remove(
    pool: &PgPool,
    report_id: i32,
    ident: Uuid,
) -> Result<(), SmallMutationCommandError> {
    let result = sqlx::query(
        "UPDATE small_mutations SET deleted_at = NOW(), updated_at = NOW() \
         WHERE ident = $1 AND report_id = $2 AND deleted_at IS NULL",
    )
    .bind(ident)
    .bind(report_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(SmallMutationCommandError::NotFound(ident));
    }

    tracing::info!("Small mutation removed");

    Ok(())
}
