//! Create, revise, and remove structural variant entries

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::features::shared::validation::{validate_comment, CommentValidationError};
use crate::versioning::{revise, ReviseError, ReviseRequest, VersionedTable};

use super::{StructuralVariantRecord, VARIANT_COLUMNS};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateStructuralVariantCommand {
    /// Resolved from the report ident in the URL
    #[serde(skip)]
    pub report_id: i32,
    #[serde(default)]
    pub gene1: Option<String>,
    #[serde(default)]
    pub gene2: Option<String>,
    #[serde(default)]
    pub exon1: Option<String>,
    #[serde(default)]
    pub exon2: Option<String>,
    #[serde(default)]
    pub breakpoint: Option<String>,
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub detected_in: Option<String>,
    #[serde(default)]
    pub conventional_name: Option<String>,
    #[serde(default)]
    pub mavis_product_id: Option<String>,
    #[serde(default)]
    pub reviewed_by_id: Option<i32>,
}

#[derive(Debug, thiserror::Error)]
pub enum StructuralVariantCommandError {
    #[error("Structural variant '{0}' not found")]
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
    command: CreateStructuralVariantCommand,
) -> Result<StructuralVariantRecord, StructuralVariantCommandError> {
    let sql = format!(
        r#"
        INSERT INTO structural_variants (
            report_id, gene1, gene2, exon1, exon2, breakpoint, event_type,
            detected_in, conventional_name, mavis_product_id, reviewed_by_id
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING {VARIANT_COLUMNS}
        "#
    );

    let record = sqlx::query_as::<_, StructuralVariantRecord>(&sql)
        .bind(command.report_id)
        .bind(&command.gene1)
        .bind(&command.gene2)
        .bind(&command.exon1)
        .bind(&command.exon2)
        .bind(&command.breakpoint)
        .bind(&command.event_type)
        .bind(&command.detected_in)
        .bind(&command.conventional_name)
        .bind(&command.mavis_product_id)
        .bind(command.reviewed_by_id)
        .fetch_one(pool)
        .await?;

    tracing::info!(ident = %record.ident, "Structural variant created");

    Ok(record)
}

/// Columns a revision may change
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructuralVariantPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gene1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gene2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exon1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exon2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_in: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conventional_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mavis_product_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_by_id: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviseStructuralVariantCommand {
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
    pub patch: StructuralVariantPatch,
}

#[tracing::instrument(skip(pool, command), fields(ident = %command.ident))]
pub async fn revise_entry(
    pool: &PgPool,
    command: ReviseStructuralVariantCommand,
) -> Result<StructuralVariantRecord, StructuralVariantCommandError> {
    if let Some(comment) = command.comment.as_deref() {
        validate_comment(comment)?;
    }

    // The lookup doubles as the report-ownership check; an entry under a
    // different report is not found.
    let live_version = sqlx::query_scalar::<_, i32>(
        "SELECT data_version FROM structural_variants \
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
        ReviseRequest::new(VersionedTable::StructuralVariants, current, patch)
            .with_actor(command.actor)
            .with_comment(command.comment),
    )
    .await?;

    let sql = format!("SELECT {VARIANT_COLUMNS} FROM structural_variants WHERE id = $1");
    let record = sqlx::query_as::<_, StructuralVariantRecord>(&sql)
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
) -> Result<(), StructuralVariantCommandError> {
    let result = sqlx::query(
        "UPDATE structural_variants SET deleted_at = NOW(), updated_at = NOW() \
         WHERE ident = $1 AND report_id = $2 AND deleted_at IS NULL",
    )
    .bind(ident)
    .bind(report_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(StructuralVariantCommandError::NotFound(ident));
    }

    tracing::info!("Structural variant removed");

    Ok(())
}
