//! Create a therapeutic target entry at version 0

use serde::Deserialize;
use sqlx::PgPool;

use super::super::models::{TherapeuticTargetRecord, TARGET_COLUMNS};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTherapeuticTargetCommand {
    /// Resolved from the report ident in the URL
    #[serde(skip)]
    pub report_id: i32,
    #[serde(default = "default_target_type")]
    pub target_type: String,
    #[serde(default)]
    pub rank: i32,
    #[serde(default)]
    pub gene: Option<String>,
    #[serde(default)]
    pub gene_graphkb_id: Option<String>,
    #[serde(default)]
    pub variant: Option<String>,
    #[serde(default)]
    pub variant_graphkb_id: Option<String>,
    #[serde(default)]
    pub therapy: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub evidence_level: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

fn default_target_type() -> String {
    "therapeutic".to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum CreateTherapeuticTargetError {
    #[error("Unknown target type '{0}'")]
    UnknownTargetType(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[tracing::instrument(skip(pool, command), fields(report_id = command.report_id))]
pub async fn handle(
    pool: &PgPool,
    command: CreateTherapeuticTargetCommand,
) -> Result<TherapeuticTargetRecord, CreateTherapeuticTargetError> {
    if !matches!(command.target_type.as_str(), "therapeutic" | "chemoresistance") {
        return Err(CreateTherapeuticTargetError::UnknownTargetType(
            command.target_type,
        ));
    }

    let sql = format!(
        r#"
        INSERT INTO therapeutic_targets (
            report_id, target_type, rank, gene, gene_graphkb_id, variant,
            variant_graphkb_id, therapy, context, evidence_level, notes
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING {TARGET_COLUMNS}
        "#
    );

    let record = sqlx::query_as::<_, TherapeuticTargetRecord>(&sql)
        .bind(command.report_id)
        .bind(&command.target_type)
        .bind(command.rank)
        .bind(&command.gene)
        .bind(&command.gene_graphkb_id)
        .bind(&command.variant)
        .bind(&command.variant_graphkb_id)
        .bind(&command.therapy)
        .bind(&command.context)
        .bind(&command.evidence_level)
        .bind(&command.notes)
        .fetch_one(pool)
        .await?;

    tracing::info!(ident = %record.ident, "Therapeutic target created");

    Ok(record)
}
