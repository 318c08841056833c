//! Create a mutation signature entry at version 0

use serde::Deserialize;
use sqlx::PgPool;

use super::super::models::{MutationSignatureRecord, SIGNATURE_COLUMNS};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateMutationSignatureCommand {
    /// Resolved from the report ident in the URL
    #[serde(skip)]
    pub report_id: i32,
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(default)]
    pub pearson: Option<f64>,
    #[serde(default)]
    pub nnls: Option<f64>,
    #[serde(default)]
    pub associations: Option<String>,
    #[serde(default)]
    pub features: Option<String>,
    #[serde(default)]
    pub num_cancer_types: Option<i32>,
    #[serde(default)]
    pub cancer_types: Option<String>,
    #[serde(default)]
    pub reviewed_by_id: Option<i32>,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateMutationSignatureError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[tracing::instrument(skip(pool, command), fields(report_id = command.report_id))]
pub async fn handle(
    pool: &PgPool,
    command: CreateMutationSignatureCommand,
) -> Result<MutationSignatureRecord, CreateMutationSignatureError> {
    let sql = format!(
        r#"
        INSERT INTO mutation_signatures (
            report_id, signature, pearson, nnls, associations,
            features, num_cancer_types, cancer_types, reviewed_by_id
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {SIGNATURE_COLUMNS}
        "#
    );

    let record = sqlx::query_as::<_, MutationSignatureRecord>(&sql)
        .bind(command.report_id)
        .bind(&command.signature)
        .bind(command.pearson)
        .bind(command.nnls)
        .bind(&command.associations)
        .bind(&command.features)
        .bind(command.num_cancer_types)
        .bind(&command.cancer_types)
        .bind(command.reviewed_by_id)
        .fetch_one(pool)
        .await?;

    tracing::info!(ident = %record.ident, "Mutation signature created");

    Ok(record)
}
