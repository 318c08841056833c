//! Small mutation entries (SNVs and indels)

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

pub mod commands;
pub mod queries;
pub mod routes;

pub use routes::small_mutations_routes;

/// A small mutation row as returned by the API
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SmallMutationRecord {
    pub id: i32,
    pub ident: Uuid,
    pub data_version: i32,
    pub report_id: i32,
    pub gene: Option<String>,
    pub transcript: Option<String>,
    pub protein_change: Option<String>,
    pub location: Option<String>,
    pub zygosity: Option<String>,
    pub tumour_reads: Option<String>,
    pub rna_reads: Option<String>,
    pub detected_in: Option<String>,
    pub reviewed_by_id: Option<i32>,
    pub comments: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub(crate) const MUTATION_COLUMNS: &str =
    "id, ident, data_version, report_id, gene, transcript, protein_change, location, \
     zygosity, tumour_reads, rna_reads, detected_in, reviewed_by_id, comments, \
     created_at, updated_at";
