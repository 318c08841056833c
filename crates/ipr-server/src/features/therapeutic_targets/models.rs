use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A therapeutic target row as returned by the API
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TherapeuticTargetRecord {
    pub id: i32,
    pub ident: Uuid,
    pub data_version: i32,
    pub report_id: i32,
    pub target_type: String,
    pub rank: i32,
    pub gene: Option<String>,
    pub gene_graphkb_id: Option<String>,
    pub variant: Option<String>,
    pub variant_graphkb_id: Option<String>,
    pub therapy: Option<String>,
    pub context: Option<String>,
    pub evidence_level: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub(super) const TARGET_COLUMNS: &str =
    "id, ident, data_version, report_id, target_type, rank, gene, gene_graphkb_id, \
     variant, variant_graphkb_id, therapy, context, evidence_level, notes, \
     created_at, updated_at";
