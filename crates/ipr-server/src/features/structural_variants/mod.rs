//! Structural variant entries (fusions, rearrangements)

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

pub mod commands;
pub mod queries;
pub mod routes;

pub use routes::structural_variants_routes;

/// A structural variant row as returned by the API
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StructuralVariantRecord {
    pub id: i32,
    pub ident: Uuid,
    pub data_version: i32,
    pub report_id: i32,
    pub gene1: Option<String>,
    pub gene2: Option<String>,
    pub exon1: Option<String>,
    pub exon2: Option<String>,
    pub breakpoint: Option<String>,
    pub event_type: Option<String>,
    pub detected_in: Option<String>,
    pub conventional_name: Option<String>,
    pub mavis_product_id: Option<String>,
    pub reviewed_by_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub(crate) const VARIANT_COLUMNS: &str =
    "id, ident, data_version, report_id, gene1, gene2, exon1, exon2, breakpoint, \
     event_type, detected_in, conventional_name, mavis_product_id, reviewed_by_id, \
     created_at, updated_at";
