use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A mutation signature row as returned by the API
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MutationSignatureRecord {
    pub id: i32,
    pub ident: Uuid,
    pub data_version: i32,
    pub report_id: i32,
    pub signature: Option<String>,
    pub pearson: Option<f64>,
    pub nnls: Option<f64>,
    pub associations: Option<String>,
    pub features: Option<String>,
    pub num_cancer_types: Option<i32>,
    pub cancer_types: Option<String>,
    pub reviewed_by_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub(super) const SIGNATURE_COLUMNS: &str =
    "id, ident, data_version, report_id, signature, pearson, nnls, associations, \
     features, num_cancer_types, cancer_types, reviewed_by_id, created_at, updated_at";
