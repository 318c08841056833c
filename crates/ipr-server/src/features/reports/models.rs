use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

/// A report row as returned by the API
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ReportRecord {
    pub id: i32,
    pub ident: Uuid,
    pub patient_id: i32,
    pub patient_identifier: String,
    pub biopsy_name: Option<String>,
    pub alternate_identifier: Option<String>,
    pub state: String,
    pub created_by_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Resolve a live report's surrogate key by its public ident
pub async fn resolve_report_id(pool: &PgPool, ident: Uuid) -> Result<Option<i32>, sqlx::Error> {
    sqlx::query_scalar::<_, i32>(
        "SELECT id FROM reports WHERE ident = $1 AND deleted_at IS NULL",
    )
    .bind(ident)
    .fetch_optional(pool)
    .await
}
