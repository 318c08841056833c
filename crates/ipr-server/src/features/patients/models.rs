use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A patient row as returned by the API
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PatientRecord {
    pub id: i32,
    pub ident: Uuid,
    pub patient_identifier: String,
    pub physician: Option<String>,
    pub gender: Option<String>,
    pub age_of_consent: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
