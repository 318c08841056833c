//! History data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// History Query Constants
// ============================================================================

/// Default number of history entries returned per query
pub const DEFAULT_HISTORY_QUERY_LIMIT: i64 = 100;

/// Maximum number of history entries returned in a single query
pub const MAX_HISTORY_QUERY_LIMIT: i64 = 1000;

/// A recorded version transition, as stored in `report_history`
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct HistoryRecord {
    /// Unique identifier for the history entry
    pub id: Uuid,
    /// SQL table of the revised entry
    pub table_name: String,
    /// Model name of the revised entry
    pub model_name: String,
    /// Stable ident of the revised entry
    pub ident: Uuid,
    /// `data_version` the revision was based on (None for initial loads)
    pub previous_version: Option<i32>,
    /// `data_version` of the newly created row
    pub new_version: i32,
    /// Owning report
    pub report_id: Option<i32>,
    /// Acting user
    pub user_id: Option<i32>,
    /// Optional reviewer comment
    pub comment: Option<String>,
    /// When the transition happened
    pub created_at: DateTime<Utc>,
}

/// Input for recording a version transition
#[derive(Debug, Clone)]
pub struct NewHistoryRecord<'a> {
    pub table_name: &'a str,
    pub model_name: &'a str,
    pub ident: Uuid,
    pub previous_version: Option<i32>,
    pub new_version: i32,
    pub report_id: Option<i32>,
    pub user_id: Option<i32>,
    pub comment: Option<&'a str>,
}

/// Query parameters for the history trail
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryQuery {
    /// Filter by entry ident
    pub ident: Option<Uuid>,
    /// Filter by table name
    pub table_name: Option<String>,
    /// Filter by acting user
    pub user_id: Option<i32>,
    /// Maximum number of results
    pub limit: Option<i64>,
    /// Offset for pagination
    pub offset: Option<i64>,
}

impl HistoryQuery {
    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_HISTORY_QUERY_LIMIT)
            .clamp(1, MAX_HISTORY_QUERY_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}
