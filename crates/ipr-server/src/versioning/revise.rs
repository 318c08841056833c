//! The revise operation: create-new-version-and-soft-delete-old-version
//!
//! Callers hand in their view of the entry being revised plus a patch of new
//! column values. The protocol re-fetches the authoritative live row by
//! stable `ident` (the caller's snapshot may be stale), carries identifying
//! fields forward onto the patch, inserts the patch as a new row with the
//! next `data_version`, soft-deletes the row the revision was based on, and
//! records the transition in `report_history` — all in one transaction.

use serde_json::{Map, Value};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use super::tables::VersionedTable;
use crate::history::{self, NewHistoryRecord};

/// Fields copied from the authoritative row onto the patch when the caller
/// does not override them
pub const DEFAULT_CARRY_FORWARD: &[&str] = &["ident", "report_id"];

/// Default column used to locate the row to soft-delete
pub const DEFAULT_DESTROY_KEY: &str = "ident";

/// A revise request
#[derive(Debug, Clone)]
pub struct ReviseRequest {
    /// Table being revised
    pub table: VersionedTable,
    /// The caller's view of the entry; must contain `ident` and
    /// `data_version`, plus the destroy-key field when it is not `ident`
    pub current: Map<String, Value>,
    /// New column values
    pub patch: Map<String, Value>,
    /// Column matched (together with `data_version`) to pick the single row
    /// to soft-delete. `None` makes the revision a pure append: nothing is
    /// retired and no history is written.
    pub destroy_key: Option<String>,
    /// Identifying/FK fields copied from the authoritative row onto the patch
    pub carry_forward: Vec<String>,
    /// Acting user
    pub actor: Option<i32>,
    /// Optional reviewer comment recorded in history
    pub comment: Option<String>,
}

impl ReviseRequest {
    /// Build a request with the default destroy key and carry-forward set
    pub fn new(
        table: VersionedTable,
        current: Map<String, Value>,
        patch: Map<String, Value>,
    ) -> Self {
        Self {
            table,
            current,
            patch,
            destroy_key: Some(DEFAULT_DESTROY_KEY.to_string()),
            carry_forward: DEFAULT_CARRY_FORWARD.iter().map(|s| s.to_string()).collect(),
            actor: None,
            comment: None,
        }
    }

    /// Append a new version without retiring the previous one
    pub fn append_only(mut self) -> Self {
        self.destroy_key = None;
        self
    }

    pub fn with_actor(mut self, actor: Option<i32>) -> Self {
        self.actor = actor;
        self
    }

    pub fn with_comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment;
        self
    }

    pub fn with_carry_forward(mut self, fields: &[&str]) -> Self {
        self.carry_forward = fields.iter().map(|s| s.to_string()).collect();
        self
    }
}

/// The row created by a revision
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct CreatedRow {
    pub id: i32,
    pub ident: Uuid,
    pub data_version: i32,
}

/// Result of a successful revision
#[derive(Debug, Clone)]
pub struct Revision {
    /// The newly inserted row
    pub created: CreatedRow,
    /// Number of rows soft-deleted (0 for append-only, otherwise at most 1)
    pub destroyed: u64,
    /// History entry id, when one was written
    pub history_id: Option<Uuid>,
}

/// Failures of the revise protocol
#[derive(Debug, Error)]
pub enum ReviseError {
    #[error("No live entry found for ident '{0}'")]
    NotFound(Uuid),
    #[error("Required field '{0}' is missing from the current entry")]
    MissingRequiredField(String),
    #[error("Could not determine the current version for ident '{0}'")]
    VersionLookupFailed(Uuid),
    #[error("Column '{0}' is not writable on this table")]
    UnknownColumn(String),
    #[error("Version {1} already exists for ident '{0}'")]
    VersionConflict(Uuid, i32),
    #[error("Invalid entry snapshot: {0}")]
    InvalidSnapshot(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Revise a versioned entry.
///
/// See the module docs for the full protocol. On success exactly one row has
/// been inserted, at most one row soft-deleted, and at most one history row
/// written; on failure nothing has changed.
#[tracing::instrument(skip(pool, request), fields(table = %request.table))]
pub async fn revise(pool: &PgPool, request: ReviseRequest) -> Result<Revision, ReviseError> {
    let table = request.table.table();

    let ident = snapshot_ident(&request.current)?;
    let current_version = snapshot_version(&request.current)?;

    let mut tx = pool.begin().await?;

    // Step 1: re-fetch the authoritative live row by stable ident.
    let sql = format!(
        "SELECT row_to_json(t)::jsonb FROM {table} t WHERE ident = $1 AND deleted_at IS NULL"
    );
    let authoritative: Option<Value> = sqlx::query_scalar(&sql)
        .bind(ident)
        .fetch_optional(&mut *tx)
        .await?;
    let authoritative = match authoritative {
        Some(Value::Object(map)) => map,
        Some(_) => return Err(ReviseError::InvalidSnapshot("row is not an object".into())),
        None => return Err(ReviseError::NotFound(ident)),
    };

    // Step 2: carry identifying fields from the authoritative row onto the
    // patch, overriding whatever the caller supplied for them.
    let mut patch = request.patch.clone();
    patch.remove("id");
    for field in &request.carry_forward {
        let value = authoritative
            .get(field.as_str())
            .ok_or_else(|| ReviseError::MissingRequiredField(field.clone()))?;
        patch.insert(field.clone(), value.clone());
    }

    for column in patch.keys() {
        if !request.table.is_writable(column) {
            return Err(ReviseError::UnknownColumn(column.clone()));
        }
    }

    // Step 3: next version spans ALL rows for the ident, soft-deleted ones
    // included, so retired versions are never reused.
    let sql = format!("SELECT MAX(data_version) FROM {table} WHERE ident = $1");
    let max_version: Option<i32> = sqlx::query_scalar(&sql)
        .bind(ident)
        .fetch_one(&mut *tx)
        .await?;
    let next_version = max_version.ok_or(ReviseError::VersionLookupFailed(ident))? + 1;

    // Step 4: insert the patch as a new row. jsonb_populate_record converts
    // the JSON values to the table's column types; only patch columns are
    // named, so unlisted columns keep their defaults.
    let columns: Vec<&str> = patch.keys().map(String::as_str).collect();
    let column_list = columns.join(", ");
    let select_list = columns
        .iter()
        .map(|c| format!("r.{c}"))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "INSERT INTO {table} ({column_list}, data_version) \
         SELECT {select_list}, $2 FROM jsonb_populate_record(NULL::{table}, $1) r \
         RETURNING id, ident, data_version"
    );
    let created = sqlx::query_as::<_, CreatedRow>(&sql)
        .bind(Value::Object(patch.clone()))
        .bind(next_version)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                ReviseError::VersionConflict(ident, next_version)
            },
            _ => ReviseError::Database(e),
        })?;

    // Step 5: pure append when no destroy key was given.
    let Some(destroy_key) = request.destroy_key.as_deref() else {
        tx.commit().await?;
        tracing::info!(
            ident = %ident,
            new_version = created.data_version,
            "Appended new version without retiring predecessor"
        );
        return Ok(Revision {
            created,
            destroyed: 0,
            history_id: None,
        });
    };

    if !request.table.is_writable(destroy_key) {
        return Err(ReviseError::UnknownColumn(destroy_key.to_string()));
    }
    let destroy_value = request
        .current
        .get(destroy_key)
        .ok_or_else(|| ReviseError::MissingRequiredField(destroy_key.to_string()))?;
    let destroy_value = match destroy_value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    // Step 6: soft-delete exactly one row matching the caller's version and
    // destroy-key value. The inner LIMIT 1 guards against keys that are not
    // unique per version.
    let sql = format!(
        "UPDATE {table} SET deleted_at = NOW(), updated_at = NOW() \
         WHERE id = ( \
             SELECT id FROM {table} \
             WHERE data_version = $1 AND {destroy_key}::text = $2 AND deleted_at IS NULL \
             ORDER BY id LIMIT 1 \
         )"
    );
    let destroyed = sqlx::query(&sql)
        .bind(current_version)
        .bind(&destroy_value)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    // Step 7: record the transition. The owning report comes from the patch,
    // accepting the legacy field name used by older pipeline output.
    let report_id = patch
        .get("report_id")
        .or_else(|| patch.get("pog_report_id"))
        .and_then(Value::as_i64)
        .map(|v| v as i32);

    let history = history::queries::insert(
        &mut *tx,
        NewHistoryRecord {
            table_name: table,
            model_name: request.table.model(),
            ident,
            previous_version: Some(current_version),
            new_version: created.data_version,
            report_id,
            user_id: request.actor,
            comment: request.comment.as_deref(),
        },
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        ident = %ident,
        previous_version = current_version,
        new_version = created.data_version,
        destroyed,
        "Revised versioned entry"
    );

    Ok(Revision {
        created,
        destroyed,
        history_id: Some(history.id),
    })
}

fn snapshot_ident(current: &Map<String, Value>) -> Result<Uuid, ReviseError> {
    current
        .get("ident")
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| ReviseError::InvalidSnapshot("missing or invalid 'ident'".into()))
}

fn snapshot_version(current: &Map<String, Value>) -> Result<i32, ReviseError> {
    current
        .get("data_version")
        .and_then(Value::as_i64)
        .map(|v| v as i32)
        .ok_or_else(|| ReviseError::InvalidSnapshot("missing or invalid 'data_version'".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn to_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    async fn seed_report(pool: &PgPool) -> Result<i32, sqlx::Error> {
        let patient_id: i32 = sqlx::query_scalar(
            "INSERT INTO patients (patient_identifier) VALUES ('PAT001') RETURNING id",
        )
        .fetch_one(pool)
        .await?;

        sqlx::query_scalar(
            "INSERT INTO reports (patient_id, biopsy_name) VALUES ($1, 'biop1') RETURNING id",
        )
        .bind(patient_id)
        .fetch_one(pool)
        .await
    }

    async fn seed_signature(pool: &PgPool, report_id: i32) -> Result<Uuid, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO mutation_signatures (report_id, signature, pearson) \
             VALUES ($1, 'SBS1', 0.85) RETURNING ident",
        )
        .bind(report_id)
        .fetch_one(pool)
        .await
    }

    async fn snapshot(pool: &PgPool, ident: Uuid) -> Result<Map<String, Value>, sqlx::Error> {
        let value: Value = sqlx::query_scalar(
            "SELECT row_to_json(t)::jsonb FROM mutation_signatures t \
             WHERE ident = $1 AND deleted_at IS NULL",
        )
        .bind(ident)
        .fetch_one(pool)
        .await?;
        Ok(to_map(value))
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_revise_increments_version_and_retires_predecessor(
        pool: PgPool,
    ) -> Result<(), sqlx::Error> {
        let report_id = seed_report(&pool).await?;
        let ident = seed_signature(&pool, report_id).await?;

        let current = snapshot(&pool, ident).await.unwrap();
        let patch = to_map(json!({"signature": "SBS5", "pearson": 0.91}));

        let revision = revise(&pool, ReviseRequest::new(
            VersionedTable::MutationSignatures,
            current,
            patch,
        ))
        .await
        .unwrap();

        assert_eq!(revision.created.ident, ident);
        assert_eq!(revision.created.data_version, 1);
        assert_eq!(revision.destroyed, 1);
        assert!(revision.history_id.is_some());

        // The version-0 row is retired; exactly one live row remains.
        let live: Vec<(i32, String)> = sqlx::query_as(
            "SELECT data_version, signature FROM mutation_signatures \
             WHERE ident = $1 AND deleted_at IS NULL",
        )
        .bind(ident)
        .fetch_all(&pool)
        .await?;
        assert_eq!(live.len(), 1);
        assert_eq!(live[0], (1, "SBS5".to_string()));

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM mutation_signatures WHERE ident = $1")
                .bind(ident)
                .fetch_one(&pool)
                .await?;
        assert_eq!(total, 2);

        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_successive_revisions_are_strictly_increasing(
        pool: PgPool,
    ) -> Result<(), sqlx::Error> {
        let report_id = seed_report(&pool).await?;
        let ident = seed_signature(&pool, report_id).await?;

        for expected_version in 1..=3 {
            let current = snapshot(&pool, ident).await?;
            let patch = to_map(json!({"nnls": expected_version as f64 / 10.0}));
            let revision = revise(&pool, ReviseRequest::new(
                VersionedTable::MutationSignatures,
                current,
                patch,
            ))
            .await
            .unwrap();
            assert_eq!(revision.created.data_version, expected_version);
        }

        // Every predecessor is soft-deleted; versions have no duplicates.
        let versions: Vec<i32> = sqlx::query_scalar(
            "SELECT data_version FROM mutation_signatures WHERE ident = $1 ORDER BY data_version",
        )
        .bind(ident)
        .fetch_all(&pool)
        .await?;
        assert_eq!(versions, vec![0, 1, 2, 3]);

        let live_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM mutation_signatures WHERE ident = $1 AND deleted_at IS NULL",
        )
        .bind(ident)
        .fetch_one(&pool)
        .await?;
        assert_eq!(live_count, 1);

        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_append_only_never_soft_deletes(pool: PgPool) -> Result<(), sqlx::Error> {
        let report_id = seed_report(&pool).await?;
        let ident = seed_signature(&pool, report_id).await?;

        let current = snapshot(&pool, ident).await?;
        let patch = to_map(json!({"signature": "SBS13"}));

        let revision = revise(
            &pool,
            ReviseRequest::new(VersionedTable::MutationSignatures, current, patch)
                .append_only(),
        )
        .await
        .unwrap();

        assert_eq!(revision.created.data_version, 1);
        assert_eq!(revision.destroyed, 0);
        assert!(revision.history_id.is_none());

        // Both versions remain live; nothing was retired.
        let live: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM mutation_signatures \
             WHERE ident = $1 AND deleted_at IS NULL",
        )
        .bind(ident)
        .fetch_one(&pool)
        .await?;
        assert_eq!(live, 2);

        let history: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM report_history WHERE ident = $1")
                .bind(ident)
                .fetch_one(&pool)
                .await?;
        assert_eq!(history, 0);

        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_missing_carry_forward_field_fails(pool: PgPool) -> Result<(), sqlx::Error> {
        let report_id = seed_report(&pool).await?;
        let ident = seed_signature(&pool, report_id).await?;

        let current = snapshot(&pool, ident).await?;
        let patch = to_map(json!({"signature": "SBS2"}));

        let request = ReviseRequest::new(VersionedTable::MutationSignatures, current, patch)
            .with_carry_forward(&["ident", "report_id", "no_such_field"]);

        let err = revise(&pool, request).await.unwrap_err();
        assert!(matches!(
            err,
            ReviseError::MissingRequiredField(ref field) if field == "no_such_field"
        ));

        // Nothing was inserted.
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM mutation_signatures WHERE ident = $1")
                .bind(ident)
                .fetch_one(&pool)
                .await?;
        assert_eq!(total, 1);

        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_competing_revision_surfaces_version_conflict(
        pool: PgPool,
    ) -> Result<(), sqlx::Error> {
        let report_id = seed_report(&pool).await?;
        let ident = seed_signature(&pool, report_id).await?;
        let current = snapshot(&pool, ident).await?;

        // A competing writer has claimed version 1 but not yet committed, so
        // the revision below computes the same next version and its insert
        // waits on the unique index until the competitor commits.
        let mut competitor = pool.begin().await?;
        sqlx::query(
            "INSERT INTO mutation_signatures (ident, report_id, data_version, signature) \
             VALUES ($1, $2, 1, 'SBS5')",
        )
        .bind(ident)
        .bind(report_id)
        .execute(&mut *competitor)
        .await?;

        let racing_pool = pool.clone();
        let patch = to_map(json!({"signature": "SBS13"}));
        let racer = tokio::spawn(async move {
            revise(
                &racing_pool,
                ReviseRequest::new(VersionedTable::MutationSignatures, current, patch),
            )
            .await
        });

        tokio::time::sleep(std::time::Duration::from_millis(500)).await;
        competitor.commit().await?;

        let result = racer.await.expect("revision task panicked");
        assert!(matches!(
            result,
            Err(ReviseError::VersionConflict(conflicted, 1)) if conflicted == ident
        ));

        // Only the competitor's row landed; the losing revision rolled back
        // without retiring or inserting anything.
        let versions: Vec<i32> = sqlx::query_scalar(
            "SELECT data_version FROM mutation_signatures WHERE ident = $1 ORDER BY data_version",
        )
        .bind(ident)
        .fetch_all(&pool)
        .await?;
        assert_eq!(versions, vec![0, 1]);

        let history: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM report_history WHERE ident = $1")
                .bind(ident)
                .fetch_one(&pool)
                .await?;
        assert_eq!(history, 0);

        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_unknown_patch_column_rejected(pool: PgPool) -> Result<(), sqlx::Error> {
        let report_id = seed_report(&pool).await?;
        let ident = seed_signature(&pool, report_id).await?;

        let current = snapshot(&pool, ident).await?;
        let patch = to_map(json!({"deleted_at": "2020-01-01T00:00:00Z"}));

        let err = revise(&pool, ReviseRequest::new(
            VersionedTable::MutationSignatures,
            current,
            patch,
        ))
        .await
        .unwrap_err();
        assert!(matches!(err, ReviseError::UnknownColumn(_)));

        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_revising_unknown_ident_fails(pool: PgPool) -> Result<(), sqlx::Error> {
        let missing = Uuid::new_v4();
        let current = to_map(json!({"ident": missing.to_string(), "data_version": 0}));
        let patch = to_map(json!({"signature": "SBS1"}));

        let err = revise(&pool, ReviseRequest::new(
            VersionedTable::MutationSignatures,
            current,
            patch,
        ))
        .await
        .unwrap_err();
        assert!(matches!(err, ReviseError::NotFound(id) if id == missing));

        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_history_records_transition(pool: PgPool) -> Result<(), sqlx::Error> {
        let report_id = seed_report(&pool).await?;
        let ident = seed_signature(&pool, report_id).await?;

        // Walk the entry up to version 2, then revise with a comment.
        for _ in 0..2 {
            let current = snapshot(&pool, ident).await?;
            revise(&pool, ReviseRequest::new(
                VersionedTable::MutationSignatures,
                current,
                Map::new(),
            ))
            .await
            .unwrap();
        }

        let current = snapshot(&pool, ident).await?;
        assert_eq!(current["data_version"], json!(2));

        let patch = to_map(json!({"signature": "x"}));
        let revision = revise(
            &pool,
            ReviseRequest::new(VersionedTable::MutationSignatures, current, patch)
                .with_comment(Some("fix".to_string())),
        )
        .await
        .unwrap();
        assert_eq!(revision.created.data_version, 3);

        let (previous, new_version, comment): (Option<i32>, i32, Option<String>) =
            sqlx::query_as(
                "SELECT previous_version, new_version, comment FROM report_history \
                 WHERE ident = $1 ORDER BY created_at DESC, new_version DESC LIMIT 1",
            )
            .bind(ident)
            .fetch_one(&pool)
            .await?;
        assert_eq!(previous, Some(2));
        assert_eq!(new_version, 3);
        assert_eq!(comment.as_deref(), Some("fix"));

        // Exactly one history row per destroy-driven revision.
        let history_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM report_history WHERE ident = $1")
                .bind(ident)
                .fetch_one(&pool)
                .await?;
        assert_eq!(history_count, 3);

        Ok(())
    }
}
