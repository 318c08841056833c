//! Delimited file export
//!
//! The inverse of the load path: query the live rows of a report sub-entity,
//! rename database columns back to pipeline headers through the same
//! dictionary, and write a delimited file. Any pre-existing file of the same
//! name is deleted first; the overwrite is not atomic.

use std::path::Path;

use serde_json::{Map, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{LoaderError, Result};
use crate::remap::{delimiter_for_path, reviewer_initials, ColumnKind, ColumnMapping, Entity};

/// Export the live rows of a report sub-entity to a delimited file
///
/// Returns the number of data rows written.
#[tracing::instrument(skip(pool), fields(table = entity.table(), report = %report_ident))]
pub async fn export_report(
    pool: &PgPool,
    entity: Entity,
    report_ident: Uuid,
    path: &Path,
    delimiter: Option<char>,
) -> Result<u64> {
    let report_id = sqlx::query_scalar::<_, i32>(
        "SELECT id FROM reports WHERE ident = $1 AND deleted_at IS NULL",
    )
    .bind(report_ident)
    .fetch_optional(pool)
    .await?
    .ok_or(LoaderError::ReportIdentNotFound(report_ident))?;

    let sql = format!(
        "SELECT row_to_json(t)::jsonb FROM {table} t \
         WHERE report_id = $1 AND deleted_at IS NULL ORDER BY id",
        table = entity.table()
    );
    let rows: Vec<Value> = sqlx::query_scalar(&sql)
        .bind(report_id)
        .fetch_all(pool)
        .await?;

    match std::fs::remove_file(path) {
        Ok(()) => tracing::debug!(path = %path.display(), "Removed pre-existing export"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {},
        Err(e) => return Err(e.into()),
    }

    let mappings = entity.mappings();
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter_for_path(path, delimiter))
        .from_path(path)?;

    writer.write_record(mappings.iter().map(|m| m.file_header))?;

    let mut written = 0;
    for row in rows {
        let Value::Object(row) = row else {
            continue;
        };
        writer.write_record(mappings.iter().map(|m| render(m, &row)))?;
        written += 1;
    }
    writer.flush()?;

    tracing::info!(report_id, written, path = %path.display(), "Export complete");

    Ok(written)
}

fn render(mapping: &ColumnMapping, row: &Map<String, Value>) -> String {
    let value = row.get(mapping.db_column).unwrap_or(&Value::Null);
    match (mapping.kind, value) {
        (_, Value::Null) => String::new(),
        (ColumnKind::Reviewer, Value::Number(id)) => id
            .as_i64()
            .and_then(|id| i32::try_from(id).ok())
            .and_then(reviewer_initials)
            .unwrap_or("")
            .to_string(),
        (_, Value::String(text)) => text.clone(),
        (_, Value::Number(number)) => number.to_string(),
        (_, other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seed_report(pool: &PgPool) -> (i32, Uuid) {
        let patient_id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO patients (patient_identifier) VALUES ('POG1234') RETURNING id",
        )
        .fetch_one(pool)
        .await
        .unwrap();
        sqlx::query_as::<_, (i32, Uuid)>(
            "INSERT INTO reports (patient_id, biopsy_name) VALUES ($1, 'biop1') \
             RETURNING id, ident",
        )
        .bind(patient_id)
        .fetch_one(pool)
        .await
        .unwrap()
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_export_renames_columns_and_reviewers(pool: PgPool) {
        let (report_id, report_ident) = seed_report(&pool).await;

        sqlx::query(
            "INSERT INTO small_mutations (report_id, gene, protein_change, reviewed_by_id) \
             VALUES ($1, 'KRAS', 'p.G12D', 4), ($1, 'TP53', NULL, NULL)",
        )
        .bind(report_id)
        .execute(&pool)
        .await
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("small_mutations.tsv");
        let written = export_report(&pool, Entity::SmallMutations, report_ident, &path, None)
            .await
            .unwrap();
        assert_eq!(written, 2);

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("gene_name\ttranscript\thgvs_protein"));

        let first = lines.next().unwrap();
        assert!(first.contains("KRAS"));
        assert!(first.contains("p.G12D"));
        assert!(first.contains("CRR"));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_export_overwrites_existing_file(pool: PgPool) {
        let (_, report_ident) = seed_report(&pool).await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("small_mutations.tsv");
        std::fs::write(&path, "stale content").unwrap();

        export_report(&pool, Entity::SmallMutations, report_ident, &path, None)
            .await
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("stale content"));
        assert!(content.starts_with("gene_name"));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_export_unknown_report_fails(pool: PgPool) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.tsv");

        let result =
            export_report(&pool, Entity::SmallMutations, Uuid::new_v4(), &path, None).await;
        assert!(matches!(result, Err(LoaderError::ReportIdentNotFound(_))));
    }
}
