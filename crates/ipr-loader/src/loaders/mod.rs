//! Delimited file ingestion
//!
//! Parses pipeline output (header row plus data rows), remaps columns via the
//! dictionaries in [`crate::remap`], and bulk-inserts the rows with
//! `data_version = 0` against a report resolved by patient and biopsy.

use std::path::Path;

use serde_json::{Map, Value};
use sqlx::PgPool;

use crate::error::{LoaderError, Result};
use crate::remap::{delimiter_for_path, ColumnKind, ColumnMapping, Entity};

/// Parse a delimited file into insert-ready row objects
///
/// File headers with no dictionary entry are skipped with a warning. Empty
/// fields become NULL.
pub fn parse_rows(
    path: &Path,
    entity: Entity,
    delimiter: Option<char>,
) -> Result<Vec<Map<String, Value>>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter_for_path(path, delimiter))
        .trim(csv::Trim::All)
        .from_path(path)?;

    // Resolve each header position through the dictionary once, up front.
    let headers = reader.headers()?.clone();
    let mut columns: Vec<Option<&'static ColumnMapping>> = Vec::with_capacity(headers.len());
    for header in headers.iter() {
        let mapping = entity.mapping_for_header(header);
        if mapping.is_none() {
            tracing::warn!(header, table = entity.table(), "Skipping unmapped column");
        }
        columns.push(mapping);
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let mut row = Map::new();
        for (index, mapping) in columns.iter().enumerate() {
            let Some(mapping) = mapping else {
                continue;
            };
            let raw = record.get(index).unwrap_or("");
            row.insert(
                mapping.db_column.to_string(),
                convert(mapping.kind, raw, mapping.db_column, line)?,
            );
        }
        rows.push(row);
    }

    Ok(rows)
}

fn convert(kind: ColumnKind, raw: &str, column: &str, line: u64) -> Result<Value> {
    if raw.is_empty() {
        return Ok(Value::Null);
    }
    match kind {
        ColumnKind::Text => Ok(Value::String(raw.to_string())),
        ColumnKind::Integer => raw
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| LoaderError::InvalidValue {
                column: column.to_string(),
                value: raw.to_string(),
                line,
            }),
        ColumnKind::Float => raw
            .parse::<f64>()
            .map(Value::from)
            .map_err(|_| LoaderError::InvalidValue {
                column: column.to_string(),
                value: raw.to_string(),
                line,
            }),
        ColumnKind::Reviewer => Ok(crate::remap::reviewer_id(raw)
            .map(Value::from)
            .unwrap_or(Value::Null)),
    }
}

/// Resolve the target report by patient identifier and biopsy name
pub async fn resolve_report(pool: &PgPool, patient: &str, biopsy: &str) -> Result<i32> {
    sqlx::query_scalar::<_, i32>(
        "SELECT r.id FROM reports r \
         JOIN patients p ON p.id = r.patient_id \
         WHERE p.patient_identifier = $1 AND r.biopsy_name = $2 \
           AND r.deleted_at IS NULL AND p.deleted_at IS NULL \
         ORDER BY r.id DESC LIMIT 1",
    )
    .bind(patient)
    .bind(biopsy)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| LoaderError::ReportNotFound {
        patient: patient.to_string(),
        biopsy: biopsy.to_string(),
    })
}

/// Parse a pipeline file and bulk-insert its rows against a report
#[tracing::instrument(skip(pool), fields(table = entity.table()))]
pub async fn load_file(
    pool: &PgPool,
    entity: Entity,
    path: &Path,
    patient: &str,
    biopsy: &str,
    delimiter: Option<char>,
) -> Result<u64> {
    let report_id = resolve_report(pool, patient, biopsy).await?;

    let mut rows = parse_rows(path, entity, delimiter)?;
    if rows.is_empty() {
        return Err(LoaderError::EmptyFile(path.to_path_buf()));
    }
    for row in &mut rows {
        row.insert("report_id".to_string(), Value::from(report_id));
    }

    let inserted = insert_rows(pool, entity, rows).await?;
    tracing::info!(report_id, inserted, "Pipeline file loaded");

    Ok(inserted)
}

/// Bulk-insert rows; `ident` and `data_version` take their column defaults
async fn insert_rows(pool: &PgPool, entity: Entity, rows: Vec<Map<String, Value>>) -> Result<u64> {
    let table = entity.table();
    let mut columns = vec!["report_id"];
    columns.extend(entity.db_columns());

    let column_list = columns.join(", ");
    let select_list = columns
        .iter()
        .map(|c| format!("r.{c}"))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "INSERT INTO {table} ({column_list}) \
         SELECT {select_list} FROM jsonb_populate_recordset(NULL::{table}, $1) r"
    );

    let payload = Value::Array(rows.into_iter().map(Value::Object).collect());
    let result = sqlx::query(&sql).bind(payload).execute(pool).await?;

    Ok(result.rows_affected())
}
