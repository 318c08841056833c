//! Database queries for the history trail

use sqlx::{PgExecutor, PgPool};
use tracing::debug;

use super::models::{HistoryQuery, HistoryRecord, NewHistoryRecord};

const HISTORY_COLUMNS: &str = "id, table_name, model_name, ident, previous_version, \
                               new_version, report_id, user_id, comment, created_at";

/// Record a version transition.
///
/// Takes any Postgres executor so the insert can participate in the revise
/// transaction.
pub async fn insert<'e, E>(
    executor: E,
    record: NewHistoryRecord<'_>,
) -> Result<HistoryRecord, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        r#"
        INSERT INTO report_history (
            table_name, model_name, ident, previous_version,
            new_version, report_id, user_id, comment
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {HISTORY_COLUMNS}
        "#
    );

    let row = sqlx::query_as::<_, HistoryRecord>(&sql)
        .bind(record.table_name)
        .bind(record.model_name)
        .bind(record.ident)
        .bind(record.previous_version)
        .bind(record.new_version)
        .bind(record.report_id)
        .bind(record.user_id)
        .bind(record.comment)
        .fetch_one(executor)
        .await?;

    debug!(
        history_id = %row.id,
        table = %row.table_name,
        ident = %row.ident,
        new_version = row.new_version,
        "Recorded version transition"
    );

    Ok(row)
}

/// List history entries for a report, newest first, with optional filters
pub async fn list_for_report(
    pool: &PgPool,
    report_id: i32,
    query: &HistoryQuery,
) -> Result<Vec<HistoryRecord>, sqlx::Error> {
    let mut sql = format!(
        r#"
        SELECT {HISTORY_COLUMNS}
        FROM report_history
        WHERE report_id = $1
        "#
    );

    let mut bind_count = 2;
    if query.ident.is_some() {
        sql.push_str(&format!(" AND ident = ${bind_count}"));
        bind_count += 1;
    }
    if query.table_name.is_some() {
        sql.push_str(&format!(" AND table_name = ${bind_count}"));
        bind_count += 1;
    }
    if query.user_id.is_some() {
        sql.push_str(&format!(" AND user_id = ${bind_count}"));
        bind_count += 1;
    }

    sql.push_str(" ORDER BY created_at DESC, new_version DESC");
    sql.push_str(&format!(" LIMIT ${bind_count}"));
    sql.push_str(&format!(" OFFSET ${}", bind_count + 1));

    let mut query_builder = sqlx::query_as::<_, HistoryRecord>(&sql).bind(report_id);

    if let Some(ident) = query.ident {
        query_builder = query_builder.bind(ident);
    }
    if let Some(ref table_name) = query.table_name {
        query_builder = query_builder.bind(table_name);
    }
    if let Some(user_id) = query.user_id {
        query_builder = query_builder.bind(user_id);
    }

    let records = query_builder
        .bind(query.limit())
        .bind(query.offset())
        .fetch_all(pool)
        .await?;

    debug!(report_id, count = records.len(), "Queried history trail");

    Ok(records)
}

/// Count history entries for a report (for pagination metadata)
pub async fn count_for_report(pool: &PgPool, report_id: i32) -> Result<i64, sqlx::Error> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM report_history WHERE report_id = $1")
            .bind(report_id)
            .fetch_one(pool)
            .await?;
    Ok(count)
}
