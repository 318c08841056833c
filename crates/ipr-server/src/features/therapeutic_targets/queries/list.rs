use sqlx::PgPool;

use super::super::models::{TherapeuticTargetRecord, TARGET_COLUMNS};

#[derive(Debug, thiserror::Error)]
pub enum ListTherapeuticTargetsError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// List live targets for a report, ordered by rank
#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: &PgPool,
    report_id: i32,
) -> Result<Vec<TherapeuticTargetRecord>, ListTherapeuticTargetsError> {
    let sql = format!(
        "SELECT {TARGET_COLUMNS} FROM therapeutic_targets \
         WHERE report_id = $1 AND deleted_at IS NULL \
         ORDER BY target_type, rank, id"
    );

    let records = sqlx::query_as::<_, TherapeuticTargetRecord>(&sql)
        .bind(report_id)
        .fetch_all(pool)
        .await?;

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_ordered_by_rank(pool: PgPool) {
        let patient_id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO patients (patient_identifier) VALUES ('POG1234') RETURNING id",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        let report_id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO reports (patient_id) VALUES ($1) RETURNING id",
        )
        .bind(patient_id)
        .fetch_one(&pool)
        .await
        .unwrap();

        for (gene, rank) in [("KRAS", 2), ("EGFR", 0), ("TP53", 1)] {
            sqlx::query(
                "INSERT INTO therapeutic_targets (report_id, gene, rank) VALUES ($1, $2, $3)",
            )
            .bind(report_id)
            .bind(gene)
            .bind(rank)
            .execute(&pool)
            .await
            .unwrap();
        }

        let records = handle(&pool, report_id).await.unwrap();
        let genes: Vec<_> = records.iter().filter_map(|r| r.gene.as_deref()).collect();
        assert_eq!(genes, vec!["EGFR", "TP53", "KRAS"]);
    }
}
