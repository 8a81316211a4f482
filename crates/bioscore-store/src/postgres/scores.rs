//! ScoreWarehouse implementation for PostgreSQL

use async_trait::async_trait;
use bioscore_core::error::{BioscoreError, Result};
use bioscore_core::models::{Centroid, MetricValue, ScoreRecord, ScoreTable};
use sqlx::postgres::PgRow;
use sqlx::Row;

use super::PostgresWarehouse;
use crate::ports::{ScoreWarehouse, StagingBatch};

fn warehouse_error(action: &str) -> impl FnOnce(sqlx::Error) -> BioscoreError + '_ {
    move |e| BioscoreError::Warehouse(format!("Failed to {}: {}", action, e))
}

#[async_trait]
impl ScoreWarehouse for PostgresWarehouse {
    async fn score_exists(&self, project_name: &str, year: i32) -> Result<bool> {
        let table = &self.config.tables.scores;
        if !self.table_exists(table).await? {
            return Ok(false);
        }

        sqlx::query_scalar(&format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE project_name = $1 AND year = $2)",
            table
        ))
        .bind(project_name)
        .bind(year)
        .fetch_one(&self.pool)
        .await
        .map_err(warehouse_error("check for existing scores"))
    }

    async fn project_geometry(&self, project_name: &str) -> Result<Option<String>> {
        sqlx::query_scalar(&format!(
            "SELECT geometry FROM {} WHERE name = $1 LIMIT 1",
            self.config.tables.projects
        ))
        .bind(project_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(warehouse_error("fetch project geometry"))
    }

    async fn stage_scores(&self, table: &ScoreTable) -> Result<StagingBatch> {
        let staging = &self.config.tables.staging;
        let batch = StagingBatch::new();

        let mut tx = self.pool.begin().await.map_err(warehouse_error("begin transaction"))?;

        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                batch_id UUID NOT NULL,
                position INTEGER NOT NULL,
                project_name TEXT NOT NULL,
                year INTEGER NOT NULL,
                metric TEXT NOT NULL,
                centroid TEXT NOT NULL,
                value JSONB,
                area_m2 DOUBLE PRECISION NOT NULL,
                geojson TEXT NOT NULL,
                PRIMARY KEY (batch_id, position)
            )
            "#,
            staging
        ))
        .execute(&mut *tx)
        .await
        .map_err(warehouse_error("create staging table"))?;

        for (position, record) in table.iter().enumerate() {
            let value = serde_json::to_value(&record.value)
                .map_err(|e| BioscoreError::Serialization(format!("Failed to serialize value: {}", e)))?;

            sqlx::query(&format!(
                r#"
                INSERT INTO {} (batch_id, position, project_name, year, metric, centroid, value, area_m2, geojson)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
                staging
            ))
            .bind(batch.id())
            .bind(position as i32)
            .bind(&record.project_name)
            .bind(record.year)
            .bind(&record.metric)
            .bind(record.centroid.to_string())
            .bind(value)
            .bind(record.area_m2)
            .bind(&record.geojson)
            .execute(&mut *tx)
            .await
            .map_err(warehouse_error("stage score record"))?;
        }

        tx.commit().await.map_err(warehouse_error("commit staged scores"))?;

        tracing::debug!(batch = %batch, rows = table.len(), "Staged score table");
        Ok(batch)
    }

    async fn ensure_score_table(&self) -> Result<()> {
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                project_name TEXT NOT NULL,
                year INTEGER NOT NULL,
                metric TEXT NOT NULL,
                position INTEGER NOT NULL,
                centroid TEXT NOT NULL,
                value JSONB,
                area_m2 DOUBLE PRECISION NOT NULL,
                geojson TEXT NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                PRIMARY KEY (project_name, year, metric)
            )
            "#,
            self.config.tables.scores
        ))
        .execute(&self.pool)
        .await
        .map_err(warehouse_error("create score table"))?;

        Ok(())
    }

    async fn upsert_staged(&self, batch: StagingBatch) -> Result<u64> {
        let tables = &self.config.tables;
        let mut tx = self.pool.begin().await.map_err(warehouse_error("begin transaction"))?;

        // DISTINCT ON keeps the last staged row per key; ON CONFLICT may touch a row only once
        let upserted = sqlx::query(&format!(
            r#"
            INSERT INTO {scores} (project_name, year, metric, position, centroid, value, area_m2, geojson, updated_at)
            SELECT DISTINCT ON (project_name, year, metric)
                project_name, year, metric, position, centroid, value, area_m2, geojson, now()
            FROM {staging}
            WHERE batch_id = $1
            ORDER BY project_name, year, metric, position DESC
            ON CONFLICT (project_name, year, metric) DO UPDATE
            SET position = EXCLUDED.position,
                centroid = EXCLUDED.centroid,
                value = EXCLUDED.value,
                area_m2 = EXCLUDED.area_m2,
                geojson = EXCLUDED.geojson,
                updated_at = EXCLUDED.updated_at
            "#,
            scores = tables.scores,
            staging = tables.staging
        ))
        .bind(batch.id())
        .execute(&mut *tx)
        .await
        .map_err(warehouse_error("upsert staged scores"))?
        .rows_affected();

        sqlx::query(&format!("DELETE FROM {} WHERE batch_id = $1", tables.staging))
            .bind(batch.id())
            .execute(&mut *tx)
            .await
            .map_err(warehouse_error("clear staging batch"))?;

        tx.commit().await.map_err(warehouse_error("commit upsert"))?;

        tracing::info!(batch = %batch, rows = upserted, table = %tables.scores, "Upserted score records");
        Ok(upserted)
    }

    async fn project_scores(
        &self,
        project_name: &str,
        start_year: i32,
        end_year: i32,
    ) -> Result<ScoreTable> {
        let table = &self.config.tables.scores;
        if !self.table_exists(table).await? {
            return Ok(ScoreTable::default());
        }

        let rows = sqlx::query(&format!(
            r#"
            SELECT project_name, year, metric, centroid, value, area_m2, geojson
            FROM {}
            WHERE project_name = $1 AND year >= $2 AND year < $3
            ORDER BY year, position
            "#,
            table
        ))
        .bind(project_name)
        .bind(start_year)
        .bind(end_year)
        .fetch_all(&self.pool)
        .await
        .map_err(warehouse_error("fetch project scores"))?;

        let records = rows.iter().map(record_from_row).collect::<Result<Vec<_>>>()?;
        Ok(ScoreTable::new(records))
    }
}

fn record_from_row(row: &PgRow) -> Result<ScoreRecord> {
    let column = |e: sqlx::Error| BioscoreError::Warehouse(format!("Malformed score row: {}", e));

    let centroid: String = row.try_get("centroid").map_err(column)?;
    let value: Option<serde_json::Value> = row.try_get("value").map_err(column)?;
    let value = match value {
        Some(json) => serde_json::from_value(json)
            .map_err(|e| BioscoreError::Serialization(format!("Failed to parse stored value: {}", e)))?,
        None => MetricValue::Missing,
    };

    Ok(ScoreRecord {
        metric: row.try_get("metric").map_err(column)?,
        year: row.try_get("year").map_err(column)?,
        centroid: centroid.parse::<Centroid>()?,
        project_name: row.try_get("project_name").map_err(column)?,
        value,
        area_m2: row.try_get("area_m2").map_err(column)?,
        geojson: row.try_get("geojson").map_err(column)?,
    })
}
