//! In-memory warehouse for development and testing.
//!
//! This implementation uses `RwLock::unwrap()` intentionally. Lock poisoning
//! only occurs when another thread panicked while holding the lock, which is
//! an unrecoverable state. For production workloads, use the PostgreSQL backend.

use async_trait::async_trait;
use bioscore_core::error::{BioscoreError, Result};
use bioscore_core::models::{ScoreRecord, ScoreTable};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::ports::{ScoreWarehouse, StagingBatch};

/// In-memory implementation of ScoreWarehouse
#[derive(Debug, Clone, Default)]
pub struct MemoryWarehouse {
    projects: Arc<RwLock<HashMap<String, String>>>,
    staged: Arc<RwLock<HashMap<StagingBatch, Vec<ScoreRecord>>>>,
    /// `None` until `ensure_score_table` runs
    scores: Arc<RwLock<Option<Vec<ScoreRecord>>>>,
}

impl MemoryWarehouse {
    /// Create a new empty warehouse
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the GeoJSON geometry of a project
    pub fn insert_project_geometry(&self, project_name: &str, geojson: &str) {
        self.projects.write().unwrap().insert(project_name.to_string(), geojson.to_string());
    }

    /// Number of rows in the score table (0 when it does not exist)
    pub fn score_count(&self) -> usize {
        self.scores.read().unwrap().as_ref().map_or(0, Vec::len)
    }

    /// Number of batches still sitting in the staging area
    pub fn staged_batches(&self) -> usize {
        self.staged.read().unwrap().len()
    }
}

#[async_trait]
impl ScoreWarehouse for MemoryWarehouse {
    async fn score_exists(&self, project_name: &str, year: i32) -> Result<bool> {
        let scores = self.scores.read().unwrap();
        Ok(scores
            .as_ref()
            .is_some_and(|rows| rows.iter().any(|r| r.project_name == project_name && r.year == year)))
    }

    async fn project_geometry(&self, project_name: &str) -> Result<Option<String>> {
        Ok(self.projects.read().unwrap().get(project_name).cloned())
    }

    async fn stage_scores(&self, table: &ScoreTable) -> Result<StagingBatch> {
        let batch = StagingBatch::new();
        self.staged.write().unwrap().insert(batch, table.records().to_vec());
        Ok(batch)
    }

    async fn ensure_score_table(&self) -> Result<()> {
        self.scores.write().unwrap().get_or_insert_with(Vec::new);
        Ok(())
    }

    async fn upsert_staged(&self, batch: StagingBatch) -> Result<u64> {
        let mut scores = self.scores.write().unwrap();
        let rows = scores
            .as_mut()
            .ok_or_else(|| BioscoreError::Warehouse("score table does not exist".to_string()))?;

        let staged = self
            .staged
            .write()
            .unwrap()
            .remove(&batch)
            .ok_or_else(|| BioscoreError::Warehouse(format!("unknown staging batch {}", batch)))?;

        let written = staged.len() as u64;
        for record in staged {
            match rows.iter_mut().find(|r| r.key() == record.key()) {
                Some(existing) => *existing = record,
                None => rows.push(record),
            }
        }

        Ok(written)
    }

    async fn project_scores(
        &self,
        project_name: &str,
        start_year: i32,
        end_year: i32,
    ) -> Result<ScoreTable> {
        let scores = self.scores.read().unwrap();
        let mut records: Vec<ScoreRecord> = scores
            .iter()
            .flatten()
            .filter(|r| r.project_name == project_name && (start_year..end_year).contains(&r.year))
            .cloned()
            .collect();

        // Stable: rows of one year keep their insertion order
        records.sort_by_key(|r| r.year);
        Ok(ScoreTable::new(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bioscore_core::models::{Centroid, MetricValue};

    fn record(project: &str, year: i32, metric: &str, value: f64) -> ScoreRecord {
        ScoreRecord {
            metric: metric.to_string(),
            year,
            centroid: Centroid { lat: -8.5, lon: 115.0 },
            project_name: project.to_string(),
            value: MetricValue::Scalar(value),
            area_m2: 1256.6,
            geojson: "{}".to_string(),
        }
    }

    #[tokio::test]
    async fn test_score_exists_without_table() {
        let warehouse = MemoryWarehouse::new();
        assert!(!warehouse.score_exists("bali", 2020).await.unwrap());
    }

    #[tokio::test]
    async fn test_upsert_requires_table() {
        let warehouse = MemoryWarehouse::new();
        let batch = warehouse
            .stage_scores(&ScoreTable::new(vec![record("bali", 2020, "ndvi", 0.5)]))
            .await
            .unwrap();

        let result = warehouse.upsert_staged(batch).await;
        assert!(matches!(result, Err(BioscoreError::Warehouse(_))));
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_key() {
        let warehouse = MemoryWarehouse::new();
        warehouse.ensure_score_table().await.unwrap();

        let first = ScoreTable::new(vec![
            record("bali", 2020, "ndvi", 0.1),
            record("bali", 2020, "ndwi", 0.2),
        ]);
        let batch = warehouse.stage_scores(&first).await.unwrap();
        assert_eq!(warehouse.upsert_staged(batch).await.unwrap(), 2);

        let second = ScoreTable::new(vec![record("bali", 2020, "ndvi", 0.9)]);
        let batch = warehouse.stage_scores(&second).await.unwrap();
        assert_eq!(warehouse.upsert_staged(batch).await.unwrap(), 1);

        assert_eq!(warehouse.score_count(), 2);
        assert_eq!(warehouse.staged_batches(), 0);

        let scores = warehouse.project_scores("bali", 2020, 2021).await.unwrap();
        assert_eq!(scores.records()[0].value, MetricValue::Scalar(0.9));
        assert_eq!(scores.records()[1].metric, "ndwi");
    }

    #[tokio::test]
    async fn test_upsert_unknown_batch() {
        let warehouse = MemoryWarehouse::new();
        warehouse.ensure_score_table().await.unwrap();

        let result = warehouse.upsert_staged(StagingBatch::new()).await;
        assert!(matches!(result, Err(BioscoreError::Warehouse(_))));
    }

    #[tokio::test]
    async fn test_project_scores_half_open_range() {
        let warehouse = MemoryWarehouse::new();
        warehouse.ensure_score_table().await.unwrap();

        let table = ScoreTable::new(vec![
            record("bali", 2021, "ndvi", 0.3),
            record("bali", 2019, "ndvi", 0.1),
            record("bali", 2020, "ndvi", 0.2),
            record("java", 2020, "ndvi", 0.7),
        ]);
        let batch = warehouse.stage_scores(&table).await.unwrap();
        warehouse.upsert_staged(batch).await.unwrap();

        let scores = warehouse.project_scores("bali", 2019, 2021).await.unwrap();
        assert_eq!(scores.years(), vec![2019, 2020]);
        assert!(scores.iter().all(|r| r.project_name == "bali"));
    }

    #[tokio::test]
    async fn test_missing_years_default() {
        let warehouse = MemoryWarehouse::new();
        warehouse.ensure_score_table().await.unwrap();

        let batch = warehouse
            .stage_scores(&ScoreTable::new(vec![record("bali", 2021, "ndvi", 0.3)]))
            .await
            .unwrap();
        warehouse.upsert_staged(batch).await.unwrap();

        let missing = warehouse.missing_years("bali", &[2020, 2021, 2022]).await.unwrap();
        assert_eq!(missing, vec![2020, 2022]);
    }

    #[tokio::test]
    async fn test_project_geometry() {
        let warehouse = MemoryWarehouse::new();
        warehouse.insert_project_geometry("bali", r#"{"type":"Point","coordinates":[0,0]}"#);

        assert!(warehouse.project_geometry("bali").await.unwrap().is_some());
        assert!(warehouse.project_geometry("java").await.unwrap().is_none());
    }
}
