use bioscore_core::models::{Centroid, MetricValue, ScoreRecord, ScoreTable};
use bioscore_store::{MemoryWarehouse, ScoreWarehouse};
use std::collections::BTreeMap;
use std::sync::Arc;

fn record(year: i32, metric: &str, value: MetricValue) -> ScoreRecord {
    ScoreRecord {
        metric: metric.to_string(),
        year,
        centroid: Centroid::new(-8.409518, 115.188919).unwrap(),
        project_name: "ubud-reforestation".to_string(),
        value,
        area_m2: 1_256_637_061.4,
        geojson: r#"{"type":"Polygon","coordinates":[]}"#.to_string(),
    }
}

#[tokio::test]
async fn test_stage_then_upsert_through_trait_object() {
    let warehouse: Arc<dyn ScoreWarehouse> = Arc::new(MemoryWarehouse::new());

    let table = ScoreTable::new(vec![
        record(2020, "ndvi", MetricValue::Scalar(0.61)),
        record(2020, "landcover", MetricValue::Missing),
        record(
            2020,
            "elevation",
            MetricValue::Bands(BTreeMap::from([("elevation".to_string(), Some(312.0))])),
        ),
    ]);

    let batch = warehouse.stage_scores(&table).await.unwrap();
    warehouse.ensure_score_table().await.unwrap();
    let written = warehouse.upsert_staged(batch).await.unwrap();
    assert_eq!(written, 3);

    let stored = warehouse.project_scores("ubud-reforestation", 2020, 2021).await.unwrap();
    assert_eq!(stored, table);
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let memory = MemoryWarehouse::new();
    let warehouse: Arc<dyn ScoreWarehouse> = Arc::new(memory.clone());
    warehouse.ensure_score_table().await.unwrap();

    let table = ScoreTable::new(vec![
        record(2021, "ndvi", MetricValue::Scalar(0.5)),
        record(2021, "ndwi", MetricValue::Scalar(-0.1)),
    ]);

    for _ in 0..2 {
        let batch = warehouse.stage_scores(&table).await.unwrap();
        warehouse.upsert_staged(batch).await.unwrap();
    }

    assert_eq!(memory.score_count(), 2);
    assert_eq!(memory.staged_batches(), 0);
    assert!(warehouse.score_exists("ubud-reforestation", 2021).await.unwrap());
    assert!(!warehouse.score_exists("ubud-reforestation", 2022).await.unwrap());
}

#[tokio::test]
async fn test_scores_before_table_exists() {
    let warehouse = MemoryWarehouse::new();
    let stored = warehouse.project_scores("ubud-reforestation", 2000, 2030).await.unwrap();
    assert!(stored.is_empty());
}
