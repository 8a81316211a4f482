//! Score table assembly

use bioscore_core::error::{BioscoreError, Result};
use bioscore_core::models::{MetricValue, ScoreRecord, ScoreTable};
use bioscore_earthengine::EarthEngine;
use futures::stream::{self, StreamExt, TryStreamExt};

use crate::generator::IndexGenerator;

impl<E: EarthEngine> IndexGenerator<E> {
    /// Area of the region of interest in square meters
    pub async fn region_area(&self) -> Result<f64> {
        let area = self.engine().compute_value(&self.region().area()).await?;
        area.as_f64().ok_or_else(|| {
            BioscoreError::RemoteCall(format!("Geometry.area returned {} instead of a number", area))
        })
    }

    /// Boundary of the region of interest as GeoJSON text
    pub async fn region_geojson(&self) -> Result<String> {
        let geometry = self.engine().compute_value(self.region().expr()).await?;
        serde_json::to_string(&geometry)
            .map_err(|e| BioscoreError::Serialization(format!("Failed to encode region: {}", e)))
    }

    /// One record per index key for `year`, in key order
    ///
    /// Zonal means run at most `max_concurrent_requests` at a time.
    pub async fn build_row(
        &self,
        year: i32,
        index_keys: &[String],
        project_name: &str,
    ) -> Result<ScoreTable> {
        let limit = self.settings().max_concurrent_requests.max(1);
        let values: Vec<MetricValue> =
            stream::iter(index_keys.iter().map(|key| self.zonal_mean(key, year)))
                .buffered(limit)
                .try_collect()
                .await?;

        let area_m2 = self.region_area().await?;
        let geojson = self.region_geojson().await?;
        let centroid = self.roi().centroid();

        let records = index_keys
            .iter()
            .zip(values)
            .map(|(key, value)| ScoreRecord {
                metric: key.clone(),
                year,
                centroid,
                project_name: project_name.to_string(),
                value,
                area_m2,
                geojson: geojson.clone(),
            })
            .collect();

        Ok(ScoreTable::new(records))
    }

    /// Rows for every catalog index, year by year
    pub async fn build_table(&self, years: &[i32], project_name: &str) -> Result<ScoreTable> {
        let keys = self.catalog().keys();
        let mut rows = Vec::with_capacity(years.len());

        for &year in years {
            tracing::info!(year, project = project_name, indices = keys.len(), "Building score row");
            rows.push(self.build_row(year, &keys, project_name).await?);
        }

        Ok(ScoreTable::concat(rows))
    }
}
