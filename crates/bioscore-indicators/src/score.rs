use bioscore_core::error::Result;
use bioscore_core::models::ScoreTable;
use bioscore_earthengine::EarthEngine;
use bioscore_store::ports::ScoreWarehouse;

use crate::generator::IndexGenerator;

/// Computes score tables for the years a project lacks and serves the
/// stored series
pub struct ScoreCalculator<E, W>
where
    E: EarthEngine,
    W: ScoreWarehouse,
{
    generator: IndexGenerator<E>,
    warehouse: W,
}

impl<E, W> ScoreCalculator<E, W>
where
    E: EarthEngine,
    W: ScoreWarehouse,
{
    pub fn new(generator: IndexGenerator<E>, warehouse: W) -> Self {
        Self { generator, warehouse }
    }

    pub fn generator(&self) -> &IndexGenerator<E> {
        &self.generator
    }

    pub fn warehouse(&self) -> &W {
        &self.warehouse
    }

    /// Stored scores of `project_name` for years in `[start_year, end_year)`,
    /// computing and upserting any year not yet in the warehouse
    pub async fn compute_score(
        &self,
        start_year: i32,
        end_year: i32,
        project_name: &str,
    ) -> Result<ScoreTable> {
        let years: Vec<i32> = (start_year..end_year).collect();
        let missing = self.warehouse.missing_years(project_name, &years).await?;

        if !missing.is_empty() {
            tracing::info!(project = project_name, years = ?missing, "Computing missing years");

            let table = self.generator.build_table(&missing, project_name).await?;
            let batch = self.warehouse.stage_scores(&table).await?;
            self.warehouse.ensure_score_table().await?;
            let upserted = self.warehouse.upsert_staged(batch).await?;

            tracing::info!(project = project_name, rows = upserted, "Upserted records into warehouse");
        }

        self.warehouse.project_scores(project_name, start_year, end_year).await
    }
}
