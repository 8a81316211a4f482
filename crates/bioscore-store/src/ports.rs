use async_trait::async_trait;
use bioscore_core::error::Result;
use bioscore_core::models::ScoreTable;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Handle to rows written to the staging table by one `stage_scores` call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StagingBatch(Uuid);

impl StagingBatch {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn id(&self) -> Uuid {
        self.0
    }
}

impl Default for StagingBatch {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StagingBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Port for the SQL warehouse holding score tables and project geometries
#[async_trait]
pub trait ScoreWarehouse: Send + Sync {
    /// Whether at least one score record exists for the project and year
    ///
    /// Returns false when the score table itself does not exist yet.
    async fn score_exists(&self, project_name: &str, year: i32) -> Result<bool>;

    /// Years from `years` with no stored record for the project, in input order
    async fn missing_years(&self, project_name: &str, years: &[i32]) -> Result<Vec<i32>> {
        let mut missing = Vec::new();
        for &year in years {
            if !self.score_exists(project_name, year).await? {
                missing.push(year);
            }
        }
        Ok(missing)
    }

    /// Stored GeoJSON text of the project's geometry
    async fn project_geometry(&self, project_name: &str) -> Result<Option<String>>;

    /// Write a score table to the staging area
    async fn stage_scores(&self, table: &ScoreTable) -> Result<StagingBatch>;

    /// Create the destination score table if it does not exist
    async fn ensure_score_table(&self) -> Result<()>;

    /// Insert-or-update a staged batch into the score table, keyed by
    /// (project_name, year, metric), and clear the batch
    ///
    /// Returns the number of rows written.
    async fn upsert_staged(&self, batch: StagingBatch) -> Result<u64>;

    /// Stored scores of the project for years in `[start_year, end_year)`
    async fn project_scores(
        &self,
        project_name: &str,
        start_year: i32,
        end_year: i32,
    ) -> Result<ScoreTable>;
}

#[async_trait]
impl<T: ScoreWarehouse + ?Sized> ScoreWarehouse for Arc<T> {
    async fn score_exists(&self, project_name: &str, year: i32) -> Result<bool> {
        (**self).score_exists(project_name, year).await
    }

    async fn missing_years(&self, project_name: &str, years: &[i32]) -> Result<Vec<i32>> {
        (**self).missing_years(project_name, years).await
    }

    async fn project_geometry(&self, project_name: &str) -> Result<Option<String>> {
        (**self).project_geometry(project_name).await
    }

    async fn stage_scores(&self, table: &ScoreTable) -> Result<StagingBatch> {
        (**self).stage_scores(table).await
    }

    async fn ensure_score_table(&self) -> Result<()> {
        (**self).ensure_score_table().await
    }

    async fn upsert_staged(&self, batch: StagingBatch) -> Result<u64> {
        (**self).upsert_staged(batch).await
    }

    async fn project_scores(
        &self,
        project_name: &str,
        start_year: i32,
        end_year: i32,
    ) -> Result<ScoreTable> {
        (**self).project_scores(project_name, start_year, end_year).await
    }
}
