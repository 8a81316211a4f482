use crate::cli::{ScoreArgs, StorageBackend};
use crate::config_loader::load_config;
use crate::output::OutputWriter;
use crate::storage::open_warehouse;
use anyhow::{Context, Result};
use bioscore_core::config::CliConfigOverrides;
use bioscore_core::models::{Centroid, MetricValue, RegionOfInterest, ScoreRecord};
use bioscore_core::IndexCatalog;
use bioscore_earthengine::EarthEngineClient;
use bioscore_indicators::{GeneratorSettings, IndexGenerator, ScoreCalculator};
use std::path::Path;
use tabled::Tabled;

#[derive(Tabled)]
struct ScoreRow {
    #[tabled(rename = "Year")]
    year: i32,
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Area (km²)")]
    area_km2: String,
}

impl From<&ScoreRecord> for ScoreRow {
    fn from(record: &ScoreRecord) -> Self {
        Self {
            year: record.year,
            metric: record.metric.clone(),
            value: format_value(&record.value),
            area_km2: format!("{:.1}", record.area_m2 / 1_000_000.0),
        }
    }
}

fn format_value(value: &MetricValue) -> String {
    match value {
        MetricValue::Scalar(v) => format!("{:.4}", v),
        MetricValue::Bands(bands) => bands
            .iter()
            .map(|(band, v)| match v {
                Some(v) => format!("{}={:.4}", band, v),
                None => format!("{}=-", band),
            })
            .collect::<Vec<_>>()
            .join(", "),
        MetricValue::Missing => "-".to_string(),
    }
}

pub async fn execute(
    args: ScoreArgs,
    config_file: Option<&Path>,
    storage: StorageBackend,
    output: &OutputWriter,
) -> Result<()> {
    // An empty range is valid for the calculator but would only echo stored
    // rows, so the command refuses it before authenticating.
    if args.end_year <= args.start_year {
        anyhow::bail!(
            "Nothing to score for [{}, {}): pass an --end-year greater than --start-year (the end year is excluded)",
            args.start_year,
            args.end_year
        );
    }

    let config = load_config(
        config_file,
        CliConfigOverrides {
            indices_file: args.indices,
            roi_radius_m: args.radius,
            reduction_scale: args.scale,
            max_concurrent_requests: args.concurrency,
            earthengine_project: args.ee_project,
        },
    )?;

    let centroid = Centroid::new(args.lat, args.lon).context("Invalid project centroid")?;
    let roi = RegionOfInterest::new(centroid, config.roi_radius_m.value)
        .context("Invalid region of interest")?;

    let catalog = IndexCatalog::load(&config.indices_file.value);
    if catalog.is_empty() {
        anyhow::bail!(
            "No indices loaded from {}. Check the catalog with 'bioscore catalog'.",
            config.indices_file.value.display()
        );
    }

    let engine = EarthEngineClient::from_env(
        config.earthengine_url.value.clone(),
        config.earthengine_project.value.clone(),
    )
    .await
    .context("Failed to authenticate to Google Earth Engine")?;

    let warehouse = open_warehouse(storage).await?;

    let generator =
        IndexGenerator::new(engine, catalog, roi, GeneratorSettings::from_config(&config));
    let calculator = ScoreCalculator::new(generator, warehouse);

    let scores = calculator
        .compute_score(args.start_year, args.end_year, &args.project)
        .await
        .with_context(|| format!("Failed to compute scores for project '{}'", args.project))?;

    if output.is_json() {
        output.result(&scores)?;
    } else {
        output.section(format!("Scores for {} at {}", args.project, centroid));
        output.table(scores.iter().map(ScoreRow::from).collect());
        output.success(format!(
            "{} records for {}..{}",
            scores.len(),
            args.start_year,
            args.end_year
        ));
    }

    Ok(())
}
