use crate::cli::{MapArgs, StorageBackend};
use crate::output::OutputWriter;
use crate::storage::open_warehouse;
use anyhow::{Context, Result};
use bioscore_indicators::ProjectMapRenderer;

pub async fn execute(args: MapArgs, storage: StorageBackend, output: &OutputWriter) -> Result<()> {
    let warehouse = open_warehouse(storage).await?;
    let renderer = ProjectMapRenderer::new(warehouse);

    let figure = renderer
        .render(&args.project)
        .await
        .with_context(|| format!("Failed to render map for project '{}'", args.project))?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, figure.to_json()?)
                .with_context(|| format!("Failed to write {}", path.display()))?;

            if output.is_json() {
                output.result(serde_json::json!({
                    "path": path.display().to_string(),
                    "zoom": figure.layout.mapbox.zoom,
                    "center": figure.layout.mapbox.center,
                }))?;
            } else {
                output.success(format!("Map figure written to {}", path.display()));
                output.kv("Zoom", format!("{:.2}", figure.layout.mapbox.zoom));
                output.kv(
                    "Center",
                    format!(
                        "({:.5}, {:.5})",
                        figure.layout.mapbox.center.lon, figure.layout.mapbox.center.lat
                    ),
                );
            }
        }
        None => output.result(&figure)?,
    }

    Ok(())
}
