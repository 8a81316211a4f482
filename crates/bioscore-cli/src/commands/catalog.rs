use crate::cli::CatalogArgs;
use crate::config_loader::load_config;
use crate::output::OutputWriter;
use anyhow::{Context, Result};
use bioscore_core::config::CliConfigOverrides;
use bioscore_core::IndexCatalog;
use serde::Serialize;
use std::path::Path;
use tabled::Tabled;

#[derive(Tabled, Serialize)]
struct CatalogRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    gee_type: String,
    #[tabled(rename = "Path")]
    gee_path: String,
    #[tabled(rename = "Band")]
    bandname: String,
    #[tabled(rename = "Shown")]
    show: bool,
}

#[derive(Serialize)]
struct CatalogReport {
    indices: Vec<CatalogRow>,
    issues: Vec<String>,
}

pub fn execute(args: CatalogArgs, config_file: Option<&Path>, output: &OutputWriter) -> Result<()> {
    let config = load_config(
        config_file,
        CliConfigOverrides { indices_file: args.indices, ..Default::default() },
    )?;

    if args.show_config && !output.is_json() {
        output.section("Configuration");
        let mut entries: Vec<_> = config.to_inspection_map().into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        for (key, (value, source)) in entries {
            output.kv(key, format!("{} ({:?})", value, source));
        }
    }

    let path = &config.indices_file.value;
    let catalog = IndexCatalog::try_load(path)
        .with_context(|| format!("Failed to load index catalog {}", path.display()))?;

    let issues: Vec<String> = catalog.validate().iter().map(ToString::to_string).collect();
    let rows: Vec<CatalogRow> = catalog
        .iter()
        .map(|(key, definition)| CatalogRow {
            key: key.to_string(),
            name: definition.name.clone(),
            gee_type: definition.gee_type.to_string(),
            gee_path: definition.gee_path.clone(),
            bandname: definition.bandname.clone().unwrap_or_default(),
            show: definition.show,
        })
        .collect();

    if output.is_json() {
        return output.result(CatalogReport { indices: rows, issues });
    }

    output.section(format!("Indices in {}", path.display()));
    output.table(rows);
    for issue in &issues {
        output.warning(issue);
    }
    output.info(format!("{} indices, {} issues", catalog.len(), issues.len()));

    Ok(())
}
