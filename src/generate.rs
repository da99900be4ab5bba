// src/generate.rs
use anyhow::Result;
use std::path::PathBuf;
use tracing::{debug, info, instrument};

use crate::{
    config::GenerateConfig,
    normalize::{normalize, Summary},
    parse::load_table,
    render::{render_template, write_manifest, write_output, Manifest, RenderContext},
};

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct Report {
    pub output: PathBuf,
    pub manifest: Option<PathBuf>,
    pub summary: Summary,
}

/// Parse the grid, normalize it and render the template into the output file.
///
/// Diagnostics are returned in [`Report::summary`], never logged here.
#[instrument(level = "info", skip(config), fields(input = %config.input.display(), name = %config.name))]
pub fn generate(config: &GenerateConfig) -> Result<Report> {
    let table = load_table(&config.input)?;
    let summary = normalize(&table)?;

    let ctx = RenderContext::for_table(config, &table, &summary)?;
    let rendered = render_template(&config.template, &ctx)?;
    debug!(bytes = rendered.len(), "rendered template");

    let output = config.output_path();
    write_output(&output, rendered.as_bytes())?;
    info!(output = %output.display(), items = summary.items, "generated table");

    if let Some(path) = &config.manifest {
        let table_name = config.table_name();
        let data_name = config.data_name();
        let manifest = Manifest {
            name: &config.name,
            table_name: &table_name,
            data_name: &data_name,
            output: &output,
            summary: &summary,
        };
        write_manifest(path, &manifest)?;
        info!(manifest = %path.display(), "wrote manifest");
    }

    Ok(Report {
        output,
        manifest: config.manifest.clone(),
        summary,
    })
}
