use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use thermotable::{config, generate, GenerateConfig};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Convert NIST thermocouple data into lookup tables in C"
)]
struct Args {
    /// File containing NIST data
    input: PathBuf,
    /// Name for the generated file; defaults to the input file stem
    #[arg(long)]
    name: Option<String>,
    /// Variable name for the table; defaults to `_<name>`
    #[arg(long = "table_name")]
    table_name: Option<String>,
    /// Samples whose temperature is a multiple of this start a new line
    #[arg(long, default_value_t = config::DEFAULT_LINEWIDTH,
          value_parser = clap::value_parser!(u32).range(1..))]
    linewidth: u32,
    /// Output directory; must already exist
    #[arg(long, default_value = config::DEFAULT_DST)]
    dst: PathBuf,
    /// Template to render
    #[arg(long, default_value = config::DEFAULT_TEMPLATE)]
    template: PathBuf,
    /// Write here instead of `<dst>/<name>.c`
    #[arg(long)]
    output: Option<PathBuf>,
    /// Also write a JSON summary of the generated table
    #[arg(long)]
    manifest: Option<PathBuf>,
}

impl Args {
    fn into_config(self) -> Result<GenerateConfig> {
        let mut cfg = GenerateConfig::from_input(&self.input)?
            .with_linewidth(self.linewidth)
            .with_dst(self.dst)
            .with_template(self.template);
        if let Some(name) = self.name {
            cfg = cfg.with_name(name);
        }
        if let Some(table_name) = self.table_name {
            cfg = cfg.with_table_name(table_name);
        }
        if let Some(output) = self.output {
            cfg = cfg.with_output(output);
        }
        if let Some(manifest) = self.manifest {
            cfg = cfg.with_manifest(manifest);
        }
        Ok(cfg)
    }
}

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let cfg = Args::parse().into_config()?;
    let report = generate(&cfg)?;

    for diag in &report.summary.diagnostics {
        warn!("{}", diag);
    }
    info!(
        output = %report.output.display(),
        t_min = report.summary.min_index,
        t_max = report.summary.max_index,
        uv_sorted = report.summary.value_sorted,
        "done"
    );
    Ok(())
}
