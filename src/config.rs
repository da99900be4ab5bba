// src/config.rs
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub const DEFAULT_LINEWIDTH: u32 = 10;
pub const DEFAULT_DST: &str = "output";
pub const DEFAULT_TEMPLATE: &str = "template.c";

/// Fully resolved settings for one generator run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateConfig {
    /// Raw grid to read.
    pub input: PathBuf,
    /// Base name of the generated file and of the default identifiers.
    pub name: String,
    /// Variable name of the `struct tc_table`; `_<name>` when unset.
    pub table_name: Option<String>,
    pub linewidth: u32,
    pub dst: PathBuf,
    pub template: PathBuf,
    /// Overrides `<dst>/<name>.c`.
    pub output: Option<PathBuf>,
    /// Optional JSON summary written next to the generated source.
    pub manifest: Option<PathBuf>,
}

impl GenerateConfig {
    /// Defaults for `input`, naming everything after the file stem.
    pub fn from_input<P: AsRef<Path>>(input: P) -> Result<Self> {
        let input = input.as_ref().to_path_buf();
        let name = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .with_context(|| format!("cannot derive a name from {:?}", input))?;
        Ok(Self {
            input,
            name,
            table_name: None,
            linewidth: DEFAULT_LINEWIDTH,
            dst: PathBuf::from(DEFAULT_DST),
            template: PathBuf::from(DEFAULT_TEMPLATE),
            output: None,
            manifest: None,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = Some(table_name.into());
        self
    }

    pub fn with_linewidth(mut self, linewidth: u32) -> Self {
        self.linewidth = linewidth;
        self
    }

    pub fn with_dst(mut self, dst: impl Into<PathBuf>) -> Self {
        self.dst = dst.into();
        self
    }

    pub fn with_template(mut self, template: impl Into<PathBuf>) -> Self {
        self.template = template.into();
        self
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_manifest(mut self, manifest: impl Into<PathBuf>) -> Self {
        self.manifest = Some(manifest.into());
        self
    }

    pub fn table_name(&self) -> String {
        self.table_name
            .clone()
            .unwrap_or_else(|| format!("_{}", self.name))
    }

    pub fn data_name(&self) -> String {
        format!("_{}_data", self.name)
    }

    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.dst.join(format!("{}.c", self.name)))
    }
}
