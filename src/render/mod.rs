// src/render/mod.rs
use anyhow::{bail, Context, Result};
use regex::{Captures, Regex};
use std::{collections::BTreeMap, fmt::Write, fs, path::Path};
use tracing::{instrument, trace};

use crate::{config::GenerateConfig, normalize::Summary, parse::Table};

pub mod output;

pub use output::{write_manifest, write_output, Manifest};

/// Placeholder tokens: the shortest `{...}` run on a single line.
const PLACEHOLDER: &str = r"\{.*?\}";

/// Substitution fields a template may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    MinimumTemperature,
    MaximumTemperature,
    MinimumVoltage,
    MaximumVoltage,
    Filename,
    DataName,
    TableName,
    TableData,
    ItemCount,
    VoltageSorted,
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::MinimumTemperature,
        Field::MaximumTemperature,
        Field::MinimumVoltage,
        Field::MaximumVoltage,
        Field::Filename,
        Field::DataName,
        Field::TableName,
        Field::TableData,
        Field::ItemCount,
        Field::VoltageSorted,
    ];

    /// Name used between the braces in a template.
    pub fn name(self) -> &'static str {
        match self {
            Field::MinimumTemperature => "MINIMUM_TEMPERATURE",
            Field::MaximumTemperature => "MAXIMUM_TEMPERATURE",
            Field::MinimumVoltage => "MINIMUM_VOLTAGE",
            Field::MaximumVoltage => "MAXIMUM_VOLTAGE",
            Field::Filename => "FILENAME",
            Field::DataName => "DATA_NAME",
            Field::TableName => "TABLE_NAME",
            Field::TableData => "TABLE_DATA",
            Field::ItemCount => "ITEM_COUNT",
            Field::VoltageSorted => "VOLTAGE_SORTED",
        }
    }

    pub fn from_name(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.name() == name)
    }
}

/// Pre-rendered text for each field, consumed by [`render_str`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderContext {
    fields: BTreeMap<Field, String>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything the stock template needs for one generated table.
    pub fn for_table(config: &GenerateConfig, table: &Table, summary: &Summary) -> Result<Self> {
        let mut ctx = Self::new();
        ctx.set(Field::MinimumTemperature, summary.min_index)
            .set(Field::MaximumTemperature, summary.max_index)
            .set(Field::MinimumVoltage, summary.min_value)
            .set(Field::MaximumVoltage, summary.max_value)
            .set(Field::Filename, &config.name)
            .set(Field::DataName, config.data_name())
            .set(Field::TableName, config.table_name())
            .set(Field::ItemCount, summary.items)
            .set(Field::VoltageSorted, summary.value_sorted)
            .set(Field::TableData, serialize_table(table, config.linewidth)?);
        Ok(ctx)
    }

    pub fn set(&mut self, field: Field, value: impl ToString) -> &mut Self {
        self.fields.insert(field, value.to_string());
        self
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    /// Look up a field by its template name.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        Field::from_name(name).and_then(|f| self.get(f))
    }
}

/// Emit one `{.t=<index>,.uv=<value>},` record per entry in index order, starting
/// a new tab-indented line before every index that is a multiple of `linewidth`.
pub fn serialize_table(table: &Table, linewidth: u32) -> Result<String> {
    if linewidth == 0 {
        bail!("linewidth must be at least 1");
    }
    let width = i64::from(linewidth);
    let mut out = String::with_capacity(table.len() * 20);
    for (&t, &uv) in table {
        if t % width == 0 {
            out.push_str("\n\t");
        }
        write!(&mut out, "{{.t={},.uv={}}},", t, uv)?;
    }
    Ok(out)
}

/// Replace every recognized `{FIELD}` in `template`. Unknown tokens stay as they are,
/// and substituted text is not scanned again.
pub fn render_str(template: &str, ctx: &RenderContext) -> Result<String> {
    let re = Regex::new(PLACEHOLDER)?;
    let rendered = re.replace_all(template, |caps: &Captures| {
        let token = &caps[0];
        let key = token.trim_matches(|c| c == '{' || c == '}');
        match ctx.lookup(key) {
            Some(value) => value.to_string(),
            None => {
                trace!(token, "left unrecognized placeholder");
                token.to_string()
            }
        }
    });
    Ok(rendered.into_owned())
}

/// Read the template at `path` and render it.
#[instrument(level = "debug", skip(path, ctx), fields(path = %path.as_ref().display()))]
pub fn render_template<P: AsRef<Path>>(path: P, ctx: &RenderContext) -> Result<String> {
    let path = path.as_ref();
    let template = fs::read_to_string(path)
        .with_context(|| format!("Failed to read template {:?}", path))?;
    render_str(&template, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(i64, i64)]) -> Table {
        entries.iter().copied().collect()
    }

    #[test]
    fn test_field_names() {
        for f in Field::ALL {
            assert_eq!(Field::from_name(f.name()), Some(f));
        }
        assert_eq!(Field::from_name("table_data"), None);
        assert_eq!(Field::from_name("NOPE"), None);
    }

    #[test]
    fn test_serialize_breaks_before_multiples() -> Result<()> {
        let t = table(&[(-1, -39), (0, 0), (1, 39), (2, 79), (3, 119), (4, 158)]);
        assert_eq!(
            serialize_table(&t, 2)?,
            "{.t=-1,.uv=-39},\n\t{.t=0,.uv=0},{.t=1,.uv=39},\n\t{.t=2,.uv=79},{.t=3,.uv=119},\n\t{.t=4,.uv=158},"
        );
        Ok(())
    }

    #[test]
    fn test_serialize_negative_multiples_break_too() -> Result<()> {
        let t = table(&[(-11, -1), (-10, 0), (-9, 1)]);
        assert_eq!(
            serialize_table(&t, 10)?,
            "{.t=-11,.uv=-1},\n\t{.t=-10,.uv=0},{.t=-9,.uv=1},"
        );
        Ok(())
    }

    #[test]
    fn test_serialize_line_break_count() -> Result<()> {
        let t: Table = (0..35).map(|i| (i, i * 10)).collect();
        let text = serialize_table(&t, 10)?;
        assert_eq!(text.matches("\n\t").count(), 4);
        for line in text.split("\n\t").skip(1) {
            assert!(line.starts_with("{.t=") && line.contains("0,.uv="));
        }
        Ok(())
    }

    #[test]
    fn test_serialize_rejects_zero_width() {
        assert!(serialize_table(&table(&[(0, 0)]), 0).is_err());
    }

    #[test]
    fn test_render_substitutes_known_fields() -> Result<()> {
        let mut ctx = RenderContext::new();
        ctx.set(Field::Filename, "type_k")
            .set(Field::ItemCount, 3)
            .set(Field::VoltageSorted, false);
        let out = render_str(
            "name = \"{FILENAME}\" [{ITEM_COUNT}] {FILENAME}\n.uv_sorted = {VOLTAGE_SORTED},\n",
            &ctx,
        )?;
        assert_eq!(
            out,
            "name = \"type_k\" [3] type_k\n.uv_sorted = false,\n"
        );
        Ok(())
    }

    #[test]
    fn test_render_leaves_unknown_tokens() -> Result<()> {
        let mut ctx = RenderContext::new();
        ctx.set(Field::TableName, "_k");
        let template = "struct tc_table {TABLE_NAME} = {\n    {UNKNOWN} {TABLE_DATA}\n};";
        let out = render_str(template, &ctx)?;
        assert_eq!(out, "struct tc_table _k = {\n    {UNKNOWN} {TABLE_DATA}\n};");
        Ok(())
    }

    #[test]
    fn test_render_does_not_rescan_substitutions() -> Result<()> {
        let mut ctx = RenderContext::new();
        ctx.set(Field::TableData, "{FILENAME}")
            .set(Field::Filename, "k");
        assert_eq!(render_str("{TABLE_DATA}", &ctx)?, "{FILENAME}");
        Ok(())
    }

    #[test]
    fn test_render_template_missing_file() {
        assert!(render_template("no/such/template.c", &RenderContext::new()).is_err());
    }
}
