// src/parse.rs
use anyhow::{bail, Context, Result};
use std::{collections::BTreeMap, fs, path::Path};
use tracing::{debug, instrument, trace};

/// Factor applied to every tabulated value (millivolts → microvolts).
pub const SCALE: f64 = 1000.0;

/// Temperature index → scaled value. Keys are unique and iterate in ascending order.
pub type Table = BTreeMap<i64, i64>;

/// One line of the reference grid, before scaling.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// Leading integer of the line.
    pub base: i64,
    /// Remaining tokens, in line order.
    pub values: Vec<f64>,
}

/// A scaled value paired with the index it lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub index: i64,
    pub value: i64,
}

/// Multiply by [`SCALE`] and truncate toward zero.
pub fn scale(value: f64) -> i64 {
    (SCALE * value) as i64
}

impl RawRow {
    /// Expand the row into samples.
    ///
    /// The value at position `p` lands on `base + p`, unless its scaled value is
    /// negative, in which case it lands on `base - p`. Rows that straddle the
    /// zero point therefore fan out in both directions from the same base.
    /// Fails if an index falls outside the `i64` range.
    pub fn samples(&self) -> Result<Vec<Sample>> {
        let mut out = Vec::with_capacity(self.values.len());
        for (p, &v) in self.values.iter().enumerate() {
            let value = scale(v);
            let offset = p as i64;
            let (index, sign) = if value < 0 {
                (self.base.checked_sub(offset), '-')
            } else {
                (self.base.checked_add(offset), '+')
            };
            let Some(index) = index else {
                bail!("index {} {} {} overflows i64", self.base, sign, p);
            };
            out.push(Sample { index, value });
        }
        Ok(out)
    }
}

/// Parse one line of the grid. Every line, blank ones included, must start with a base index.
pub fn parse_line(line: &str) -> Result<RawRow> {
    let mut tokens = line.split_whitespace();
    let Some(first) = tokens.next() else {
        bail!("blank line has no base index");
    };
    let base: i64 = first
        .parse()
        .with_context(|| format!("invalid base index {:?}", first))?;

    let mut values = Vec::new();
    for tok in tokens {
        let v: f64 = tok
            .parse()
            .with_context(|| format!("invalid value {:?}", tok))?;
        if !v.is_finite() {
            bail!("non-finite value {:?}", tok);
        }
        values.push(v);
    }
    Ok(RawRow { base, values })
}

/// Parse a whole grid into a [`Table`]. A later sample on an already used index
/// replaces the earlier one.
pub fn parse_str(contents: &str) -> Result<Table> {
    let mut table = Table::new();
    for (lineno, line) in contents.lines().enumerate() {
        let samples = parse_line(line)
            .and_then(|row| row.samples())
            .with_context(|| format!("line {}", lineno + 1))?;
        for sample in samples {
            if let Some(prev) = table.insert(sample.index, sample.value) {
                trace!(index = sample.index, prev, value = sample.value, "overwrote sample");
            }
        }
    }
    Ok(table)
}

/// Read and parse the grid stored at `path`.
#[instrument(level = "debug", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_table<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    let contents =
        fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    let table = parse_str(&contents).with_context(|| format!("Failed to parse {:?}", path))?;
    debug!(items = table.len(), "loaded table");
    Ok(table)
}
