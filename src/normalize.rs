// src/normalize.rs
use anyhow::{bail, Result};
use serde::Serialize;
use std::fmt;
use tracing::debug;

use crate::parse::Table;

/// Bounds and ordering facts about a finished [`Table`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub items: usize,
    pub min_index: i64,
    pub max_index: i64,
    pub min_value: i64,
    pub max_value: i64,
    /// Values are non-decreasing when walked in index order.
    pub value_sorted: bool,
    pub diagnostics: Vec<Diagnostic>,
}

/// Non-fatal findings. Generation always proceeds; the caller decides how to surface them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Ordering by index does not also order the values.
    NotValueSorted,
    /// Index does not fit the `int16_t t` member of `struct tc_table_data`.
    TemperatureOutOfRange { index: i64 },
    /// Value does not fit the `int32_t uv` member of `struct tc_table_data`.
    VoltageOutOfRange { index: i64, value: i64 },
    /// Item count does not fit the `uint16_t items` member of `struct tc_table`.
    TooManyItems { count: usize },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::NotValueSorted => write!(f, "Data is not voltage sorted"),
            Diagnostic::TemperatureOutOfRange { index } => {
                write!(f, "temperature {} does not fit in int16_t", index)
            }
            Diagnostic::VoltageOutOfRange { index, value } => {
                write!(f, "voltage {} at {} does not fit in int32_t", value, index)
            }
            Diagnostic::TooManyItems { count } => {
                write!(f, "{} items do not fit in uint16_t", count)
            }
        }
    }
}

/// True when `values` is already in ascending order, i.e. sorting it would not
/// change it. Empty and single-element slices are sorted.
pub fn is_value_sorted(values: &[i64]) -> bool {
    values.windows(2).all(|w| w[0] <= w[1])
}

/// Derive bounds and diagnostics from `table`. Fails on an empty table, whose
/// bounds are undefined.
pub fn normalize(table: &Table) -> Result<Summary> {
    let (Some((&min_index, _)), Some((&max_index, _))) =
        (table.first_key_value(), table.last_key_value())
    else {
        bail!("table is empty; no samples to generate from");
    };

    let values: Vec<i64> = table.values().copied().collect();
    let value_sorted = is_value_sorted(&values);
    let min_value = values.iter().copied().min().unwrap_or_default();
    let max_value = values.iter().copied().max().unwrap_or_default();

    let mut diagnostics = Vec::new();
    if !value_sorted {
        diagnostics.push(Diagnostic::NotValueSorted);
    }
    for (&index, &value) in table {
        if i16::try_from(index).is_err() {
            diagnostics.push(Diagnostic::TemperatureOutOfRange { index });
        }
        if i32::try_from(value).is_err() {
            diagnostics.push(Diagnostic::VoltageOutOfRange { index, value });
        }
    }
    if u16::try_from(table.len()).is_err() {
        diagnostics.push(Diagnostic::TooManyItems { count: table.len() });
    }

    debug!(
        items = table.len(),
        min_index, max_index, min_value, max_value, value_sorted, "normalized table"
    );

    Ok(Summary {
        items: table.len(),
        min_index,
        max_index,
        min_value,
        max_value,
        value_sorted,
        diagnostics,
    })
}
