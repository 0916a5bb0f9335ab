use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::model::{Column, Table};

// ---------------------------------------------------------------------------
// Per-column statistics
// ---------------------------------------------------------------------------

/// The six summary statistics of one numeric column.
///
/// Undefined values are `None`: everything but `count` for an all-missing
/// column, and `std` for a column with a single value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl ColumnStats {
    pub fn compute(column: &Column) -> Self {
        let mut vals = column.numeric_values();
        let count = vals.len();
        if count == 0 {
            return ColumnStats {
                column: column.name.clone(),
                count,
                mean: None,
                median: None,
                std: None,
                min: None,
                max: None,
            };
        }

        let mean = vals.iter().sum::<f64>() / count as f64;
        vals.sort_by(f64::total_cmp);
        let median = if count % 2 == 0 {
            (vals[count / 2 - 1] + vals[count / 2]) / 2.0
        } else {
            vals[count / 2]
        };
        let std = (count > 1).then(|| {
            let ss = vals.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
            (ss / (count - 1) as f64).sqrt()
        });

        ColumnStats {
            column: column.name.clone(),
            count,
            mean: Some(mean),
            median: Some(median),
            std,
            min: vals.first().copied(),
            max: vals.last().copied(),
        }
    }
}

// ---------------------------------------------------------------------------
// NumericSummary
// ---------------------------------------------------------------------------

/// Statistics for every numeric column, in table order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumericSummary {
    pub columns: Vec<ColumnStats>,
}

impl NumericSummary {
    pub fn describe(table: &Table) -> Self {
        NumericSummary {
            columns: table.numeric_columns().map(ColumnStats::compute).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[cfg(test)]
    pub fn get(&self, column: &str) -> Option<&ColumnStats> {
        self.columns.iter().find(|s| s.column == column)
    }
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

/// Outcome of [`save_summary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Written,
    /// Nothing numeric to save; no file was created.
    Skipped,
}

/// Write the summary as CSV, one row per numeric column, at full precision.
/// Missing parent directories are created.
pub fn save_summary(summary: &NumericSummary, path: &Path) -> Result<SaveOutcome> {
    if summary.is_empty() {
        return Ok(SaveOutcome::Skipped);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating summary file {}", path.display()))?;
    for stats in &summary.columns {
        writer
            .serialize(stats)
            .with_context(|| format!("writing summary row for '{}'", stats.column))?;
    }
    writer.flush().context("flushing summary file")?;

    log::info!("Saved summary of {} columns to {}", summary.len(), path.display());
    Ok(SaveOutcome::Written)
}

/// Read back a file written by [`save_summary`].
#[cfg(test)]
pub fn load_summary(path: &Path) -> Result<NumericSummary> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening summary file {}", path.display()))?;
    let columns = reader
        .deserialize()
        .enumerate()
        .map(|(i, row)| row.with_context(|| format!("summary row {i}")))
        .collect::<Result<Vec<ColumnStats>>>()?;
    Ok(NumericSummary { columns })
}
