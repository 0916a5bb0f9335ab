use std::io::{self, Write};

use crate::data::model::Table;
use crate::data::summary::NumericSummary;

// ---------------------------------------------------------------------------
// Text layout helpers
// ---------------------------------------------------------------------------

/// Render rows as a right-aligned text grid; the first row is the header.
fn write_grid<W: Write>(out: &mut W, rows: &[Vec<String>]) -> io::Result<()> {
    let n_cols = rows.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..n_cols)
        .map(|c| {
            rows.iter()
                .filter_map(|r| r.get(c))
                .map(|s| s.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    for row in rows {
        let line = row
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{cell:>w$}"))
            .collect::<Vec<_>>()
            .join("  ");
        writeln!(out, "{}", line.trim_end())?;
    }
    Ok(())
}

/// Statistic rounded for display; undefined values print as `NaN`.
pub fn format_stat(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.4}"),
        None => "NaN".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Print the header and the first `n` rows, prefixed with the row index.
pub fn preview<W: Write>(out: &mut W, table: &Table, n: usize) -> io::Result<()> {
    writeln!(out, "Preview of data:")?;
    if table.n_cols() == 0 {
        writeln!(out, "(empty table)")?;
        return Ok(());
    }

    let mut rows = Vec::new();
    let mut header = vec![String::new()];
    header.extend(table.columns.iter().map(|c| c.name.clone()));
    rows.push(header);

    for i in 0..n.min(table.n_rows()) {
        let Some(cells) = table.row(i) else {
            break;
        };
        let mut row = vec![i.to_string()];
        row.extend(cells.iter().map(|v| v.to_string()));
        rows.push(row);
    }
    write_grid(out, &rows)
}

/// Dimensions, per-column dtypes, and per-column missing counts.
pub fn overview<W: Write>(out: &mut W, table: &Table) -> io::Result<()> {
    writeln!(out, "Rows: {}", table.n_rows())?;
    writeln!(out, "Columns: {}", table.n_cols())?;

    writeln!(out)?;
    writeln!(out, "Column types:")?;
    let name_width = table
        .columns
        .iter()
        .map(|c| c.name.chars().count())
        .max()
        .unwrap_or(0);
    for col in &table.columns {
        writeln!(out, "  {:<name_width$}  {}", col.name, col.dtype)?;
    }

    writeln!(out)?;
    writeln!(out, "Missing values per column:")?;
    for col in &table.columns {
        writeln!(out, "  {:<name_width$}  {}", col.name, col.missing_count())?;
    }
    Ok(())
}

pub fn print_summary<W: Write>(out: &mut W, summary: &NumericSummary) -> io::Result<()> {
    writeln!(out, "Numeric summary:")?;
    if summary.is_empty() {
        writeln!(out, "No numeric columns found.")?;
        return Ok(());
    }

    let mut rows = vec![["", "count", "mean", "median", "std", "min", "max"]
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()];
    for s in &summary.columns {
        rows.push(vec![
            s.column.clone(),
            s.count.to_string(),
            format_stat(s.mean),
            format_stat(s.median),
            format_stat(s.std),
            format_stat(s.min),
            format_stat(s.max),
        ]);
    }
    write_grid(out, &rows)
}
