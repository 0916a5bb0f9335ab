/// Plotting: decide which charts a request produces, then either save them
/// as PNG files or show them in a window.
///
/// ```text
///   Table + requested columns
///        │
///        ▼
///   ┌───────────┐
///   │ ChartSet  │  histograms, column means, skipped requests
///   └───────────┘
///        │
///   ┌────┴─────┐
///   ▼          ▼
/// render     app (eframe window, blocks until closed)
/// (.png)
/// ```

pub mod histogram;
pub mod render;

use std::fmt;
use std::path::PathBuf;

use crate::color::{generate_palette, to_pixel};
use crate::data::model::{DType, Table};
use crate::data::summary::ColumnStats;

use histogram::{Histogram, HISTOGRAM_BINS};
use render::ChartFont;

// ---------------------------------------------------------------------------
// Chart plan
// ---------------------------------------------------------------------------

/// Why a requested column produced no histogram.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    NotFound,
    NotNumeric(DType),
    NoValues,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotFound => write!(f, "no such column"),
            SkipReason::NotNumeric(dtype) => write!(f, "column is {dtype}, not numeric"),
            SkipReason::NoValues => write!(f, "column has no finite values"),
        }
    }
}

/// One bar of the aggregate chart.
#[derive(Debug, Clone, PartialEq)]
pub struct MeanBar {
    pub column: String,
    pub mean: f64,
}

/// Everything a plot request will draw.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartSet {
    pub histograms: Vec<Histogram>,
    pub means: Vec<MeanBar>,
    pub skipped: Vec<(String, SkipReason)>,
}

impl ChartSet {
    /// Build histograms for the requested numeric columns and the mean bar
    /// of every numeric column. Unusable requests are recorded and logged.
    pub fn plan(table: &Table, requested: &[String]) -> Self {
        let mut charts = ChartSet::default();

        if table.numeric_columns().next().is_none() {
            log::warn!("No numeric columns to plot; skipping charts");
            return charts;
        }

        for name in requested {
            let outcome = match table.column(name) {
                None => Err(SkipReason::NotFound),
                Some(col) if !col.is_numeric() => Err(SkipReason::NotNumeric(col.dtype)),
                Some(col) => Histogram::from_values(name, &col.numeric_values(), HISTOGRAM_BINS)
                    .ok_or(SkipReason::NoValues),
            };
            match outcome {
                Ok(hist) => {
                    log::debug!("Histogram for '{name}' bins {} values", hist.total());
                    charts.histograms.push(hist);
                }
                Err(reason) => {
                    log::warn!("Skipping plot for '{name}': {reason}");
                    charts.skipped.push((name.clone(), reason));
                }
            }
        }

        for col in table.numeric_columns() {
            match ColumnStats::compute(col).mean.filter(|m| m.is_finite()) {
                Some(mean) => charts.means.push(MeanBar {
                    column: col.name.clone(),
                    mean,
                }),
                None => log::warn!("Column '{}' has no mean; left out of the means chart", col.name),
            }
        }

        charts
    }

    pub fn is_empty(&self) -> bool {
        self.histograms.is_empty() && self.means.is_empty()
    }
}

/// Split a `--plot` argument into trimmed, non-empty column names.
pub fn parse_column_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Where saved charts go.
#[derive(Debug, Clone)]
pub struct SaveTargets {
    /// Directory receiving `<column>_hist.png` files.
    pub hist_dir: PathBuf,
    /// Path of the means bar chart.
    pub means_path: PathBuf,
}

impl SaveTargets {
    pub fn histogram_path(&self, column: &str) -> PathBuf {
        let safe: String = column
            .chars()
            .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
            .collect();
        self.hist_dir.join(format!("{safe}_hist.png"))
    }
}

/// Result of saving a [`ChartSet`].
#[derive(Debug, Default)]
pub struct SaveReport {
    pub written: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, anyhow::Error)>,
}

/// Save every chart as a PNG. A failed image is reported and the rest are
/// still attempted.
pub fn save_charts(charts: &ChartSet, targets: &SaveTargets) -> SaveReport {
    let mut report = SaveReport::default();
    let mut record = |path: PathBuf, result: anyhow::Result<()>| match result {
        Ok(()) => {
            log::info!("Wrote {}", path.display());
            report.written.push(path);
        }
        Err(e) => {
            log::error!("Failed to write {}: {e:#}", path.display());
            report.failed.push((path, e));
        }
    };

    let mut paths: Vec<PathBuf> = charts
        .histograms
        .iter()
        .map(|h| targets.histogram_path(&h.column))
        .collect();
    if !charts.means.is_empty() {
        paths.push(targets.means_path.clone());
    }

    let font = match ChartFont::load() {
        Ok(font) => font,
        Err(e) => {
            for path in paths {
                record(path, Err(anyhow::anyhow!("{e:#}")));
            }
            return report;
        }
    };

    let colors = generate_palette(charts.histograms.len());
    for ((hist, color), path) in charts.histograms.iter().zip(colors).zip(&paths) {
        let result = render::save_histogram(hist, to_pixel(color), &font, path);
        record(path.clone(), result);
    }

    if !charts.means.is_empty() {
        let path = targets.means_path.clone();
        let result = render::save_means(&charts.means, &font, &path);
        record(path, result);
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::read_csv;
    use pretty_assertions::assert_eq;

    fn table(text: &str) -> Table {
        read_csv(text.as_bytes()).unwrap()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_column_list() {
        assert_eq!(parse_column_list(" a, b ,,c"), names(&["a", "b", "c"]));
        assert!(parse_column_list("").is_empty());
    }

    #[test]
    fn test_plan_skips_unusable_columns() {
        let t = table("sales,region,empty\n1,n,\n2,s,\n");
        let charts = ChartSet::plan(&t, &names(&["sales", "region", "ghost", "empty"]));

        assert_eq!(charts.histograms.len(), 1);
        assert_eq!(charts.histograms[0].column, "sales");
        assert_eq!(
            charts.skipped,
            vec![
                ("region".to_string(), SkipReason::NotNumeric(DType::Object)),
                ("ghost".to_string(), SkipReason::NotFound),
                ("empty".to_string(), SkipReason::NoValues),
            ]
        );
        assert_eq!(
            charts.means,
            vec![MeanBar {
                column: "sales".into(),
                mean: 1.5
            }]
        );
    }

    #[test]
    fn test_plan_without_numeric_columns_is_empty() {
        let t = table("region\nnorth\n");
        let charts = ChartSet::plan(&t, &names(&["region"]));
        assert!(charts.is_empty());
    }

    #[test]
    fn test_means_chart_without_valid_requests() {
        let t = table("a,b\n1,2\n3,4\n");
        let charts = ChartSet::plan(&t, &names(&["zzz"]));
        assert!(charts.histograms.is_empty());
        assert_eq!(charts.means.len(), 2);
    }

    #[test]
    fn test_histogram_path_sanitises_separators() {
        let targets = SaveTargets {
            hist_dir: PathBuf::from("out"),
            means_path: PathBuf::from("plot_means.png"),
        };
        assert_eq!(
            targets.histogram_path("a/b"),
            PathBuf::from("out").join("a_b_hist.png")
        );
    }

    #[test]
    fn test_save_charts_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let targets = SaveTargets {
            hist_dir: dir.path().to_path_buf(),
            means_path: dir.path().join("charts/plot_means.png"),
        };
        let t = table("x,y\n1,5\n2,6\n4,7\n");
        let charts = ChartSet::plan(&t, &names(&["x", "nope"]));

        let report = save_charts(&charts, &targets);
        assert!(report.failed.is_empty());
        assert_eq!(report.written.len(), 2);
        assert!(dir.path().join("x_hist.png").exists());
        assert!(dir.path().join("charts/plot_means.png").exists());
        assert!(!dir.path().join("nope_hist.png").exists());
    }

    #[test]
    fn test_save_failure_does_not_stop_other_images() {
        let dir = tempfile::tempdir().unwrap();
        let targets = SaveTargets {
            hist_dir: dir.path().join("missing-dir"),
            means_path: dir.path().join("plot_means.png"),
        };
        let charts = ChartSet::plan(&table("x\n1\n2\n"), &names(&["x"]));

        let report = save_charts(&charts, &targets);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.written, vec![dir.path().join("plot_means.png")]);
    }
}
