//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

use crate::plot::{parse_column_list, SaveTargets};

/// Print descriptive statistics for a CSV file and optionally chart it.
#[derive(Parser, Debug)]
#[command(name = "csv-glimpse")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// CSV file to analyse
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Write the numeric summary to this CSV file
    #[arg(long, value_name = "PATH")]
    pub save: Option<PathBuf>,

    /// Comma-separated columns to draw histograms for (also draws the means chart)
    #[arg(long, value_name = "COLUMNS")]
    pub plot: Option<String>,

    /// Save charts as PNG files instead of opening a window
    #[arg(long)]
    pub saveplot: bool,

    /// Output path of the column-means chart
    #[arg(long, value_name = "PATH", default_value = "plot_means.png")]
    pub plot_out: PathBuf,

    /// Directory for `<column>_hist.png` files
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub plot_dir: PathBuf,

    /// Number of rows to preview before the overview (0 disables)
    #[arg(long, value_name = "N", default_value_t = 5)]
    pub head: usize,
}

impl Cli {
    /// Requested plot columns, or `None` when plotting was not asked for.
    pub fn plot_columns(&self) -> Option<Vec<String>> {
        self.plot.as_deref().map(parse_column_list)
    }

    pub fn save_targets(&self) -> SaveTargets {
        SaveTargets {
            hist_dir: self.plot_dir.clone(),
            means_path: self.plot_out.clone(),
        }
    }
}
