mod app;
mod cli;
mod color;
mod data;
mod error;
mod plot;
mod report;
mod ui;

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use cli::Cli;
use data::loader::load_file;
use data::summary::{save_summary, NumericSummary, SaveOutcome};
use plot::{save_charts, ChartSet};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Run the whole pipeline. Returns `Ok(false)` when a step after loading
/// failed; the remaining steps still ran.
fn run(cli: &Cli) -> Result<bool> {
    let table = load_file(&cli.input)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "Loaded {}", cli.input.display())?;
    writeln!(out)?;
    if cli.head > 0 {
        report::preview(&mut out, &table, cli.head)?;
        writeln!(out)?;
    }
    report::overview(&mut out, &table)?;
    writeln!(out)?;

    let summary = NumericSummary::describe(&table);
    report::print_summary(&mut out, &summary)?;
    out.flush().context("flushing report")?;

    let mut ok = true;

    if let Some(path) = &cli.save {
        match save_summary(&summary, path) {
            Ok(SaveOutcome::Written) => writeln!(out, "\nSummary saved to {}", path.display())?,
            Ok(SaveOutcome::Skipped) => writeln!(out, "\nNo numeric summary to save.")?,
            Err(e) => {
                log::error!("Could not save summary: {e:#}");
                eprintln!("Error: could not save summary: {e:#}");
                ok = false;
            }
        }
    }

    if let Some(columns) = cli.plot_columns() {
        let charts = ChartSet::plan(&table, &columns);
        if charts.is_empty() {
            writeln!(out, "\nNothing to plot.")?;
        } else if cli.saveplot {
            let saved = save_charts(&charts, &cli.save_targets());
            for path in &saved.written {
                writeln!(out, "Saved {}", path.display())?;
            }
            for (path, e) in &saved.failed {
                eprintln!("Error: could not save {}: {e:#}", path.display());
            }
            ok &= saved.failed.is_empty();
        } else {
            out.flush()?;
            if let Err(e) = app::show(charts) {
                log::error!("{e:#}");
                eprintln!("Error: {e:#}");
                ok = false;
            }
        }
    }

    Ok(ok)
}
