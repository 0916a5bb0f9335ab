use anyhow::anyhow;
use eframe::egui::{self, Color32, RichText, ScrollArea};

use crate::color::generate_palette;
use crate::plot::ChartSet;
use crate::ui::charts;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct ChartApp {
    charts: ChartSet,
    hist_colors: Vec<Color32>,
    mean_colors: Vec<Color32>,
}

impl ChartApp {
    pub fn new(charts: ChartSet) -> Self {
        Self {
            hist_colors: generate_palette(charts.histograms.len()),
            mean_colors: generate_palette(charts.means.len()),
            charts,
        }
    }
}

impl eframe::App for ChartApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: skipped requests ----
        if !self.charts.skipped.is_empty() {
            egui::TopBottomPanel::top("skipped").show(ctx, |ui| {
                for (name, reason) in &self.charts.skipped {
                    ui.label(
                        RichText::new(format!("Skipped '{name}': {reason}")).color(Color32::RED),
                    );
                }
            });
        }

        // ---- Central panel: one chart after another ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    for (hist, color) in self.charts.histograms.iter().zip(&self.hist_colors) {
                        charts::histogram_plot(ui, hist, *color);
                        ui.separator();
                    }
                    if !self.charts.means.is_empty() {
                        charts::means_plot(ui, &self.charts.means, &self.mean_colors);
                    }
                });
        });
    }
}

/// Open a native window with every chart. Blocks until the user closes it.
pub fn show(charts: ChartSet) -> anyhow::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 800.0])
            .with_min_inner_size([500.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "csv-glimpse – charts",
        options,
        Box::new(move |_cc| Ok(Box::new(ChartApp::new(charts)))),
    )
    .map_err(|e| anyhow!("chart window failed: {e}"))
}
