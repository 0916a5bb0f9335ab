use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Plot};

use crate::plot::histogram::Histogram;
use crate::plot::MeanBar;

const CHART_HEIGHT: f32 = 260.0;

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// Render one frequency histogram titled with its column name.
pub fn histogram_plot(ui: &mut Ui, hist: &Histogram, color: Color32) {
    ui.heading(&hist.column);

    let bars: Vec<Bar> = (0..hist.counts.len())
        .map(|i| {
            let (mid, width) = hist.bin(i);
            Bar::new(mid, hist.counts[i] as f64).width(width)
        })
        .collect();

    Plot::new(("histogram", hist.column.as_str()))
        .height(CHART_HEIGHT)
        .x_axis_label(hist.column.clone())
        .y_axis_label("Frequency")
        .allow_drag(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(color).name(&hist.column));
        });
}

// ---------------------------------------------------------------------------
// Column means
// ---------------------------------------------------------------------------

/// Render the bar chart of column means, labelling the x axis with column names.
pub fn means_plot(ui: &mut Ui, means: &[MeanBar], colors: &[Color32]) {
    ui.heading("Column means");

    let bars: Vec<Bar> = means
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let color = colors.get(i).copied().unwrap_or(Color32::LIGHT_BLUE);
            Bar::new(i as f64, m.mean)
                .width(0.6)
                .name(&m.column)
                .fill(color)
        })
        .collect();

    let labels: Vec<String> = means.iter().map(|m| m.column.clone()).collect();

    Plot::new("column_means")
        .height(CHART_HEIGHT)
        .y_axis_label("Mean")
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("mean"));
        });
}
