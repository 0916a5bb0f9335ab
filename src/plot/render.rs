use std::fs;
use std::path::Path;

use ab_glyph::{point, Font, FontVec, PxScale, ScaleFont};
use anyhow::{anyhow, Context, Result};
use eframe::egui::FontDefinitions;
use image::{Rgb, RgbImage};

use crate::color::{generate_palette, to_pixel};

use super::histogram::Histogram;
use super::MeanBar;

pub const WIDTH: u32 = 800;
pub const HEIGHT: u32 = 500;

const MARGIN_LEFT: u32 = 80;
const MARGIN_RIGHT: u32 = 20;
const MARGIN_TOP: u32 = 44;
const MARGIN_BOTTOM: u32 = 50;
const Y_TICKS: u32 = 5;
/// Histogram edges labelled on the x axis, every this many bins.
const EDGE_LABEL_STEP: usize = 5;

const TITLE_SIZE: f32 = 20.0;
const LABEL_SIZE: f32 = 13.0;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([40, 40, 40]);
const GRID: Rgb<u8> = Rgb([225, 225, 225]);

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Font used for titles and axis labels, taken from egui's bundled fonts.
pub struct ChartFont {
    font: FontVec,
}

impl ChartFont {
    pub fn load() -> Result<Self> {
        let defs = FontDefinitions::default();
        let data = defs
            .font_data
            .get("Ubuntu-Light")
            .or_else(|| defs.font_data.values().next())
            .context("no built-in font available")?;
        let font = FontVec::try_from_vec_and_index(data.font.to_vec(), data.index)
            .map_err(|e| anyhow!("loading chart font: {e}"))?;
        Ok(Self { font })
    }

    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        let scaled = self.font.as_scaled(PxScale::from(size));
        text.chars()
            .map(|c| scaled.h_advance(scaled.glyph_id(c)))
            .sum()
    }

    /// Shorten `text` with a `..` suffix until it fits in `max_width` pixels.
    pub fn fit_text(&self, text: &str, size: f32, max_width: f32) -> String {
        if self.text_width(text, size) <= max_width {
            return text.to_string();
        }
        let mut chars: Vec<char> = text.chars().collect();
        while !chars.is_empty() {
            chars.pop();
            let candidate: String = chars.iter().chain(['.', '.'].iter()).collect();
            if self.text_width(&candidate, size) <= max_width {
                return candidate;
            }
        }
        String::new()
    }

    /// Draw `text` with its top edge at `y`; `x` is the left, centre or right
    /// anchor depending on `align`.
    pub fn draw(
        &self,
        img: &mut RgbImage,
        text: &str,
        (x, y): (f32, f32),
        size: f32,
        align: Align,
        color: Rgb<u8>,
    ) {
        let scaled = self.font.as_scaled(PxScale::from(size));
        let width = self.text_width(text, size);
        let mut caret = match align {
            Align::Left => x,
            Align::Center => x - width / 2.0,
            Align::Right => x - width,
        };
        let baseline = y + scaled.ascent();

        for c in text.chars() {
            let id = scaled.glyph_id(c);
            let glyph = id.with_scale_and_position(scaled.scale(), point(caret, baseline));
            caret += scaled.h_advance(id);

            let Some(outlined) = self.font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let px = bounds.min.x as i64 + gx as i64;
                let py = bounds.min.y as i64 + gy as i64;
                if px < 0 || py < 0 || px >= img.width() as i64 || py >= img.height() as i64 {
                    return;
                }
                blend(img.get_pixel_mut(px as u32, py as u32), color, coverage);
            });
        }
    }
}

fn blend(pixel: &mut Rgb<u8>, color: Rgb<u8>, coverage: f32) {
    let c = coverage.clamp(0.0, 1.0);
    for (dst, src) in pixel.0.iter_mut().zip(color.0) {
        *dst = (*dst as f32 * (1.0 - c) + src as f32 * c).round() as u8;
    }
}

/// Axis label for a value: integers as such, otherwise a few significant digits.
pub fn format_tick(v: f64) -> String {
    let v = if v.abs() < 1e-12 { 0.0 } else { v };
    let a = v.abs();
    if a >= 1e6 {
        format!("{v:.2e}")
    } else if v.fract() == 0.0 || a >= 1000.0 {
        format!("{v:.0}")
    } else if a >= 1.0 {
        format!("{v:.2}")
    } else {
        format!("{v:.3}")
    }
}

// ---------------------------------------------------------------------------
// Bar layout
// ---------------------------------------------------------------------------

/// Pixel rectangle, right/bottom exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

/// Vertical span of the value axis, always including zero.
fn value_range(values: &[f64]) -> (f64, f64) {
    let lo = values.iter().copied().fold(0.0, f64::min);
    let hi = values.iter().copied().fold(0.0, f64::max);
    if hi > lo {
        (lo, hi)
    } else {
        (0.0, 1.0)
    }
}

fn slot_width(n: usize) -> f64 {
    (WIDTH - MARGIN_LEFT - MARGIN_RIGHT) as f64 / n.max(1) as f64
}

/// Place one bar per value in equal slots across the plot area.
/// `fill` is the fraction of each slot the bar occupies.
pub fn layout_bars(values: &[f64], fill: f64) -> Vec<Rect> {
    if values.is_empty() {
        return Vec::new();
    }
    let plot_h = (HEIGHT - MARGIN_TOP - MARGIN_BOTTOM) as f64;
    let slot = slot_width(values.len());
    let (lo, hi) = value_range(values);
    let to_y = |v: f64| MARGIN_TOP as f64 + (hi - v) / (hi - lo) * plot_h;
    let zero_y = to_y(0.0);

    values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let pad = slot * (1.0 - fill) / 2.0;
            let left = MARGIN_LEFT as f64 + slot * i as f64 + pad;
            let right = left + slot * fill;
            let top = to_y(v).min(zero_y);
            let bottom = to_y(v).max(zero_y);
            Rect {
                x0: left.round() as u32,
                y0: top.round() as u32,
                x1: (right.round() as u32).max(left.round() as u32 + 1),
                y1: bottom.round() as u32,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Raster drawing
// ---------------------------------------------------------------------------

fn fill_rect(img: &mut RgbImage, rect: Rect, color: Rgb<u8>) {
    for y in rect.y0..rect.y1.min(img.height()) {
        for x in rect.x0..rect.x1.min(img.width()) {
            img.put_pixel(x, y, color);
        }
    }
}

fn hline(img: &mut RgbImage, y: u32, x0: u32, x1: u32, color: Rgb<u8>) {
    fill_rect(img, Rect { x0, y0: y, x1, y1: y + 1 }, color);
}

fn vline(img: &mut RgbImage, x: u32, y0: u32, y1: u32, color: Rgb<u8>) {
    fill_rect(img, Rect { x0: x, y0, x1: x + 1, y1 }, color);
}

/// Draw a bar chart on a blank canvas: grid, bars, then axes on top.
pub fn render_bars(values: &[f64], colors: &[Rgb<u8>], fill: f64) -> RgbImage {
    let mut img = RgbImage::from_pixel(WIDTH, HEIGHT, BACKGROUND);
    let left = MARGIN_LEFT;
    let right = WIDTH - MARGIN_RIGHT;
    let top = MARGIN_TOP;
    let bottom = HEIGHT - MARGIN_BOTTOM;

    for i in 0..=Y_TICKS {
        let y = top + (bottom - top) * i / Y_TICKS;
        hline(&mut img, y, left, right, GRID);
        hline(&mut img, y, left - 5, left, AXIS);
    }

    for (i, rect) in layout_bars(values, fill).into_iter().enumerate() {
        let color = colors.get(i % colors.len().max(1)).copied().unwrap_or(AXIS);
        fill_rect(&mut img, rect, color);
    }

    let (lo, hi) = value_range(values);
    let zero_y = top + ((hi / (hi - lo)) * (bottom - top) as f64).round() as u32;
    hline(&mut img, zero_y, left, right, AXIS);
    vline(&mut img, left, top, bottom + 1, AXIS);
    img
}

/// A bar chart with its text.
pub struct BarChartSpec<'a> {
    pub title: &'a str,
    pub values: Vec<f64>,
    pub colors: Vec<Rgb<u8>>,
    pub fill: f64,
    /// Labels under the x axis; the position is measured in bar slots
    /// from the left edge (`i + 0.5` is the centre of bar `i`).
    pub x_labels: Vec<(f64, String)>,
}

/// Bars plus title, y-axis tick values and x-axis labels.
pub fn render_chart(spec: &BarChartSpec<'_>, font: &ChartFont) -> RgbImage {
    let mut img = render_bars(&spec.values, &spec.colors, spec.fill);
    let top = MARGIN_TOP;
    let bottom = HEIGHT - MARGIN_BOTTOM;

    font.draw(
        &mut img,
        spec.title,
        (WIDTH as f32 / 2.0, 10.0),
        TITLE_SIZE,
        Align::Center,
        AXIS,
    );

    let (lo, hi) = value_range(&spec.values);
    for i in 0..=Y_TICKS {
        let y = top + (bottom - top) * i / Y_TICKS;
        let value = hi - (hi - lo) * i as f64 / Y_TICKS as f64;
        font.draw(
            &mut img,
            &format_tick(value),
            ((MARGIN_LEFT - 8) as f32, y as f32 - LABEL_SIZE / 2.0),
            LABEL_SIZE,
            Align::Right,
            AXIS,
        );
    }

    let slot = slot_width(spec.values.len());
    for (pos, label) in &spec.x_labels {
        let x = MARGIN_LEFT as f64 + slot * pos;
        font.draw(
            &mut img,
            label,
            (x as f32, (bottom + 8) as f32),
            LABEL_SIZE,
            Align::Center,
            AXIS,
        );
    }
    img
}

fn write_png(img: &RgbImage, path: &Path) -> Result<()> {
    img.save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("saving image {}", path.display()))
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

/// Histogram titled with its column, touching bars in a single colour and
/// bin edges labelled along the x axis.
pub fn histogram_chart(hist: &Histogram, color: Rgb<u8>, font: &ChartFont) -> RgbImage {
    let x_labels = (0..hist.edges.len())
        .step_by(EDGE_LABEL_STEP)
        .map(|i| (i as f64, format_tick(hist.edges[i])))
        .collect();
    let spec = BarChartSpec {
        title: &hist.column,
        values: hist.counts.iter().map(|&c| c as f64).collect(),
        colors: vec![color],
        fill: 0.96,
        x_labels,
    };
    render_chart(&spec, font)
}

/// Column-means chart, one colour per bar, each bar labelled with its column.
pub fn means_chart(bars: &[MeanBar], font: &ChartFont) -> RgbImage {
    let slot = slot_width(bars.len()) as f32;
    let x_labels = bars
        .iter()
        .enumerate()
        .map(|(i, b)| (i as f64 + 0.5, font.fit_text(&b.column, LABEL_SIZE, slot - 4.0)))
        .collect();
    let spec = BarChartSpec {
        title: "Mean of numeric columns",
        values: bars.iter().map(|b| b.mean).collect(),
        colors: generate_palette(bars.len()).into_iter().map(to_pixel).collect(),
        fill: 0.6,
        x_labels,
    };
    render_chart(&spec, font)
}

pub fn save_histogram(hist: &Histogram, color: Rgb<u8>, font: &ChartFont, path: &Path) -> Result<()> {
    write_png(&histogram_chart(hist, color, font), path)
}

/// Parent directories of `path` are created.
pub fn save_means(bars: &[MeanBar], font: &ChartFont, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    write_png(&means_chart(bars, font), path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn inked(img: &RgbImage, xs: std::ops::Range<u32>, ys: std::ops::Range<u32>) -> usize {
        ys.flat_map(|y| xs.clone().map(move |x| (x, y)))
            .filter(|&(x, y)| *img.get_pixel(x, y) != BACKGROUND)
            .count()
    }

    fn spec(title: &str) -> BarChartSpec<'_> {
        BarChartSpec {
            title,
            values: vec![2.0, 5.0],
            colors: vec![Rgb([0, 0, 200])],
            fill: 0.5,
            x_labels: Vec::new(),
        }
    }

    #[test]
    fn test_layout_scales_to_tallest_bar() {
        let rects = layout_bars(&[1.0, 2.0], 0.5);
        assert_eq!(rects.len(), 2);
        let bottom = HEIGHT - MARGIN_BOTTOM;
        assert_eq!(rects[1].y0, MARGIN_TOP);
        assert_eq!(rects[0].y1, bottom);
        assert_eq!(rects[1].y1, bottom);
        assert!(rects[0].y0 > rects[1].y0);
        assert!(rects[0].x1 <= rects[1].x0);
    }

    #[test]
    fn test_negative_values_hang_below_zero() {
        let rects = layout_bars(&[-1.0, 1.0], 0.5);
        assert_eq!(rects[0].y0, rects[1].y1);
        assert_eq!(rects[0].y1, HEIGHT - MARGIN_BOTTOM);
    }

    #[test]
    fn test_render_paints_bar_colour() {
        let red = Rgb([200, 0, 0]);
        let img = render_bars(&[3.0], &[red], 0.5);
        let rect = layout_bars(&[3.0], 0.5)[0];
        let (cx, cy) = ((rect.x0 + rect.x1) / 2, (rect.y0 + rect.y1) / 2);
        assert_eq!(*img.get_pixel(cx, cy), red);
        assert_eq!(*img.get_pixel(WIDTH - 1, 0), BACKGROUND);
    }

    #[test]
    fn test_title_is_drawn_above_plot_area() {
        let font = ChartFont::load().unwrap();
        let title_band = 0..MARGIN_TOP - 8;

        let untitled = render_chart(&spec(""), &font);
        assert_eq!(inked(&untitled, 0..WIDTH, title_band.clone()), 0);

        let titled = render_chart(&spec("sales"), &font);
        assert!(inked(&titled, 0..WIDTH, title_band) > 0);
    }

    #[test]
    fn test_y_tick_values_are_drawn() {
        let font = ChartFont::load().unwrap();
        let img = render_chart(&spec(""), &font);
        assert!(inked(&img, 0..MARGIN_LEFT - 6, 0..HEIGHT) > 0);
        // Nothing under the x axis without labels.
        assert_eq!(inked(&img, MARGIN_LEFT + 1..WIDTH, HEIGHT - MARGIN_BOTTOM + 2..HEIGHT), 0);
    }

    #[test]
    fn test_means_chart_labels_bars() {
        let font = ChartFont::load().unwrap();
        let bars = vec![
            MeanBar {
                column: "sales".into(),
                mean: 12.5,
            },
            MeanBar {
                column: "units".into(),
                mean: 3.0,
            },
        ];
        let img = means_chart(&bars, &font);
        let below_axis = HEIGHT - MARGIN_BOTTOM + 2..HEIGHT;
        let mid = MARGIN_LEFT + (WIDTH - MARGIN_LEFT - MARGIN_RIGHT) / 2;
        assert!(inked(&img, MARGIN_LEFT..mid, below_axis.clone()) > 0);
        assert!(inked(&img, mid..WIDTH, below_axis) > 0);
    }

    #[test]
    fn test_histogram_labels_bin_edges() {
        let font = ChartFont::load().unwrap();
        let hist = Histogram::from_values("x", &[0.0, 10.0, 20.0], 20).unwrap();
        let img = histogram_chart(&hist, Rgb([0, 0, 200]), &font);
        assert!(inked(&img, MARGIN_LEFT + 1..WIDTH, HEIGHT - MARGIN_BOTTOM + 2..HEIGHT) > 0);
    }

    #[test]
    fn test_fit_text_shortens_long_names() {
        let font = ChartFont::load().unwrap();
        assert_eq!(font.fit_text("abc", LABEL_SIZE, 500.0), "abc");
        let short = font.fit_text("a_really_long_column_name", LABEL_SIZE, 40.0);
        assert!(short.ends_with(".."));
        assert!(font.text_width(&short, LABEL_SIZE) <= 40.0);
    }

    #[test]
    fn test_format_tick() {
        assert_eq!(format_tick(0.0), "0");
        assert_eq!(format_tick(-1e-15), "0");
        assert_eq!(format_tick(12.0), "12");
        assert_eq!(format_tick(2.5), "2.50");
        assert_eq!(format_tick(0.25), "0.250");
        assert_eq!(format_tick(1234.4), "1234");
        assert_eq!(format_tick(2.5e7), "2.50e7");
    }

    #[test]
    fn test_means_chart_is_a_readable_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a/b/plot_means.png");
        let bars = vec![MeanBar {
            column: "sales".into(),
            mean: 12.5,
        }];
        save_means(&bars, &ChartFont::load().unwrap(), &path).unwrap();
        let img = image::open(&path).unwrap();
        assert_eq!((img.width(), img.height()), (WIDTH, HEIGHT));
    }

    #[test]
    fn test_histogram_png_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x_hist.png");
        let hist = Histogram::from_values("x", &[1.0, 2.0, 2.5], 20).unwrap();
        save_histogram(&hist, Rgb([0, 0, 200]), &ChartFont::load().unwrap(), &path).unwrap();
        assert!(path.exists());
    }
}
