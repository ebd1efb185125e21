use eframe::egui::{self, Color32, RichText, Ui};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, Legend, Line, Plot, PlotPoints, Points,
};

use crate::color::diverging;
use crate::stats::correlation::CorrelationMatrix;
use crate::stats::distribution::{Bin, BoxSummary, LinearFit};

const PLOT_HEIGHT: f32 = 300.0;

/// Axis label for integer grid marks that fall on a category index.
fn category_label(labels: &[String], mark: GridMark) -> String {
    let idx = mark.value.round();
    if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// Bars for each bin; heights are densities when `density` is set, with an
/// optional line through the bin centres.
pub fn histogram(
    ui: &mut Ui,
    id: &str,
    bins: &[Bin],
    x_label: &str,
    density: bool,
    density_line: bool,
    color: Color32,
) {
    let height = |b: &Bin| if density { b.density } else { b.count as f64 };
    let bars: Vec<Bar> = bins
        .iter()
        .map(|b| {
            Bar::new(b.center(), height(b))
                .width(b.width())
                .name(format!("{:.1} – {:.1}: {}", b.lo, b.hi, b.count))
        })
        .collect();

    Plot::new(id)
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .x_axis_label(x_label)
        .y_axis_label(if density { "Density" } else { "Players" })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(color));
            if density && density_line {
                let points: PlotPoints = bins.iter().map(|b| [b.center(), b.density]).collect();
                plot_ui.line(Line::new(points).name("Density").color(Color32::RED).width(2.0));
            }
        });
}

// ---------------------------------------------------------------------------
// Scatter
// ---------------------------------------------------------------------------

/// One coloured series of a scatter plot.
pub struct ScatterSeries {
    pub name: String,
    pub color: Color32,
    pub points: Vec<[f64; 2]>,
}

pub fn scatter(
    ui: &mut Ui,
    id: &str,
    series: Vec<ScatterSeries>,
    trend: Option<LinearFit>,
    x_label: &str,
    y_label: &str,
) {
    let x_range = series
        .iter()
        .flat_map(|s| s.points.iter().map(|p| p[0]))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
            (lo.min(x), hi.max(x))
        });

    Plot::new(id)
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .x_axis_label(x_label)
        .y_axis_label(y_label)
        .show(ui, |plot_ui| {
            for s in series {
                plot_ui.points(
                    Points::new(PlotPoints::from(s.points))
                        .name(s.name)
                        .color(s.color)
                        .radius(2.5),
                );
            }
            if let Some(fit) = trend {
                let (lo, hi) = x_range;
                if lo.is_finite() && hi.is_finite() {
                    let line: PlotPoints = vec![[lo, fit.at(lo)], [hi, fit.at(hi)]].into();
                    plot_ui.line(Line::new(line).name("Trend").color(Color32::RED).width(2.0));
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Season lines
// ---------------------------------------------------------------------------

/// A value per season, drawn as a line with markers. `highlight` marks one
/// season in red.
pub fn season_line(
    ui: &mut Ui,
    id: &str,
    points: &[(String, f64)],
    y_label: &str,
    color: Color32,
    highlight: Option<&str>,
) {
    let labels: Vec<String> = points.iter().map(|(s, _)| s.clone()).collect();
    let coords: Vec<[f64; 2]> = points
        .iter()
        .enumerate()
        .map(|(i, (_, v))| [i as f64, *v])
        .collect();
    let marked: Option<[f64; 2]> = highlight.and_then(|season| {
        points
            .iter()
            .position(|(s, _)| s == season)
            .map(|i| [i as f64, points[i].1])
    });

    Plot::new(id)
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .x_axis_label("Season")
        .y_axis_label(y_label)
        .x_axis_formatter(move |mark, _range| category_label(&labels, mark))
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(coords.clone()))
                    .name(y_label)
                    .color(color)
                    .width(2.0),
            );
            plot_ui.points(Points::new(PlotPoints::from(coords)).color(color).radius(4.0));
            if let Some(p) = marked {
                plot_ui.points(
                    Points::new(PlotPoints::from(vec![p]))
                        .name("Selected season")
                        .color(Color32::RED)
                        .radius(7.0),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Ranked bars
// ---------------------------------------------------------------------------

/// Horizontal bars, first entry on top.
pub fn ranked_bars(ui: &mut Ui, id: &str, entries: &[(String, f64)], x_label: &str, color: Color32) {
    let n = entries.len();
    // first entry gets the highest position so it is drawn at the top
    let labels: Vec<String> = entries.iter().rev().map(|(name, _)| name.clone()).collect();
    let bars: Vec<Bar> = entries
        .iter()
        .enumerate()
        .map(|(i, (name, value))| {
            Bar::new((n - 1 - i) as f64, *value)
                .width(0.7)
                .name(format!("{name}: {value:.2}"))
        })
        .collect();

    Plot::new(id)
        .height(PLOT_HEIGHT)
        .x_axis_label(x_label)
        .y_axis_formatter(move |mark, _range| category_label(&labels, mark))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal().color(color));
        });
}

// ---------------------------------------------------------------------------
// Box plot
// ---------------------------------------------------------------------------

pub fn box_plot(ui: &mut Ui, id: &str, summary: &BoxSummary, label: &str, color: Color32) {
    let spread = BoxSpread::new(
        summary.lower_whisker,
        summary.q1,
        summary.median,
        summary.q3,
        summary.upper_whisker,
    );
    let outliers: Vec<[f64; 2]> = summary.outliers.iter().map(|v| [0.0, *v]).collect();

    Plot::new(id)
        .height(PLOT_HEIGHT)
        .y_axis_label(label)
        .show(ui, |plot_ui| {
            plot_ui.box_plot(
                BoxPlot::new(vec![BoxElem::new(0.0, spread).name(label).box_width(0.5)])
                    .color(color),
            );
            if !outliers.is_empty() {
                plot_ui.points(
                    Points::new(PlotPoints::from(outliers))
                        .name("Outliers")
                        .color(color)
                        .radius(3.0),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Correlation heatmap
// ---------------------------------------------------------------------------

/// Coloured grid of coefficients. With `lower_only` the upper triangle and
/// diagonal are left blank.
pub fn heatmap(ui: &mut Ui, id: &str, matrix: &CorrelationMatrix, lower_only: bool) {
    if matrix.is_empty() {
        return;
    }
    egui::Grid::new(id)
        .spacing([4.0, 4.0])
        .min_col_width(64.0)
        .show(ui, |ui: &mut Ui| {
            ui.label("");
            for name in &matrix.columns {
                ui.strong(name);
            }
            ui.end_row();

            for (i, row_name) in matrix.columns.iter().enumerate() {
                ui.strong(row_name);
                for j in 0..matrix.len() {
                    if lower_only && j >= i {
                        ui.label("");
                        continue;
                    }
                    let r = matrix.at(i, j);
                    let text = if r.is_finite() {
                        format!("{r:+.2}")
                    } else {
                        "n/a".to_string()
                    };
                    ui.label(
                        RichText::new(text)
                            .monospace()
                            .color(Color32::BLACK)
                            .background_color(diverging(r)),
                    );
                }
                ui.end_row();
            }
        });
}
