use std::collections::BTreeMap;
use std::sync::Arc;

use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use super::plot::{self, ScatterSeries};
use crate::color::ColorMap;
use crate::data::coerce::numeric_field_names;
use crate::data::filter::{Predicate, apply, available_seasons};
use crate::data::model::{CellValue, Field, Table};
use crate::error::DashError;
use crate::state::{AppState, MetricChart, ScatterHue, SummaryTab, metric_options};
use crate::stats::aggregate::{group_mean, top_n};
use crate::stats::correlation::{Strength, correlation_matrix, strong_pairs};
use crate::stats::describe::{
    CategoricalSummary, Description, NumericSummary, describe, describe_numeric_columns,
};
use crate::stats::distribution::{box_summary, histogram, linear_fit, paired_values, value_counts};

const BLUE: Color32 = Color32::from_rgb(31, 119, 180);
const GREEN: Color32 = Color32::from_rgb(44, 160, 44);
const RED: Color32 = Color32::from_rgb(214, 39, 40);
const ORANGE: Color32 = Color32::from_rgb(255, 127, 14);

// ---------------------------------------------------------------------------
// Shared bits
// ---------------------------------------------------------------------------

fn fmt(v: f64) -> String {
    if v.is_finite() {
        format!("{v:.2}")
    } else {
        "n/a".to_string()
    }
}

fn section(ui: &mut Ui, title: &str) {
    ui.add_space(8.0);
    ui.heading(title);
    ui.separator();
}

fn notice(ui: &mut Ui, err: &DashError) {
    if err.is_fatal_for_page() {
        ui.label(RichText::new(format!("❌ {err}")).color(Color32::RED));
    } else {
        ui.label(RichText::new(format!("ℹ {err}")).italics().color(Color32::GRAY));
    }
}

fn metric_card(ui: &mut Ui, label: &str, value: String, detail: String) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.label(RichText::new(label).small());
        ui.heading(value);
        ui.label(RichText::new(detail).weak());
    });
}

fn numeric_stats(ui: &mut Ui, id: &str, s: &NumericSummary) {
    egui::Grid::new(id).striped(true).show(ui, |ui: &mut Ui| {
        for (name, value) in [
            ("Mean", fmt(s.mean)),
            ("Median", fmt(s.median)),
            ("Std dev", format!("±{}", fmt(s.std))),
            ("Min", fmt(s.min)),
            ("Max", fmt(s.max)),
            ("Count", s.count.to_string()),
        ] {
            ui.label(name);
            ui.strong(value);
            ui.end_row();
        }
    });
}

fn categorical_stats(ui: &mut Ui, s: &CategoricalSummary) {
    ui.label(format!("Unique values: {}", s.unique_count));
    match &s.mode {
        Some(mode) => ui.label(format!("Mode: {mode} ({} occurrences)", s.mode_count)),
        None => ui.label("Mode: n/a"),
    };
}

/// Mean ± sample std of a column, for the headline cards.
fn mean_std(table: &Table, field: Field) -> NumericSummary {
    NumericSummary::from_values(&table.present_values(field.name()))
}

fn data_preview(ui: &mut Ui, id: &str, table: &Table) {
    let names: Vec<&str> = table.column_names().collect();
    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .vscroll(false)
            .columns(Column::auto().at_least(60.0), names.len())
            .header(20.0, |mut header| {
                for name in &names {
                    header.col(|ui: &mut Ui| {
                        ui.strong(*name);
                    });
                }
            })
            .body(|body| {
                body.rows(18.0, table.len(), |mut row| {
                    let record = &table.records()[row.index()];
                    for value in record.values() {
                        row.col(|ui: &mut Ui| {
                            ui.label(value.to_string());
                        });
                    }
                });
            });
    });
}

fn scatter_series(table: &Table, x: &str, y: &str, hue: Option<&ColorMap>) -> Vec<ScatterSeries> {
    let xs = table.numeric_values(x).unwrap_or_default();
    let ys = table.numeric_values(y).unwrap_or_default();
    let Some(map) = hue else {
        return vec![ScatterSeries {
            name: "Players".to_string(),
            color: BLUE,
            points: xs
                .iter()
                .zip(&ys)
                .filter_map(|(a, b)| Some([(*a)?, (*b)?]))
                .collect(),
        }];
    };

    let keys = table.column_values(&map.column).unwrap_or_default();
    let mut groups: BTreeMap<CellValue, Vec<[f64; 2]>> = BTreeMap::new();
    for ((a, b), key) in xs.iter().zip(&ys).zip(keys) {
        if let (Some(a), Some(b)) = (a, b) {
            groups.entry(key.clone()).or_default().push([*a, *b]);
        }
    }
    groups
        .into_iter()
        .map(|(key, points)| ScatterSeries {
            name: key.to_string(),
            color: map.color_for(&key),
            points,
        })
        .collect()
}

fn season_combo(ui: &mut Ui, id: &str, seasons: &[String], current: &Option<String>) -> Option<String> {
    let mut picked = current.clone();
    egui::ComboBox::from_id_salt(id)
        .selected_text(current.clone().unwrap_or_default())
        .show_ui(ui, |ui: &mut Ui| {
            for season in seasons {
                ui.selectable_value(&mut picked, Some(season.clone()), season);
            }
        });
    picked
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

/// Shown instead of any page when the dataset could not be read.
pub fn source_error(ui: &mut Ui, message: &str) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.label(
            RichText::new(format!(
                "❌ {message}\n\nMake sure the file is in the 'data' folder (see `generate_sample`)."
            ))
            .color(Color32::RED)
            .size(16.0),
        );
    });
}

pub fn home(ui: &mut Ui, state: &AppState) {
    ui.heading("🏀 NBA Dashboard – All Seasons");
    ui.label("Player statistics across seasons, loaded from data/all_seasons.csv.");
    let Some(base) = &state.base else {
        return;
    };
    ui.label(RichText::new("Dataset loaded.").color(GREEN));
    section(ui, "Preview");
    data_preview(ui, "home_preview", &base.head(5));
}

pub fn summary(ui: &mut Ui, state: &mut AppState) {
    ui.heading("🏀 NBA Players Analytics");
    let table = Arc::clone(&state.filtered);
    if table.is_empty() {
        notice(ui, &DashError::EmptyResult);
        return;
    }

    // ---- Headline metrics ----
    section(ui, "📊 Key metrics");
    let height = mean_std(&table, Field::PlayerHeight);
    let weight = mean_std(&table, Field::PlayerWeight);
    ui.columns(4, |cols: &mut [Ui]| {
        metric_card(
            &mut cols[0],
            "👥 Records",
            table.len().to_string(),
            format!(
                "{} unique players",
                table.unique_count(Field::PlayerName.name()).unwrap_or(0)
            ),
        );
        metric_card(
            &mut cols[1],
            "📏 Mean height",
            format!("{} cm", fmt(height.mean)),
            format!("±{} cm", fmt(height.std)),
        );
        metric_card(
            &mut cols[2],
            "⚖ Mean weight",
            format!("{} kg", fmt(weight.mean)),
            format!("±{} kg", fmt(weight.std)),
        );
        if table.has(Field::Age) {
            let age = mean_std(&table, Field::Age);
            metric_card(
                &mut cols[3],
                "🎂 Mean age",
                format!("{} years", fmt(age.mean)),
                format!("±{} years", fmt(age.std)),
            );
        } else if let Some(n) = table.unique_count(Field::TeamPosition.name()) {
            metric_card(&mut cols[3], "🏆 Positions", n.to_string(), String::new());
        } else {
            metric_card(&mut cols[3], "📈 Data", "available".to_string(), String::new());
        }
    });

    ui.separator();
    ui.horizontal(|ui: &mut Ui| {
        ui.selectable_value(&mut state.summary_tab, SummaryTab::Distribution, "📈 Distributions");
        ui.selectable_value(&mut state.summary_tab, SummaryTab::Relation, "⚖ Relations");
        ui.selectable_value(&mut state.summary_tab, SummaryTab::Metric, "📊 Analysis");
    });

    match state.summary_tab {
        SummaryTab::Distribution => height_distribution(ui, state, &table, &height),
        SummaryTab::Relation => height_weight_relation(ui, state, &table),
        SummaryTab::Metric => metric_analysis(ui, state, &table),
    }

    // ---- Dataset footer ----
    section(ui, "📋 Dataset summary");
    ui.label(format!("• Records: {}", table.len()));
    ui.label(format!(
        "• Unique players: {}",
        table.unique_count(Field::PlayerName.name()).unwrap_or(0)
    ));
    if let Some(n) = table.unique_count(Field::Season.name()) {
        ui.label(format!("• Seasons: {n}"));
    }
    ui.label(format!("• Numeric variables: {}", table.numeric_columns().len()));
}

fn height_distribution(ui: &mut Ui, state: &mut AppState, table: &Table, stats: &NumericSummary) {
    ui.horizontal(|ui: &mut Ui| {
        ui.add(egui::Slider::new(&mut state.histogram_bins, 10..=50).text("bins"));
        ui.checkbox(&mut state.show_density, "Density line");
    });
    ui.label(format!(
        "Min {} cm · Max {} cm · Median {} cm",
        fmt(stats.min),
        fmt(stats.max),
        fmt(stats.median)
    ));
    let bins = histogram(&table.present_values(Field::PlayerHeight.name()), state.histogram_bins);
    plot::histogram(
        ui,
        "height_hist",
        &bins,
        Field::PlayerHeight.label(),
        state.show_density,
        state.show_density,
        BLUE,
    );
}

fn height_weight_relation(ui: &mut Ui, state: &mut AppState, table: &Table) {
    let mut hue = state.hue;
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Colour by:");
        ui.selectable_value(&mut hue, ScatterHue::None, "None");
        if table.has(Field::TeamPosition) {
            ui.selectable_value(&mut hue, ScatterHue::Position, "Position");
        }
        ui.selectable_value(&mut hue, ScatterHue::Season, "Season");
        ui.checkbox(&mut state.show_trend, "Trend line");
    });
    if hue != state.hue {
        state.set_hue(hue);
    }

    let (h, w) = (Field::PlayerHeight.name(), Field::PlayerWeight.name());
    match correlation_matrix(table, &[h, w]) {
        Ok(m) => {
            let r = m.get(h, w).unwrap_or(f64::NAN);
            ui.label(format!(
                "Correlation: {} → {} correlation",
                fmt(r),
                Strength::of(r).label()
            ));
        }
        Err(e) => notice(ui, &e),
    }

    let trend = if state.show_trend {
        linear_fit(&paired_values(table, h, w))
    } else {
        None
    };
    if let Some(map) = &state.hue_map {
        ui.horizontal_wrapped(|ui: &mut Ui| {
            for (label, color) in map.legend_entries() {
                ui.label(RichText::new(format!("● {label}")).color(color));
            }
        });
    }
    let series = scatter_series(table, h, w, state.hue_map.as_ref());
    plot::scatter(
        ui,
        "height_weight",
        series,
        trend,
        Field::PlayerHeight.label(),
        Field::PlayerWeight.label(),
    );
}

fn metric_analysis(ui: &mut Ui, state: &mut AppState, table: &Table) {
    let mut options: Vec<Field> = metric_options(table);
    options.extend(Field::CATEGORIES.into_iter().filter(|f| table.has(*f)));
    if !options.iter().any(|f| f.name() == state.summary_metric) {
        if let Some(first) = options.first() {
            state.summary_metric = first.name().to_string();
        }
    }

    egui::ComboBox::from_id_salt("summary_metric")
        .selected_text(Field::label_for(&state.summary_metric))
        .show_ui(ui, |ui: &mut Ui| {
            for field in &options {
                ui.selectable_value(&mut state.summary_metric, field.name().to_string(), field.label());
            }
        });

    let column = state.summary_metric.clone();
    let label = Field::label_for(&column);
    match describe(table, &column) {
        Ok(Description::Numeric(s)) => {
            numeric_stats(ui, "summary_metric_stats", &s);
            ui.horizontal(|ui: &mut Ui| {
                ui.radio_value(&mut state.metric_chart, MetricChart::Histogram, "Histogram");
                ui.radio_value(&mut state.metric_chart, MetricChart::BoxPlot, "Box plot");
                ui.radio_value(&mut state.metric_chart, MetricChart::Density, "Density");
            });
            let values = table.present_values(&column);
            match state.metric_chart {
                MetricChart::Histogram => {
                    plot::histogram(ui, "metric_hist", &histogram(&values, 20), &label, false, false, BLUE)
                }
                MetricChart::Density => {
                    plot::histogram(ui, "metric_density", &histogram(&values, 20), &label, true, true, ORANGE)
                }
                MetricChart::BoxPlot => match box_summary(&values) {
                    Some(b) => plot::box_plot(ui, "metric_box", &b, &label, GREEN),
                    None => notice(ui, &DashError::InsufficientData { needed: 1, available: 0 }),
                },
            }
        }
        Ok(Description::Categorical(s)) => {
            categorical_stats(ui, &s);
            let entries: Vec<(String, f64)> = value_counts(table, &column, state.config.category_limit)
                .into_iter()
                .map(|(v, n)| (v.to_string(), n as f64))
                .collect();
            plot::ranked_bars(ui, "metric_counts", &entries, "Frequency", GREEN);
        }
        Err(e) => notice(ui, &e),
    }
}

pub fn exploration(ui: &mut Ui, state: &mut AppState) {
    ui.heading("🔎 Data exploration");
    let table = Arc::clone(&state.filtered);
    if table.is_empty() {
        notice(ui, &DashError::EmptyResult);
        return;
    }

    // ---- Season evolution ----
    section(ui, "📈 Season evolution");
    let (h, w) = (Field::PlayerHeight.name(), Field::PlayerWeight.name());
    match group_mean(&table, Field::Season.name(), &[h, w]) {
        Ok(means) if means.is_empty() => notice(ui, &DashError::EmptyResult),
        Ok(means) => {
            let line = |column: &str| -> Vec<(String, f64)> {
                means
                    .series(column)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v))
                    .collect()
            };
            let (heights, weights) = (line(h), line(w));
            ui.columns(2, |cols: &mut [Ui]| {
                plot::season_line(&mut cols[0], "height_evolution", &heights, "Mean height (cm)", BLUE, None);
                plot::season_line(&mut cols[1], "weight_evolution", &weights, "Mean weight (kg)", RED, None);
            });
            ui.label(
                means
                    .rows
                    .iter()
                    .map(|r| format!("{}: {} players", r.key, r.count))
                    .collect::<Vec<_>>()
                    .join(" · "),
            );
            egui::CollapsingHeader::new("Season means")
                .id_salt("season_means")
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    data_preview(ui, "season_means_table", &means.to_table());
                });
        }
        Err(e) => notice(ui, &e),
    }

    // ---- Correlation ----
    section(ui, "🧠 Correlation analysis");
    match correlation_matrix(&table, &numeric_field_names()) {
        Ok(matrix) => {
            ui.columns(2, |cols: &mut [Ui]| {
                plot::heatmap(&mut cols[0], "exploration_corr", &matrix, true);
                let ui = &mut cols[1];
                ui.strong("💡 Reading the matrix");
                ui.label("• +1: strong positive correlation");
                ui.label("• -1: strong negative correlation");
                ui.label("• 0: no correlation");
                ui.label(format!("Computed on {} complete rows.", matrix.sample_size));
                ui.add(
                    egui::Slider::new(&mut state.config.strong_threshold, 0.0..=1.0)
                        .step_by(0.05)
                        .text("strong |r| above"),
                );
                let pairs = strong_pairs(&matrix, state.config.strong_threshold);
                if !pairs.is_empty() {
                    ui.strong("🔗 Strong correlations");
                    for p in pairs {
                        ui.label(format!("• {} – {}: {:.2}", p.first, p.second, p.r));
                    }
                }
            });
        }
        Err(e) => notice(ui, &e),
    }

    // ---- One season in detail ----
    section(ui, "📊 Distributions by season");
    let seasons = state
        .base
        .as_deref()
        .map(available_seasons)
        .unwrap_or_default();
    let picked = season_combo(ui, "detail_season", &seasons, &state.detail_season);
    state.detail_season = picked;
    if let Some(season) = &state.detail_season {
        let one = apply(&table, &[Predicate::members(Field::Season.name(), [season.as_str()])]);
        if one.is_empty() {
            notice(ui, &DashError::EmptyResult);
        } else {
            let bins = histogram(&one.present_values(h), 20);
            let series = vec![ScatterSeries {
                name: season.clone(),
                color: GREEN,
                points: paired_values(&one, h, w).into_iter().map(|(a, b)| [a, b]).collect(),
            }];
            ui.columns(2, |cols: &mut [Ui]| {
                plot::histogram(&mut cols[0], "season_hist", &bins, Field::PlayerHeight.label(), false, false, BLUE);
                plot::scatter(
                    &mut cols[1],
                    "season_scatter",
                    series,
                    None,
                    Field::PlayerHeight.label(),
                    Field::PlayerWeight.label(),
                );
            });
        }
    }

    // ---- Data ----
    section(ui, "📋 Filtered data");
    ui.label(format!("{} records", table.len()));
    egui::CollapsingHeader::new("Rows")
        .id_salt("exploration_rows")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            data_preview(ui, "exploration_preview", &table.head(state.config.preview_rows));
        });
    egui::CollapsingHeader::new("Descriptive statistics")
        .id_salt("exploration_describe")
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            let described = describe_numeric_columns(&table);
            if described.is_empty() {
                ui.label("No numeric columns.");
                return;
            }
            egui::Grid::new("describe_grid").striped(true).show(ui, |ui: &mut Ui| {
                for head in ["", "count", "mean", "std", "min", "50%", "max"] {
                    ui.strong(head);
                }
                ui.end_row();
                for (name, s) in &described {
                    ui.label(name);
                    ui.label(s.count.to_string());
                    for v in [s.mean, s.std, s.min, s.median, s.max] {
                        ui.label(fmt(v));
                    }
                    ui.end_row();
                }
            });
        });
}

pub fn comparisons(ui: &mut Ui, state: &mut AppState) {
    ui.heading("⚔ Player comparisons");

    // ---- Controls ----
    let seasons = available_seasons(&state.coerced_base);
    let metrics = metric_options(&state.coerced_base);
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Season:");
        let picked = season_combo(ui, "compare_season", &seasons, &state.compare_season);
        if picked != state.compare_season {
            state.set_compare_season(picked);
        }
        ui.label("Metric:");
        egui::ComboBox::from_id_salt("compare_metric")
            .selected_text(
                state
                    .compare_metric
                    .as_deref()
                    .map(Field::label_for)
                    .unwrap_or_default(),
            )
            .show_ui(ui, |ui: &mut Ui| {
                for field in &metrics {
                    ui.selectable_value(
                        &mut state.compare_metric,
                        Some(field.name().to_string()),
                        field.label(),
                    );
                }
            });
    });

    let (Some(season), Some(metric)) = (state.compare_season.clone(), state.compare_metric.clone())
    else {
        ui.label("Pick a season and a metric to see comparisons.");
        return;
    };
    let table = Arc::clone(&state.comparison);
    let label = Field::label_for(&metric);
    ui.add(egui::Slider::new(&mut state.config.top_n, 1..=30).text("players ranked"));

    // ---- Top players ----
    section(ui, &format!("📊 Top {} players – {label} ({season})", state.config.top_n));
    match top_n(&table, &metric, state.config.top_n) {
        Ok(ranked) => {
            if let Some(note) = &ranked.notice {
                notice(ui, note);
            }
            let entries: Vec<(String, f64)> = (0..ranked.value.len())
                .filter_map(|i| {
                    let name = ranked.value.value(i, Field::PlayerName.name())?.to_string();
                    let v = ranked.value.value(i, &metric)?.as_f64()?;
                    Some((name, v))
                })
                .collect();
            if entries.is_empty() {
                ui.label(format!("No {label} data for the selected season."));
            } else {
                plot::ranked_bars(ui, "top_players", &entries, &label, BLUE);
            }
        }
        Err(e) => notice(ui, &e),
    }

    // ---- Distribution ----
    section(ui, "📈 Distribution of the selected metric");
    let values = table.present_values(&metric);
    ui.columns(2, |cols: &mut [Ui]| {
        plot::histogram(&mut cols[0], "compare_hist", &histogram(&values, 20), &label, false, false, BLUE);
        match box_summary(&values) {
            Some(b) => plot::box_plot(&mut cols[1], "compare_box", &b, &label, RED),
            None => {
                cols[1].label("No values.");
            }
        }
    });

    // ---- Across seasons ----
    section(ui, "🔄 Across seasons");
    match group_mean(&state.coerced_base, Field::Season.name(), &[metric.as_str()]) {
        Ok(means) => {
            let points: Vec<(String, f64)> = means
                .series(&metric)
                .unwrap_or_default()
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect();
            plot::season_line(ui, "compare_seasons", &points, &label, BLUE, Some(season.as_str()));
            if let Some(v) = means.mean_for(&CellValue::from(season.as_str()), &metric) {
                let all = NumericSummary::from_values(&state.coerced_base.present_values(&metric));
                ui.label(format!(
                    "{season}: mean {} vs {} over all seasons",
                    fmt(v),
                    fmt(all.mean)
                ));
            }
        }
        Err(e) => notice(ui, &e),
    }

    // ---- Several metrics ----
    section(ui, "🎪 Several metrics");
    ui.horizontal_wrapped(|ui: &mut Ui| {
        for &field in &metrics {
            let mut checked = state.compare_metrics.contains(&field);
            if ui.checkbox(&mut checked, field.label()).changed() {
                state.toggle_compare_metric(field);
            }
        }
    });
    if state.compare_metrics.len() >= 2 {
        let chosen = state.compare_columns();
        match correlation_matrix(&table, &chosen) {
            Ok(matrix) => plot::heatmap(ui, "compare_corr", &matrix, false),
            Err(e) => notice(ui, &e),
        }
    } else {
        ui.label("Pick at least two metrics.");
    }

    // ---- Detailed statistics ----
    section(ui, &format!("📋 {label} statistics"));
    match describe(&table, &metric) {
        Ok(Description::Numeric(s)) => numeric_stats(ui, "compare_stats", &s),
        Ok(Description::Categorical(s)) => categorical_stats(ui, &s),
        Err(e) => notice(ui, &e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures;
    use crate::data::model::ColumnKind;

    #[test]
    fn undefined_numbers_render_as_na() {
        assert_eq!(fmt(f64::NAN), "n/a");
        assert_eq!(fmt(5.0), "5.00");
    }

    #[test]
    fn scatter_groups_by_hue_and_skips_gaps() {
        let table = fixtures::players();
        let plain = scatter_series(&table, "age", "pts", None);
        assert_eq!(plain.len(), 1);
        assert_eq!(plain[0].points.len(), 4);

        let positions = table.unique_values("team_position").unwrap();
        let map = ColorMap::new("team_position", &positions);
        let grouped = scatter_series(&table, "age", "pts", Some(&map));
        let names: Vec<&str> = grouped.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["C", "F", "G"]);
        assert_eq!(grouped.iter().map(|s| s.points.len()).sum::<usize>(), 4);
    }

    #[test]
    fn headline_cards_use_sample_std() {
        let s = mean_std(&fixtures::seasons(), Field::PlayerWeight);
        assert_eq!(s.mean, 95.0);
        assert!((s.std - 5.0).abs() < 1e-12);
    }

    #[test]
    fn categorical_columns_are_described_as_such() {
        let table = fixtures::players();
        assert!(matches!(
            table.column_def("team_position").map(|c| c.kind),
            Some(ColumnKind::Categorical)
        ));
    }
}
