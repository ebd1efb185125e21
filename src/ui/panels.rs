use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::filter::{available_seasons, height_bounds};
use crate::state::{AppState, Page};
use crate::stats::describe::statistics_json;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let base = match &state.base {
        Some(table) => table.clone(),
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };
    let seasons = available_seasons(&base);

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Seasons (collapsible checklist) ----
            let header_text = if state.selection.seasons.is_empty() {
                format!("Seasons  (all {})", seasons.len())
            } else {
                format!("Seasons  ({}/{})", state.selection.seasons.len(), seasons.len())
            };
            egui::CollapsingHeader::new(RichText::new(header_text).strong())
                .id_salt("seasons")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    ui.horizontal(|ui: &mut Ui| {
                        if ui.small_button("All").clicked() {
                            state.select_all_seasons();
                        }
                        if ui.small_button("Clear").clicked() {
                            state.clear_seasons();
                        }
                    });

                    let mut toggled: Option<String> = None;
                    for season in &seasons {
                        let mut checked = state.selection.seasons.contains(season);
                        if ui.checkbox(&mut checked, season).changed() {
                            toggled = Some(season.clone());
                        }
                    }
                    if let Some(season) = toggled {
                        state.toggle_season(&season);
                    }
                });
            ui.separator();

            // ---- Height range ----
            ui.strong("Height (cm)");
            if let Some((lo_bound, hi_bound)) = height_bounds(&base) {
                let (mut lo, mut hi) = state.selection.height.unwrap_or((lo_bound, hi_bound));
                let mut changed = ui
                    .add(egui::Slider::new(&mut lo, lo_bound..=hi_bound).step_by(1.0).text("min"))
                    .changed();
                changed |= ui
                    .add(egui::Slider::new(&mut hi, lo_bound..=hi_bound).step_by(1.0).text("max"))
                    .changed();
                if changed {
                    state.set_height_range(Some((lo, hi)));
                }
                if state.selection.height.is_some() && ui.small_button("Reset").clicked() {
                    state.set_height_range(None);
                }
            } else {
                ui.label("No height values.");
            }
            ui.separator();

            ui.label(
                RichText::new(
                    "Tips:\n• Clearing the seasons shows every season\n• ± values are standard deviations",
                )
                .small()
                .weak(),
            );
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            // a cache hit when the table is already loaded, so this only
            // resets the page choices
            let label = if state.base.is_some() {
                "Reset filters"
            } else {
                "Retry loading"
            };
            if ui.button(label).clicked() {
                state.load();
                ui.close_menu();
            }
            let copy = egui::Button::new("Copy statistics as JSON");
            if ui.add_enabled(!state.filtered.is_empty(), copy).clicked() {
                match statistics_json(&state.filtered) {
                    Ok(json) => ui.ctx().copy_text(json),
                    Err(e) => log::warn!("Could not serialize statistics: {e}"),
                }
                ui.close_menu();
            }
        });

        ui.separator();

        for page in Page::ALL {
            ui.selectable_value(&mut state.page, page, page.title());
        }

        ui.separator();

        if let Some(base) = &state.base {
            if state.page.uses_sidebar() {
                ui.label(format!(
                    "{} records loaded, {} visible",
                    base.len(),
                    state.filtered.len()
                ));
            } else {
                ui.label(format!("{} records loaded", base.len()));
            }
        }

        if let Some(msg) = &state.load_error {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}
