use eframe::egui;

use crate::config::DashboardConfig;
use crate::state::{AppState, Page};
use crate::ui::{pages, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DashboardApp {
    pub state: AppState,
}

impl DashboardApp {
    /// Build the app and read the dataset once up front.
    pub fn new(config: DashboardConfig) -> Self {
        let mut state = AppState::new(config);
        state.load();
        Self { state }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar and page switcher ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters (only on pages that use them) ----
        if self.state.base.is_some() && self.state.page.uses_sidebar() {
            egui::SidePanel::left("filter_panel")
                .default_width(220.0)
                .resizable(true)
                .show(ctx, |ui| {
                    panels::side_panel(ui, &mut self.state);
                });
        }

        // ---- Central panel: current page ----
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(message) = self.state.load_error.clone() {
                pages::source_error(ui, &message);
                return;
            }
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| match self.state.page {
                    Page::Home => pages::home(ui, &self.state),
                    Page::Summary => pages::summary(ui, &mut self.state),
                    Page::Exploration => pages::exploration(ui, &mut self.state),
                    Page::Comparisons => pages::comparisons(ui, &mut self.state),
                });
        });
    }
}
