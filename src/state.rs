use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use crate::color::ColorMap;
use crate::config::DashboardConfig;
use crate::data::coerce::{coerce, numeric_field_names};
use crate::data::filter::{Predicate, Selection, apply, available_seasons};
use crate::data::loader::{DATA_PATH, TableCache};
use crate::data::model::{Field, Table};

// ---------------------------------------------------------------------------
// Page and widget choices
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Summary,
    Exploration,
    Comparisons,
}

impl Page {
    pub const ALL: [Page; 4] = [Page::Home, Page::Summary, Page::Exploration, Page::Comparisons];

    pub fn title(self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::Summary => "Summary",
            Page::Exploration => "Exploration",
            Page::Comparisons => "Comparisons",
        }
    }

    /// Whether the page is driven by the sidebar filters.
    pub fn uses_sidebar(self) -> bool {
        matches!(self, Page::Summary | Page::Exploration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryTab {
    Distribution,
    Relation,
    Metric,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScatterHue {
    None,
    Position,
    Season,
}

impl ScatterHue {
    pub fn field(self) -> Option<Field> {
        match self {
            ScatterHue::None => None,
            ScatterHue::Position => Some(Field::TeamPosition),
            ScatterHue::Season => Some(Field::Season),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricChart {
    Histogram,
    BoxPlot,
    Density,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    cache: TableCache,
    pub config: DashboardConfig,

    /// Base table as loaded (None until the source has been read).
    pub base: Option<Arc<Table>>,
    /// Base table with the metric columns coerced; the comparisons page
    /// works on this, without the sidebar filters.
    pub coerced_base: Table,
    /// Sidebar choices.
    pub selection: Selection,
    /// Base → sidebar filters → coercion. Rebuilt on every filter change.
    pub filtered: Arc<Table>,
    /// Message shown instead of the page when the source could not be read.
    pub load_error: Option<String>,

    pub page: Page,

    // summary page
    pub summary_tab: SummaryTab,
    pub histogram_bins: usize,
    pub show_density: bool,
    pub hue: ScatterHue,
    pub hue_map: Option<ColorMap>,
    pub show_trend: bool,
    pub summary_metric: String,
    pub metric_chart: MetricChart,

    // exploration page
    pub detail_season: Option<String>,

    // comparisons page
    pub compare_season: Option<String>,
    /// `coerced_base` limited to `compare_season`.
    pub comparison: Arc<Table>,
    pub compare_metric: Option<String>,
    /// Metrics in the multi-metric heatmap. `Field` orders by declaration,
    /// which is the picker order.
    pub compare_metrics: BTreeSet<Field>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            cache: TableCache::new(),
            histogram_bins: config.histogram_bins,
            config,
            base: None,
            coerced_base: Table::default(),
            selection: Selection::default(),
            filtered: Arc::new(Table::default()),
            load_error: None,
            page: Page::Home,
            summary_tab: SummaryTab::Distribution,
            show_density: true,
            hue: ScatterHue::None,
            hue_map: None,
            show_trend: true,
            summary_metric: Field::PlayerHeight.name().to_string(),
            metric_chart: MetricChart::Histogram,
            detail_season: None,
            compare_season: None,
            comparison: Arc::new(Table::default()),
            compare_metric: None,
            compare_metrics: BTreeSet::new(),
        }
    }

    /// Read the dataset from its fixed location (a cache hit after the
    /// first success).
    pub fn load(&mut self) {
        self.load_from(Path::new(DATA_PATH));
    }

    pub fn load_from(&mut self, path: &Path) {
        match self.cache.get_or_load(path) {
            Ok(table) => {
                log::info!(
                    "Dataset ready: {} rows ({} read(s) from disk)",
                    table.len(),
                    self.cache.load_count()
                );
                self.set_dataset(table);
            }
            Err(e) => {
                log::error!("Failed to load dataset: {e}");
                self.load_error = Some(e.to_string());
                self.base = None;
            }
        }
    }

    /// Ingest a newly loaded table: default filters and page choices.
    pub fn set_dataset(&mut self, table: Arc<Table>) {
        self.selection = Selection::initial(&table, self.config.default_season_count);
        self.coerced_base = coerce(&table, &numeric_field_names());

        let seasons = available_seasons(&table);
        self.detail_season = seasons.first().cloned();
        self.set_compare_season(seasons.first().cloned());

        let metrics = metric_options(&self.coerced_base);
        self.compare_metric = metrics.first().map(|f| f.name().to_string());
        self.compare_metrics = metrics.iter().take(2).copied().collect();

        self.base = Some(table);
        self.load_error = None;
        self.refilter();
    }

    /// Recompute `filtered` after a filter change.
    pub fn refilter(&mut self) {
        let Some(base) = &self.base else {
            return;
        };
        let subset = apply(base, &self.selection.predicates());
        self.filtered = Arc::new(coerce(&subset, &numeric_field_names()));
        if self.filtered.is_empty() {
            log::warn!("Current filters match no rows");
        }
        self.rebuild_hue_map();
    }

    pub fn set_hue(&mut self, hue: ScatterHue) {
        self.hue = hue;
        self.rebuild_hue_map();
    }

    fn rebuild_hue_map(&mut self) {
        self.hue_map = self.hue.field().and_then(|field| {
            self.filtered
                .unique_values(field.name())
                .map(|vals| ColorMap::new(field.name(), &vals))
        });
    }

    /// Toggle a single season in the sidebar selection.
    pub fn toggle_season(&mut self, season: &str) {
        self.selection.toggle_season(season);
        self.refilter();
    }

    /// Select every season.
    pub fn select_all_seasons(&mut self) {
        if let Some(base) = &self.base {
            self.selection.seasons = available_seasons(base)
                .into_iter()
                .collect();
            self.refilter();
        }
    }

    /// Clear the season selection (which shows every season).
    pub fn clear_seasons(&mut self) {
        self.selection.seasons.clear();
        self.refilter();
    }

    pub fn set_height_range(&mut self, range: Option<(f64, f64)>) {
        self.selection.height = range.map(|(a, b)| (a.min(b), a.max(b)));
        self.refilter();
    }

    pub fn toggle_compare_metric(&mut self, field: Field) {
        if !self.compare_metrics.remove(&field) {
            self.compare_metrics.insert(field);
        }
    }

    /// Column names for the multi-metric heatmap, in picker order.
    pub fn compare_columns(&self) -> Vec<&'static str> {
        self.compare_metrics.iter().map(|f| f.name()).collect()
    }

    /// Pick the comparisons page season and rebuild its table.
    pub fn set_compare_season(&mut self, season: Option<String>) {
        let table = match &season {
            Some(season) => apply(
                &self.coerced_base,
                &[Predicate::members(Field::Season.name(), [season.as_str()])],
            ),
            None => self.coerced_base.clone(),
        };
        self.comparison = Arc::new(table);
        self.compare_season = season;
    }
}

/// Metric fields present in the table with at least one value.
pub fn metric_options(table: &Table) -> Vec<Field> {
    Field::METRICS
        .into_iter()
        .filter(|f| !table.present_values(f.name()).is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures;

    fn loaded() -> AppState {
        let mut state = AppState::new(DashboardConfig {
            default_season_count: 2,
            ..DashboardConfig::default()
        });
        state.set_dataset(Arc::new(fixtures::players()));
        state
    }

    #[test]
    fn new_dataset_gets_default_choices() {
        let state = loaded();
        assert_eq!(state.selection.seasons.len(), 2);
        assert_eq!(state.filtered.len(), 4);
        assert_eq!(state.detail_season.as_deref(), Some("2019-20"));
        assert_eq!(state.compare_metric.as_deref(), Some("player_height"));
        assert_eq!(state.compare_metrics.len(), 2);
        // draft_year is numeric after coercion
        assert_eq!(state.filtered.present_values("draft_year").len(), 3);
    }

    #[test]
    fn filter_changes_rebuild_the_view() {
        let mut state = loaded();
        state.toggle_season("2021-22");
        assert_eq!(state.filtered.len(), 6);
        state.set_height_range(Some((205.0, 195.0)));
        assert_eq!(state.selection.height, Some((195.0, 205.0)));
        assert_eq!(state.filtered.len(), 3);
        state.clear_seasons();
        state.set_height_range(None);
        assert_eq!(state.filtered.len(), 6);
    }

    #[test]
    fn comparison_table_ignores_the_sidebar() {
        let mut state = loaded();
        state.set_height_range(Some((300.0, 400.0)));
        assert!(state.filtered.is_empty());
        state.set_compare_season(Some("2021-22".into()));
        assert_eq!(state.comparison.len(), 2);
        state.set_compare_season(None);
        assert_eq!(state.comparison.len(), 6);
    }

    #[test]
    fn hue_map_follows_the_filtered_rows() {
        let mut state = loaded();
        state.set_hue(ScatterHue::Position);
        let map = state.hue_map.as_ref().unwrap();
        assert_eq!(map.legend_entries().len(), 3);
        state.set_hue(ScatterHue::None);
        assert!(state.hue_map.is_none());
    }

    #[test]
    fn heatmap_metrics_keep_picker_order() {
        let mut state = loaded();
        state.compare_metrics.clear();
        for field in [Field::Assists, Field::Age, Field::PlayerHeight] {
            state.toggle_compare_metric(field);
        }
        assert_eq!(state.compare_columns(), vec!["player_height", "age", "ast"]);
        state.toggle_compare_metric(Field::Age);
        assert_eq!(state.compare_columns(), vec!["player_height", "ast"]);
    }

    #[test]
    fn missing_source_is_reported_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::new(DashboardConfig::default());
        state.load_from(&dir.path().join("all_seasons.csv"));
        assert!(state.base.is_none());
        assert!(state.load_error.as_deref().unwrap().contains("not found"));
    }

    #[test]
    fn metric_options_skip_absent_and_empty_columns() {
        let table = fixtures::seasons();
        let names: Vec<&str> = metric_options(&table).iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["player_height", "player_weight"]);
    }
}
