use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Optional settings file, read from the working directory.
pub const CONFIG_PATH: &str = "dashboard.json";

/// Defaults for the dashboard controls. Every field may be omitted from
/// the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Seasons pre-selected in the sidebar (the first N in sort order).
    pub default_season_count: usize,
    /// Rows shown in the top-players chart.
    pub top_n: usize,
    /// `|r|` above which a pair is listed as strongly correlated.
    pub strong_threshold: f64,
    /// Initial number of histogram bins.
    pub histogram_bins: usize,
    /// Rows shown in data previews.
    pub preview_rows: usize,
    /// Categories shown in frequency bar charts.
    pub category_limit: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            default_season_count: 3,
            top_n: 10,
            strong_threshold: 0.7,
            histogram_bins: 25,
            preview_rows: 100,
            category_limit: 8,
        }
    }
}

impl DashboardConfig {
    /// Parse a settings file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: DashboardConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config.sanitized())
    }

    /// Settings from `path` if it exists; defaults otherwise. A broken file
    /// is logged and ignored.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::from_file(path) {
            Ok(config) => {
                log::info!("Using settings from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Ignoring settings file: {e:#}");
                Self::default()
            }
        }
    }

    fn sanitized(mut self) -> Self {
        self.histogram_bins = self.histogram_bins.clamp(1, 200);
        self.strong_threshold = self.strong_threshold.clamp(0.0, 1.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write(dir: &tempfile::TempDir, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(CONFIG_PATH);
        std::fs::File::create(&path)
            .unwrap()
            .write_all(body.as_bytes())
            .unwrap();
        path
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, r#"{ "top_n": 5, "strong_threshold": 0.5 }"#);
        let config = DashboardConfig::from_file(&path).unwrap();
        assert_eq!(config.top_n, 5);
        assert_eq!(config.strong_threshold, 0.5);
        assert_eq!(config.default_season_count, 3);
        assert_eq!(config.histogram_bins, 25);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, r#"{ "histogram_bins": 0, "strong_threshold": 3.0 }"#);
        let config = DashboardConfig::from_file(&path).unwrap();
        assert_eq!(config.histogram_bins, 1);
        assert_eq!(config.strong_threshold, 1.0);
    }

    #[test]
    fn missing_or_broken_files_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let absent = dir.path().join("nope.json");
        assert_eq!(DashboardConfig::load_or_default(&absent), DashboardConfig::default());

        let path = write(&dir, "{ not json");
        assert!(DashboardConfig::from_file(&path).is_err());
        assert_eq!(DashboardConfig::load_or_default(&path), DashboardConfig::default());
    }
}
