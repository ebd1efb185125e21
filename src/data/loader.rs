use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::model::{Field, Table};
use crate::error::{DashError, Result};

/// Location of the dataset. Fixed; not exposed through configuration.
pub const DATA_PATH: &str = "data/all_seasons.csv";

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one player-season per row.
/// `player_name`, `season`, `player_height` and `player_weight` must be
/// present; every other column is carried along as-is.
pub fn load_csv(path: &Path) -> Result<Table> {
    if !path.exists() {
        return Err(DashError::SourceNotFound(path.to_path_buf()));
    }

    let mut reader = csv::Reader::from_path(path).map_err(|e| csv_error(path, e))?;
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| csv_error(path, e))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let missing: Vec<String> = Field::REQUIRED
        .iter()
        .map(|f| f.name())
        .filter(|name| !headers.iter().any(|h| h.trim() == *name))
        .map(str::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(DashError::MissingColumns(missing));
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| csv_error(path, e))?;
        rows.push(record.iter().map(|v| v.to_string()).collect());
    }

    let table = Table::from_raw(&headers, rows);
    log::debug!(
        "Parsed {} rows from {}, numeric columns {:?}",
        table.len(),
        path.display(),
        table.numeric_columns()
    );
    Ok(table)
}

fn csv_error(path: &Path, source: csv::Error) -> DashError {
    DashError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

// ---------------------------------------------------------------------------
// Session cache
// ---------------------------------------------------------------------------

/// Holds the base table for the lifetime of the process.
///
/// Keyed by source path: asking for the same path again returns the cached
/// table, asking for a different one replaces it. Failed loads are not
/// cached, so the next render retries.
#[derive(Debug, Default)]
pub struct TableCache {
    source: Option<PathBuf>,
    table: Option<Arc<Table>>,
    loads: usize,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load(&mut self, path: &Path) -> Result<Arc<Table>> {
        if let (Some(source), Some(table)) = (&self.source, &self.table) {
            if source == path {
                return Ok(Arc::clone(table));
            }
        }

        let table = Arc::new(load_csv(path)?);
        self.loads += 1;
        log::info!(
            "Loaded {} records with columns {:?} from {}",
            table.len(),
            table.column_names().collect::<Vec<_>>(),
            path.display()
        );
        self.source = Some(path.to_path_buf());
        self.table = Some(Arc::clone(&table));
        Ok(table)
    }

    /// How many times the source has actually been read.
    pub fn load_count(&self) -> usize {
        self.loads
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, ColumnKind};
    use std::io::Write;

    const SAMPLE: &str = "\
,player_name,season,player_height,player_weight,draft_year
0,Ann,2019-20,201,95,2014
1,Bo,2019-20,198.12,90,Undrafted
2,Cy,2020-21,205,,2018
";

    fn write_csv(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_and_infers_types() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "all_seasons.csv", SAMPLE);
        let table = load_csv(&path).unwrap();

        assert_eq!(table.len(), 3);
        let names: Vec<&str> = table.column_names().collect();
        assert_eq!(
            names,
            vec!["player_name", "season", "player_height", "player_weight", "draft_year"]
        );
        assert_eq!(table.column_def("draft_year").unwrap().kind, ColumnKind::Categorical);
        assert_eq!(table.value(1, "player_height"), Some(&CellValue::Float(198.12)));
        assert_eq!(table.value(2, "player_weight"), Some(&CellValue::Missing));
    }

    #[test]
    fn missing_file_is_source_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_csv(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, DashError::SourceNotFound(_)));
    }

    #[test]
    fn missing_required_columns_are_named() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "bad.csv", "player_name,season\nAnn,2019-20\n");
        match load_csv(&path).unwrap_err() {
            DashError::MissingColumns(cols) => {
                assert_eq!(cols, vec!["player_height", "player_weight"])
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn cache_reads_source_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "all_seasons.csv", SAMPLE);
        let mut cache = TableCache::new();

        let first = cache.get_or_load(&path).unwrap();
        let second = cache.get_or_load(&path).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.load_count(), 1);
    }

    #[test]
    fn cache_does_not_remember_failures() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("all_seasons.csv");
        let mut cache = TableCache::new();

        assert!(cache.get_or_load(&path).is_err());
        assert_eq!(cache.load_count(), 0);

        write_csv(&dir, "all_seasons.csv", SAMPLE);
        assert_eq!(cache.get_or_load(&path).unwrap().len(), 3);
        assert_eq!(cache.load_count(), 1);
    }

    #[test]
    fn cache_reloads_for_a_different_source() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_csv(&dir, "a.csv", SAMPLE);
        let b = write_csv(
            &dir,
            "b.csv",
            "player_name,season,player_height,player_weight\nZed,2022-23,210,120\n",
        );
        let mut cache = TableCache::new();
        cache.get_or_load(&a).unwrap();
        let table = cache.get_or_load(&b).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(cache.load_count(), 2);
    }
}
