use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Error taxonomy shared by the data layer and the statistics layer
// ---------------------------------------------------------------------------

/// Everything the core can report back to a page.
///
/// Only the source errors (`SourceNotFound`, `Csv`, `MissingColumns`) halt a
/// page. The rest are informational and usually travel inside a [`Partial`].
#[derive(Debug, Error)]
pub enum DashError {
    #[error("data file not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("data file is missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("no rows match the current filters")]
    EmptyResult,

    #[error("insufficient data: needed {needed}, found {available}")]
    InsufficientData { needed: usize, available: usize },

    #[error("at least 2 numeric columns with variance are required, found {valid}")]
    InsufficientColumns { valid: usize },

    #[error("unknown column '{0}'")]
    UnknownColumn(String),
}

impl DashError {
    /// Whether the error should stop the page from rendering anything else.
    pub fn is_fatal_for_page(&self) -> bool {
        matches!(
            self,
            DashError::SourceNotFound(_) | DashError::Csv { .. } | DashError::MissingColumns(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, DashError>;

/// A usable result that may come with an informational notice.
#[derive(Debug)]
pub struct Partial<T> {
    pub value: T,
    pub notice: Option<DashError>,
}

impl<T> Partial<T> {
    pub fn complete(value: T) -> Self {
        Self { value, notice: None }
    }

    pub fn with_notice(value: T, notice: DashError) -> Self {
        Self {
            value,
            notice: Some(notice),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_errors_halt_the_page() {
        assert!(DashError::SourceNotFound(PathBuf::from("x.csv")).is_fatal_for_page());
        assert!(DashError::MissingColumns(vec!["season".into()]).is_fatal_for_page());
        assert!(!DashError::EmptyResult.is_fatal_for_page());
        assert!(!DashError::InsufficientColumns { valid: 1 }.is_fatal_for_page());
    }

    #[test]
    fn messages_name_the_problem() {
        let err = DashError::MissingColumns(vec!["season".into(), "player_height".into()]);
        assert_eq!(
            err.to_string(),
            "data file is missing required column(s): season, player_height"
        );
        let err = DashError::InsufficientData {
            needed: 10,
            available: 4,
        };
        assert_eq!(err.to_string(), "insufficient data: needed 10, found 4");
    }
}
