//! Descriptive statistics for a single column.

use std::collections::HashMap;

use serde::Serialize;

use crate::data::model::{CellValue, ColumnKind, Table};
use crate::error::{DashError, Result};

/// Summary of a numeric column over its non-missing values.
///
/// Fields that are undefined for the sample (everything when it is empty,
/// `std` when it has a single value) are `NaN`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation (n - 1 denominator).
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl NumericSummary {
    pub fn from_values(values: &[f64]) -> Self {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        let count = finite.len();
        if count == 0 {
            return Self {
                count,
                mean: f64::NAN,
                median: f64::NAN,
                std: f64::NAN,
                min: f64::NAN,
                max: f64::NAN,
            };
        }

        let mean = finite.iter().sum::<f64>() / count as f64;
        let std = if count < 2 {
            f64::NAN
        } else {
            let ss: f64 = finite.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (count - 1) as f64).sqrt()
        };

        let mut sorted = finite;
        sorted.sort_by(|a, b| a.total_cmp(b));
        let median = if count % 2 == 0 {
            (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
        } else {
            sorted[count / 2]
        };

        Self {
            count,
            mean,
            median,
            std,
            min: sorted[0],
            max: sorted[count - 1],
        }
    }
}

/// Summary of a categorical column over its non-missing values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalSummary {
    pub unique_count: usize,
    /// Most frequent value; on a tie, the one seen first in row order.
    pub mode: Option<CellValue>,
    pub mode_count: usize,
}

impl CategoricalSummary {
    pub fn from_values<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a CellValue>,
    {
        let counts = frequencies(values);
        let mut mode: Option<&(CellValue, usize)> = None;
        for entry in &counts {
            if mode.map_or(true, |best| entry.1 > best.1) {
                mode = Some(entry);
            }
        }
        Self {
            unique_count: counts.len(),
            mode: mode.map(|(v, _)| v.clone()),
            mode_count: mode.map_or(0, |(_, n)| *n),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Description {
    Numeric(NumericSummary),
    Categorical(CategoricalSummary),
}

/// Describe one column according to its kind.
pub fn describe(table: &Table, column: &str) -> Result<Description> {
    let def = table
        .column_def(column)
        .ok_or_else(|| DashError::UnknownColumn(column.to_string()))?;
    match def.kind {
        ColumnKind::Numeric => Ok(Description::Numeric(NumericSummary::from_values(
            &table.present_values(column),
        ))),
        ColumnKind::Categorical => {
            let cells = table.column_values(column).unwrap_or_default();
            Ok(Description::Categorical(CategoricalSummary::from_values(
                cells.into_iter(),
            )))
        }
    }
}

/// Numeric summary of every numeric column, in schema order.
pub fn describe_numeric_columns(table: &Table) -> Vec<(String, NumericSummary)> {
    table
        .numeric_columns()
        .into_iter()
        .map(|name| {
            (
                name.to_string(),
                NumericSummary::from_values(&table.present_values(name)),
            )
        })
        .collect()
}

/// [`describe_numeric_columns`] as a pretty-printed JSON object keyed by
/// column name. Undefined statistics serialize as `null`.
pub fn statistics_json(table: &Table) -> serde_json::Result<String> {
    let described: serde_json::Map<String, serde_json::Value> = describe_numeric_columns(table)
        .into_iter()
        .map(|(name, s)| Ok((name, serde_json::to_value(s)?)))
        .collect::<serde_json::Result<_>>()?;
    serde_json::to_string_pretty(&described)
}

/// Occurrences of each non-missing value, in order of first appearance.
pub(crate) fn frequencies<'a, I>(values: I) -> Vec<(CellValue, usize)>
where
    I: IntoIterator<Item = &'a CellValue>,
{
    let mut slots: HashMap<&'a CellValue, usize> = HashMap::new();
    let mut counts: Vec<(CellValue, usize)> = Vec::new();
    for value in values {
        if value.is_missing() {
            continue;
        }
        match slots.get(value) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                slots.insert(value, counts.len());
                counts.push((value.clone(), 1));
            }
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures;

    #[test]
    fn statistics_export_is_keyed_by_column() {
        let json = statistics_json(&fixtures::players()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["player_weight"]["count"], 6);
        assert_eq!(parsed["pts"]["count"], 5);
        // team_position is text and not exported
        assert!(parsed.get("team_position").is_none());
    }

    #[test]
    fn weight_example() {
        let table = fixtures::seasons();
        let Description::Numeric(s) = describe(&table, "player_weight").unwrap() else {
            panic!("weight should be numeric");
        };
        assert_eq!(s.count, 3);
        assert_eq!(s.mean, 95.0);
        assert_eq!(s.median, 95.0);
        assert!((s.std - 5.0).abs() < 1e-12);
        assert_eq!(s.min, 90.0);
        assert_eq!(s.max, 100.0);
    }

    #[test]
    fn count_reflects_non_missing_values() {
        let table = fixtures::players();
        let Description::Numeric(s) = describe(&table, "pts").unwrap() else {
            panic!("pts should be numeric");
        };
        assert_eq!(s.count, 5);
        assert_eq!(s.median, 20.5);
    }

    #[test]
    fn single_value_has_no_std() {
        let s = NumericSummary::from_values(&[42.0]);
        assert_eq!(s.count, 1);
        assert_eq!(s.mean, 42.0);
        assert!(s.std.is_nan());
    }

    #[test]
    fn empty_column_is_all_nan() {
        let s = NumericSummary::from_values(&[]);
        assert_eq!(s.count, 0);
        assert!(s.mean.is_nan() && s.median.is_nan() && s.min.is_nan() && s.max.is_nan());
    }

    #[test]
    fn even_count_median_averages_the_middle() {
        let s = NumericSummary::from_values(&[4.0, 1.0, 3.0, 2.0]);
        assert_eq!(s.median, 2.5);
    }

    #[test]
    fn categorical_mode_and_uniques() {
        let table = fixtures::players();
        let Description::Categorical(s) = describe(&table, "team_position").unwrap() else {
            panic!("team_position should be categorical");
        };
        assert_eq!(s.unique_count, 3);
        assert_eq!(s.mode, Some(CellValue::from("C")));
        assert_eq!(s.mode_count, 3);
    }

    #[test]
    fn mode_ties_go_to_the_first_seen_value() {
        let table = fixtures::table(
            &["country"],
            &[&["Spain"], &["USA"], &["USA"], &["Spain"], &[""], &["France"]],
        );
        let Description::Categorical(s) = describe(&table, "country").unwrap() else {
            panic!("country should be categorical");
        };
        assert_eq!(s.mode, Some(CellValue::from("Spain")));
        assert_eq!(s.mode_count, 2);
        assert_eq!(s.unique_count, 3);
    }

    #[test]
    fn empty_categorical_has_no_mode() {
        let s = CategoricalSummary::from_values(std::iter::empty::<&CellValue>());
        assert_eq!(s.unique_count, 0);
        assert_eq!(s.mode, None);
        assert_eq!(s.mode_count, 0);
    }

    #[test]
    fn unknown_column_is_reported() {
        let table = fixtures::seasons();
        assert!(matches!(
            describe(&table, "reb"),
            Err(DashError::UnknownColumn(_))
        ));
    }

    #[test]
    fn numeric_columns_are_described_in_order() {
        let table = fixtures::players();
        let names: Vec<String> = describe_numeric_columns(&table)
            .into_iter()
            .map(|(n, _)| n)
            .collect();
        assert_eq!(names, vec!["player_height", "player_weight", "age", "pts"]);
    }
}
