use std::collections::BTreeSet;

use super::model::{CellValue, Field, Record, Table};

// ---------------------------------------------------------------------------
// Filter predicates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// Keep rows whose value is in the set. An empty set means "no filter"
    /// (show all), not "nothing matches".
    Members(BTreeSet<CellValue>),
    /// Keep rows with `min <= value <= max`. Missing and non-numeric values
    /// never match.
    Range { min: f64, max: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub column: String,
    pub constraint: Constraint,
}

impl Predicate {
    pub fn members<I, V>(column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        Self {
            column: column.into(),
            constraint: Constraint::Members(values.into_iter().map(Into::into).collect()),
        }
    }

    pub fn range(column: impl Into<String>, min: f64, max: f64) -> Self {
        Self {
            column: column.into(),
            constraint: Constraint::Range { min, max },
        }
    }

    fn accepts(&self, value: &CellValue) -> bool {
        match &self.constraint {
            Constraint::Members(selected) => selected.is_empty() || selected.contains(value),
            Constraint::Range { min, max } => value
                .as_f64()
                .is_some_and(|v| *min <= v && v <= *max),
        }
    }
}

/// Return indices of rows that pass all predicates.
///
/// A row passes a predicate when:
/// * The predicate's column is not in the table → passes (no constraint)
/// * The predicate is an empty membership set → passes
/// * The row's value satisfies the constraint → passes
pub fn matching_indices(table: &Table, predicates: &[Predicate]) -> Vec<usize> {
    let resolved: Vec<(usize, &Predicate)> = predicates
        .iter()
        .filter_map(|p| table.column_index(&p.column).map(|idx| (idx, p)))
        .collect();

    table
        .records()
        .iter()
        .enumerate()
        .filter(|(_, rec)| row_passes(rec, &resolved))
        .map(|(i, _)| i)
        .collect()
}

fn row_passes(record: &Record, resolved: &[(usize, &Predicate)]) -> bool {
    resolved.iter().all(|(idx, pred)| {
        record
            .get(*idx)
            .is_some_and(|value| pred.accepts(value))
    })
}

/// Apply predicates (logical AND) and return the surviving rows as a new
/// table. The input is left untouched.
pub fn apply(table: &Table, predicates: &[Predicate]) -> Table {
    if predicates.is_empty() {
        return table.clone();
    }
    let keep = matching_indices(table, predicates);
    log::debug!(
        "Filter kept {} of {} rows ({} predicates)",
        keep.len(),
        table.len(),
        predicates.len()
    );
    table.select(&keep)
}

// ---------------------------------------------------------------------------
// Selection: the sidebar choices of a page
// ---------------------------------------------------------------------------

/// User-facing filter choices shared by the summary and exploration pages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    /// Chosen season labels; empty shows every season.
    pub seasons: BTreeSet<String>,
    /// Closed height interval in cm; `None` is the slider's full range,
    /// which still drops rows without a height.
    pub height: Option<(f64, f64)>,
}

impl Selection {
    /// Default choices for a freshly loaded table: the first
    /// `season_count` seasons in sort order and no height constraint.
    pub fn initial(table: &Table, season_count: usize) -> Self {
        Self {
            seasons: available_seasons(table)
                .into_iter()
                .take(season_count)
                .collect(),
            height: None,
        }
    }

    pub fn predicates(&self) -> Vec<Predicate> {
        let mut preds = vec![Predicate::members(
            Field::Season.name(),
            self.seasons.iter().map(String::as_str),
        )];
        let (min, max) = self.height.unwrap_or((f64::NEG_INFINITY, f64::INFINITY));
        preds.push(Predicate::range(Field::PlayerHeight.name(), min, max));
        preds
    }

    /// Toggle a single season in the selection.
    pub fn toggle_season(&mut self, season: &str) {
        if !self.seasons.remove(season) {
            self.seasons.insert(season.to_string());
        }
    }
}

/// Sorted distinct season labels of a table.
pub fn available_seasons(table: &Table) -> Vec<String> {
    table
        .unique_values(Field::Season.name())
        .map(|vals| vals.iter().map(|v| v.to_string()).collect())
        .unwrap_or_default()
}

/// Whole-number bounds of the height column, as a slider would offer them.
pub fn height_bounds(table: &Table) -> Option<(f64, f64)> {
    let heights = table.present_values(Field::PlayerHeight.name());
    let min = heights.iter().copied().fold(f64::INFINITY, f64::min);
    let max = heights.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if heights.is_empty() {
        None
    } else {
        Some((min.floor(), max.ceil()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures;

    fn heights(table: &Table) -> Vec<f64> {
        table.present_values("player_height")
    }

    #[test]
    fn range_is_inclusive_on_both_ends() {
        let table = fixtures::seasons();
        let out = apply(&table, &[Predicate::range("player_height", 200.0, 210.0)]);
        assert_eq!(heights(&out), vec![201.0, 205.0]);

        let out = apply(&table, &[Predicate::range("player_height", 198.0, 201.0)]);
        assert_eq!(heights(&out), vec![201.0, 198.0]);
    }

    #[test]
    fn range_excludes_missing_values() {
        let table = fixtures::players();
        let out = apply(&table, &[Predicate::range("pts", 0.0, 100.0)]);
        assert_eq!(out.len(), 5);
        assert!(out.column_values("pts").unwrap().iter().all(|v| !v.is_missing()));
    }

    #[test]
    fn empty_membership_keeps_everything() {
        let table = fixtures::players();
        let none: [&str; 0] = [];
        let out = apply(&table, &[Predicate::members("season", none)]);
        assert_eq!(out, table);
    }

    #[test]
    fn membership_is_or_within_the_set() {
        let table = fixtures::players();
        let out = apply(&table, &[Predicate::members("season", ["2019-20", "2021-22"])]);
        assert_eq!(out.len(), 4);
        assert_eq!(
            out.unique_values("season").unwrap().len(),
            2
        );
    }

    #[test]
    fn numeric_membership_matches_by_value() {
        let table = fixtures::table(&["age"], &[&["1.5"], &["10"], &["2"], &["2.0"]]);
        let out = apply(&table, &[Predicate::members("age", [CellValue::Float(2.0)])]);
        assert_eq!(out.len(), 2);
        let out = apply(&table, &[Predicate::members("age", [CellValue::Integer(10)])]);
        assert_eq!(out.present_values("age"), vec![10.0]);
    }

    #[test]
    fn default_height_range_drops_rows_without_height() {
        let table = fixtures::table(
            &["player_name", "season", "player_height"],
            &[&["A", "2019-20", "201"], &["B", "2019-20", ""], &["C", "2019-20", "188"]],
        );
        let sel = Selection::initial(&table, 3);
        assert_eq!(sel.height, None);
        let out = apply(&table, &sel.predicates());
        assert_eq!(heights(&out), vec![201.0, 188.0]);
    }

    #[test]
    fn empty_predicate_set_is_identity() {
        let table = fixtures::players();
        assert_eq!(apply(&table, &[]), table);
    }

    #[test]
    fn composition_matches_union_in_any_order() {
        let table = fixtures::players();
        let p1 = vec![Predicate::members("season", ["2019-20", "2020-21"])];
        let p2 = vec![
            Predicate::range("player_height", 195.0, 210.0),
            Predicate::members("team_position", ["C"]),
        ];
        let union: Vec<Predicate> = p1.iter().chain(&p2).cloned().collect();
        let reversed: Vec<Predicate> = union.iter().rev().cloned().collect();

        let stepwise = apply(&apply(&table, &p1), &p2);
        let swapped = apply(&apply(&table, &p2), &p1);
        assert_eq!(stepwise, apply(&table, &union));
        assert_eq!(swapped, stepwise);
        assert_eq!(apply(&table, &reversed), stepwise);
        assert_eq!(stepwise.len(), 2);
    }

    #[test]
    fn absent_columns_impose_no_constraint() {
        let table = fixtures::seasons();
        let out = apply(&table, &[Predicate::members("country", ["USA"])]);
        assert_eq!(out, table);
    }

    #[test]
    fn filters_can_empty_the_table() {
        let table = fixtures::seasons();
        let out = apply(&table, &[Predicate::range("player_height", 300.0, 400.0)]);
        assert!(out.is_empty());
        assert!(out.column_names().eq(table.column_names()));
    }

    #[test]
    fn selection_defaults_to_first_seasons() {
        let table = fixtures::players();
        let sel = Selection::initial(&table, 2);
        let seasons: Vec<&str> = sel.seasons.iter().map(String::as_str).collect();
        assert_eq!(seasons, vec!["2019-20", "2020-21"]);
        assert_eq!(apply(&table, &sel.predicates()).len(), 4);
    }

    #[test]
    fn selection_height_and_toggle() {
        let table = fixtures::players();
        let mut sel = Selection::default();
        sel.height = Some((195.0, 205.0));
        assert_eq!(apply(&table, &sel.predicates()).len(), 3);

        sel.toggle_season("2021-22");
        assert_eq!(apply(&table, &sel.predicates()).len(), 0);
        sel.toggle_season("2021-22");
        assert!(sel.seasons.is_empty());
    }

    #[test]
    fn height_bounds_round_outwards() {
        let table = fixtures::table(
            &["player_height"],
            &[&["190.5"], &["210.2"], &[""]],
        );
        assert_eq!(height_bounds(&table), Some((190.0, 211.0)));
        assert_eq!(height_bounds(&table.head(0)), None);
    }
}
