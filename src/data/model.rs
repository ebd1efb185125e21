use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell, the way a dataframe column would hold it.
/// Used as a `BTreeMap` / `BTreeSet` key downstream so it must be `Ord`.
/// Floats are always finite; anything else is stored as `Missing`.
///
/// `Integer` and `Float` are one kind for comparison: `Integer(2)` equals
/// `Float(2.0)` and numbers sort by value.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Missing,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> Ordering {
        use CellValue::*;
        fn rank(v: &CellValue) -> u8 {
            match v {
                Missing => 0,
                Integer(_) | Float(_) => 1,
                Text(_) => 2,
            }
        }
        match (self, other) {
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => float_cmp(*a, *b),
            (Integer(a), Float(b)) => int_float_cmp(*a, *b),
            (Float(a), Integer(b)) => int_float_cmp(*b, *a).reverse(),
            (Text(a), Text(b)) => a.cmp(b),
            _ => rank(self).cmp(&rank(other)),
        }
    }
}

/// Floats are finite, so `partial_cmp` is total and treats `-0.0 == 0.0`.
fn float_cmp(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or_else(|| a.total_cmp(&b))
}

/// Exact comparison of an integer with a float, without rounding the
/// integer through `f64`.
fn int_float_cmp(i: i64, f: f64) -> Ordering {
    match integral(f) {
        Some(whole) => i.cmp(&whole),
        None if f >= I64_BOUND => Ordering::Less,
        None if f < -I64_BOUND => Ordering::Greater,
        // a fractional float is below 2^52 in magnitude, where the cast is exact
        None => float_cmp(i as f64, f),
    }
}

/// 2^63: every float in `[-2^63, 2^63)` with no fractional part fits an `i64`.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

fn integral(f: f64) -> Option<i64> {
    (f.fract() == 0.0 && (-I64_BOUND..I64_BOUND).contains(&f)).then_some(f as i64)
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        // equal numbers must hash alike whichever variant holds them
        match self {
            CellValue::Missing => 0u8.hash(state),
            CellValue::Integer(i) => {
                1u8.hash(state);
                i.hash(state);
            }
            CellValue::Float(f) => match integral(*f) {
                Some(i) => {
                    1u8.hash(state);
                    i.hash(state);
                }
                None => {
                    2u8.hash(state);
                    f.to_bits().hash(state);
                }
            },
            CellValue::Text(s) => {
                3u8.hash(state);
                s.hash(state);
            }
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Missing => write!(f, "NA"),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl CellValue {
    /// Numeric view of the cell. Text is *not* parsed here; that is the job
    /// of [`crate::data::coerce`].
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }

    /// Parse a raw string as a finite number. `"nan"`, `"inf"` and friends
    /// are rejected.
    pub fn parse_number(raw: &str) -> Option<CellValue> {
        let s = raw.trim();
        if s.is_empty() {
            return None;
        }
        if let Ok(i) = s.parse::<i64>() {
            return Some(CellValue::Integer(i));
        }
        match s.parse::<f64>() {
            // normalise -0.0 so equality and ordering agree
            Ok(v) if v == 0.0 => Some(CellValue::Float(0.0)),
            Ok(v) if v.is_finite() => Some(CellValue::Float(v)),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDef {
    pub name: String,
    pub kind: ColumnKind,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Columns the dashboard knows about. Only the first four are guaranteed to
/// be present in a loaded table; check the rest with [`Table::has`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    PlayerName,
    Season,
    PlayerHeight,
    PlayerWeight,
    Age,
    Points,
    Rebounds,
    Assists,
    TeamPosition,
    Country,
    DraftRound,
    DraftYear,
}

impl Field {
    pub const REQUIRED: [Field; 4] = [
        Field::PlayerName,
        Field::Season,
        Field::PlayerHeight,
        Field::PlayerWeight,
    ];

    /// Performance and physical metrics offered in metric pickers.
    pub const METRICS: [Field; 6] = [
        Field::PlayerHeight,
        Field::PlayerWeight,
        Field::Age,
        Field::Points,
        Field::Rebounds,
        Field::Assists,
    ];

    /// Categorical attributes offered in metric pickers.
    pub const CATEGORIES: [Field; 3] = [Field::TeamPosition, Field::Country, Field::DraftRound];

    pub const ALL: [Field; 12] = [
        Field::PlayerName,
        Field::Season,
        Field::PlayerHeight,
        Field::PlayerWeight,
        Field::Age,
        Field::Points,
        Field::Rebounds,
        Field::Assists,
        Field::TeamPosition,
        Field::Country,
        Field::DraftRound,
        Field::DraftYear,
    ];

    pub fn from_name(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.name() == name)
    }

    /// Axis label for a column name, known or not.
    pub fn label_for(name: &str) -> String {
        Field::from_name(name)
            .map(|f| f.label().to_string())
            .unwrap_or_else(|| name.replace('_', " "))
    }

    pub fn name(self) -> &'static str {
        match self {
            Field::PlayerName => "player_name",
            Field::Season => "season",
            Field::PlayerHeight => "player_height",
            Field::PlayerWeight => "player_weight",
            Field::Age => "age",
            Field::Points => "pts",
            Field::Rebounds => "reb",
            Field::Assists => "ast",
            Field::TeamPosition => "team_position",
            Field::Country => "country",
            Field::DraftRound => "draft_round",
            Field::DraftYear => "draft_year",
        }
    }

    /// Human-readable axis label.
    pub fn label(self) -> &'static str {
        match self {
            Field::PlayerName => "Player",
            Field::Season => "Season",
            Field::PlayerHeight => "Height (cm)",
            Field::PlayerWeight => "Weight (kg)",
            Field::Age => "Age",
            Field::Points => "Points",
            Field::Rebounds => "Rebounds",
            Field::Assists => "Assists",
            Field::TeamPosition => "Position",
            Field::Country => "Country",
            Field::DraftRound => "Draft round",
            Field::DraftYear => "Draft year",
        }
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the table
// ---------------------------------------------------------------------------

/// One player-season observation, aligned to the owning table's columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    values: Vec<CellValue>,
}

impl Record {
    pub fn new(values: Vec<CellValue>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[CellValue] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<&CellValue> {
        self.values.get(index)
    }

    pub(crate) fn values_mut(&mut self) -> &mut [CellValue] {
        &mut self.values
    }
}

// ---------------------------------------------------------------------------
// Table – the complete loaded dataset (or a view derived from it)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<ColumnDef>,
    records: Vec<Record>,
}

impl Table {
    pub fn new(columns: Vec<ColumnDef>, records: Vec<Record>) -> Self {
        debug_assert!(records.iter().all(|r| r.values.len() == columns.len()));
        Self { columns, records }
    }

    /// Build a table from raw string cells, inferring each column's kind.
    ///
    /// A column is numeric when every non-empty cell parses as a finite
    /// number; otherwise every non-empty cell is kept as text. Empty cells
    /// are missing in both cases. Columns with an empty header (a written-out
    /// dataframe index) are dropped.
    pub fn from_raw<S: AsRef<str>>(headers: &[S], rows: Vec<Vec<String>>) -> Self {
        let kept: Vec<usize> = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !h.as_ref().trim().is_empty())
            .map(|(i, _)| i)
            .collect();

        let cell = |row: &Vec<String>, i: usize| -> String {
            row.get(i).map(|s| s.trim().to_string()).unwrap_or_default()
        };

        let columns: Vec<ColumnDef> = kept
            .iter()
            .map(|&i| {
                let numeric = rows.iter().all(|row| {
                    let s = cell(row, i);
                    s.is_empty() || CellValue::parse_number(&s).is_some()
                });
                let kind = if numeric {
                    ColumnKind::Numeric
                } else {
                    ColumnKind::Categorical
                };
                ColumnDef::new(headers[i].as_ref().trim(), kind)
            })
            .collect();

        let records = rows
            .iter()
            .map(|row| {
                let values = kept
                    .iter()
                    .zip(&columns)
                    .map(|(&i, def)| {
                        let s = cell(row, i);
                        if s.is_empty() {
                            CellValue::Missing
                        } else if def.kind == ColumnKind::Numeric {
                            CellValue::parse_number(&s).unwrap_or(CellValue::Missing)
                        } else {
                            CellValue::Text(s)
                        }
                    })
                    .collect();
                Record::new(values)
            })
            .collect();

        let mut table = Table { columns, records };
        for idx in 0..table.columns.len() {
            if table.columns[idx].kind == ColumnKind::Numeric {
                table.unify_numbers(idx);
            }
        }
        table
    }

    /// Give a numeric column a single representation, as a dataframe dtype
    /// would: once any cell is a `Float`, every `Integer` becomes one too.
    pub(crate) fn unify_numbers(&mut self, idx: usize) {
        let has_float = self
            .records
            .iter()
            .any(|r| matches!(r.values.get(idx), Some(CellValue::Float(_))));
        if !has_float {
            return;
        }
        for record in &mut self.records {
            if let Some(cell) = record.values.get_mut(idx) {
                if let CellValue::Integer(i) = *cell {
                    *cell = CellValue::Float(i as f64);
                }
            }
        }
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column_def(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has(&self, field: Field) -> bool {
        self.column_index(field.name()).is_some()
    }

    /// Names of the numeric columns, in schema order.
    pub fn numeric_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.kind == ColumnKind::Numeric)
            .map(|c| c.name.as_str())
            .collect()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&CellValue> {
        let idx = self.column_index(column)?;
        self.records.get(row)?.get(idx)
    }

    /// Every cell of a column, `None` when the column is absent.
    pub fn column_values(&self, name: &str) -> Option<Vec<&CellValue>> {
        let idx = self.column_index(name)?;
        Some(self.records.iter().map(|r| &r.values[idx]).collect())
    }

    /// Numeric view of a column, one entry per row.
    pub fn numeric_values(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let idx = self.column_index(name)?;
        Some(self.records.iter().map(|r| r.values[idx].as_f64()).collect())
    }

    /// The non-missing numeric values of a column. Empty when absent.
    pub fn present_values(&self, name: &str) -> Vec<f64> {
        self.numeric_values(name)
            .map(|vals| vals.into_iter().flatten().collect())
            .unwrap_or_default()
    }

    /// Sorted distinct non-missing values of a column.
    pub fn unique_values(&self, name: &str) -> Option<BTreeSet<CellValue>> {
        let idx = self.column_index(name)?;
        Some(
            self.records
                .iter()
                .map(|r| &r.values[idx])
                .filter(|v| !v.is_missing())
                .cloned()
                .collect(),
        )
    }

    /// Number of distinct non-missing values, e.g. unique players.
    pub fn unique_count(&self, name: &str) -> Option<usize> {
        self.unique_values(name).map(|set| set.len())
    }

    /// New table holding the given rows, in the given order.
    pub fn select(&self, indices: &[usize]) -> Table {
        Table {
            columns: self.columns.clone(),
            records: indices.iter().map(|&i| self.records[i].clone()).collect(),
        }
    }

    /// The first `n` rows.
    pub fn head(&self, n: usize) -> Table {
        Table {
            columns: self.columns.clone(),
            records: self.records.iter().take(n).cloned().collect(),
        }
    }

    pub(crate) fn parts_mut(&mut self) -> (&mut [ColumnDef], &mut [Record]) {
        (&mut self.columns, &mut self.records)
    }
}
