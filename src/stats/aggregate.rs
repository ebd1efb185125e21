use std::collections::BTreeMap;

use serde::Serialize;

use crate::data::model::{CellValue, ColumnDef, ColumnKind, Record, Table};
use crate::error::{DashError, Partial, Result};

/// Name of the record-count column in [`GroupMeans::to_table`].
pub const COUNT_COLUMN: &str = "count";

// ---------------------------------------------------------------------------
// Group-by means
// ---------------------------------------------------------------------------

/// One group of a [`GroupMeans`] result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRow {
    pub key: CellValue,
    /// Records in the group, whether or not their metrics are present.
    pub count: usize,
    /// Mean per value column; `None` when the group has no values for it.
    pub means: Vec<Option<f64>>,
    /// Non-missing observations per value column.
    pub valid: Vec<usize>,
}

/// Per-group means, ordered by the natural order of the group key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMeans {
    pub group_column: String,
    pub value_columns: Vec<String>,
    pub rows: Vec<GroupRow>,
    #[serde(skip)]
    group_kind: ColumnKind,
}

impl GroupMeans {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(key, mean)` pairs of one value column, skipping groups without a
    /// mean. `None` if the column was not aggregated.
    pub fn series(&self, column: &str) -> Option<Vec<(&CellValue, f64)>> {
        let idx = self.value_columns.iter().position(|c| c == column)?;
        Some(
            self.rows
                .iter()
                .filter_map(|row| row.means[idx].map(|m| (&row.key, m)))
                .collect(),
        )
    }

    pub fn mean_for(&self, key: &CellValue, column: &str) -> Option<f64> {
        let idx = self.value_columns.iter().position(|c| c == column)?;
        self.rows.iter().find(|r| &r.key == key)?.means[idx]
    }

    /// Render as a table: the key column, one mean column per value column,
    /// then [`COUNT_COLUMN`].
    pub fn to_table(&self) -> Table {
        let mut columns = vec![ColumnDef::new(self.group_column.clone(), self.group_kind)];
        columns.extend(
            self.value_columns
                .iter()
                .map(|c| ColumnDef::new(c.clone(), ColumnKind::Numeric)),
        );
        columns.push(ColumnDef::new(COUNT_COLUMN, ColumnKind::Numeric));

        let records = self
            .rows
            .iter()
            .map(|row| {
                let mut values = vec![row.key.clone()];
                values.extend(
                    row.means
                        .iter()
                        .map(|m| m.map(CellValue::Float).unwrap_or(CellValue::Missing)),
                );
                values.push(CellValue::Integer(row.count as i64));
                Record::new(values)
            })
            .collect();
        Table::new(columns, records)
    }
}

#[derive(Default)]
struct Accumulator {
    count: usize,
    sums: Vec<f64>,
    valid: Vec<usize>,
}

/// Group rows by the exact value of `group_column` and average each value
/// column over its non-missing values.
///
/// Rows whose key is missing are not grouped. Keys keep their original
/// labels, so seasons like `"2019-20"` sort lexicographically.
pub fn group_mean(table: &Table, group_column: &str, value_columns: &[&str]) -> Result<GroupMeans> {
    let key_def = table
        .column_def(group_column)
        .ok_or_else(|| DashError::UnknownColumn(group_column.to_string()))?;
    let key_idx = table
        .column_index(group_column)
        .ok_or_else(|| DashError::UnknownColumn(group_column.to_string()))?;
    let value_idx: Vec<usize> = value_columns
        .iter()
        .map(|c| {
            table
                .column_index(c)
                .ok_or_else(|| DashError::UnknownColumn(c.to_string()))
        })
        .collect::<Result<_>>()?;

    let width = value_idx.len();
    let mut groups: BTreeMap<CellValue, Accumulator> = BTreeMap::new();
    for record in table.records() {
        let key = &record.values()[key_idx];
        if key.is_missing() {
            continue;
        }
        let acc = groups.entry(key.clone()).or_insert_with(|| Accumulator {
            count: 0,
            sums: vec![0.0; width],
            valid: vec![0; width],
        });
        acc.count += 1;
        for (slot, &idx) in value_idx.iter().enumerate() {
            if let Some(v) = record.values()[idx].as_f64() {
                acc.sums[slot] += v;
                acc.valid[slot] += 1;
            }
        }
    }

    let rows = groups
        .into_iter()
        .map(|(key, acc)| GroupRow {
            key,
            count: acc.count,
            means: acc
                .sums
                .iter()
                .zip(&acc.valid)
                .map(|(&sum, &n)| (n > 0).then(|| sum / n as f64))
                .collect(),
            valid: acc.valid,
        })
        .collect();

    Ok(GroupMeans {
        group_column: group_column.to_string(),
        value_columns: value_columns.iter().map(|c| c.to_string()).collect(),
        rows,
        group_kind: key_def.kind,
    })
}

// ---------------------------------------------------------------------------
// Top-N ranking
// ---------------------------------------------------------------------------

/// The `n` rows with the greatest value of `column`, highest first.
///
/// Rows missing the value are dropped before ranking; ties keep their
/// original row order. When fewer than `n` rows qualify, all of them are
/// returned together with an [`DashError::InsufficientData`] notice.
pub fn top_n(table: &Table, column: &str, n: usize) -> Result<Partial<Table>> {
    let idx = table
        .column_index(column)
        .ok_or_else(|| DashError::UnknownColumn(column.to_string()))?;

    let mut ranked: Vec<(usize, f64)> = table
        .records()
        .iter()
        .enumerate()
        .filter_map(|(i, r)| r.get(idx).and_then(CellValue::as_f64).map(|v| (i, v)))
        .collect();
    // sort_by is stable, so equal values stay in row order
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    let available = ranked.len();
    let picked: Vec<usize> = ranked.iter().take(n).map(|(i, _)| *i).collect();
    let result = table.select(&picked);

    if available < n {
        Ok(Partial::with_notice(
            result,
            DashError::InsufficientData {
                needed: n,
                available,
            },
        ))
    } else {
        Ok(Partial::complete(result))
    }
}
