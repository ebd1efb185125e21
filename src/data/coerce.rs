use super::model::{CellValue, ColumnKind, Field, Table};

/// Columns the pages treat as numbers before aggregating.
pub const NUMERIC_FIELDS: [Field; 7] = [
    Field::PlayerHeight,
    Field::PlayerWeight,
    Field::Age,
    Field::DraftYear,
    Field::Points,
    Field::Rebounds,
    Field::Assists,
];

pub fn numeric_field_names() -> Vec<&'static str> {
    NUMERIC_FIELDS.iter().map(|f| f.name()).collect()
}

/// Return a copy of `table` where each named column is numeric.
///
/// Text that parses as a finite number becomes a number, everything else
/// becomes [`CellValue::Missing`]. Columns not in the table are skipped.
/// Columns that are already numeric come through unchanged.
pub fn coerce(table: &Table, columns: &[&str]) -> Table {
    let mut out = table.clone();
    let targets: Vec<usize> = columns
        .iter()
        .filter_map(|name| out.column_index(name))
        .collect();
    if targets.is_empty() {
        return out;
    }

    let (defs, records) = out.parts_mut();
    for &idx in &targets {
        if defs[idx].kind == ColumnKind::Numeric {
            continue;
        }
        let mut failures = 0usize;
        for record in records.iter_mut() {
            let cell = &mut record.values_mut()[idx];
            let parsed = match cell {
                CellValue::Text(raw) => Some(CellValue::parse_number(raw)),
                _ => None,
            };
            match parsed {
                Some(Some(number)) => *cell = number,
                Some(None) => {
                    failures += 1;
                    *cell = CellValue::Missing;
                }
                None => {}
            }
        }
        defs[idx].kind = ColumnKind::Numeric;
        if failures > 0 {
            log::debug!(
                "Coerced column '{}': {failures} value(s) were not numeric",
                defs[idx].name
            );
        }
    }
    for &idx in &targets {
        out.unify_numbers(idx);
    }
    out
}
