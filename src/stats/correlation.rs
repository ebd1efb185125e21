use serde::Serialize;

use crate::data::model::Table;
use crate::error::{DashError, Result};

// ---------------------------------------------------------------------------
// Correlation matrix
// ---------------------------------------------------------------------------

/// Pearson correlations between numeric columns, computed on the rows that
/// have a value in every one of them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Row-major, `values[i][j] == values[j][i]`, diagonal 1.0.
    pub values: Vec<Vec<f64>>,
    /// Complete-case rows the coefficients were computed on.
    pub sample_size: usize,
}

impl CorrelationMatrix {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn at(&self, i: usize, j: usize) -> f64 {
        self.values[i][j]
    }

    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        Some(self.values[i][j])
    }
}

/// Correlate the usable columns among `columns`.
///
/// A column is usable when it is in the table, has at least one value and
/// its values are not all equal. Fewer than two usable columns is
/// [`DashError::InsufficientColumns`]. Rows missing any usable column are
/// dropped before computing (complete-case); fewer than two remaining rows
/// is [`DashError::InsufficientData`]. A pair that has no spread on the
/// remaining rows gets `NaN`.
pub fn correlation_matrix(table: &Table, columns: &[&str]) -> Result<CorrelationMatrix> {
    let mut usable: Vec<(&str, Vec<Option<f64>>)> = Vec::new();
    for &name in columns {
        if usable.iter().any(|(n, _)| *n == name) {
            continue;
        }
        let Some(values) = table.numeric_values(name) else {
            continue;
        };
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        if has_spread(&present) {
            usable.push((name, values));
        } else {
            log::debug!("Column '{name}' has no variance, left out of correlation");
        }
    }
    if usable.len() < 2 {
        return Err(DashError::InsufficientColumns {
            valid: usable.len(),
        });
    }

    let complete: Vec<usize> = (0..table.len())
        .filter(|&row| usable.iter().all(|(_, vals)| vals[row].is_some()))
        .collect();
    if complete.len() < 2 {
        return Err(DashError::InsufficientData {
            needed: 2,
            available: complete.len(),
        });
    }

    let samples: Vec<Vec<f64>> = usable
        .iter()
        .map(|(_, vals)| complete.iter().filter_map(|&row| vals[row]).collect())
        .collect();

    let k = samples.len();
    let mut values = vec![vec![1.0; k]; k];
    for i in 0..k {
        for j in (i + 1)..k {
            let r = pearson(&samples[i], &samples[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Ok(CorrelationMatrix {
        columns: usable.iter().map(|(n, _)| n.to_string()).collect(),
        values,
        sample_size: complete.len(),
    })
}

fn has_spread(values: &[f64]) -> bool {
    match values.first() {
        Some(first) => values.iter().any(|v| v != first),
        None => false,
    }
}

/// Pearson correlation coefficient of two equally long samples. `NaN` when
/// either sample has no spread or fewer than two points.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return f64::NAN;
    }
    let mean_x = xs[..n].iter().sum::<f64>() / n as f64;
    let mean_y = ys[..n].iter().sum::<f64>() / n as f64;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    (cov / (var_x * var_y).sqrt()).clamp(-1.0, 1.0)
}

// ---------------------------------------------------------------------------
// Strong pairs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrongPair {
    pub first: String,
    pub second: String,
    pub r: f64,
}

/// Pairs `(i, j)` with `i < j` and `|r| > threshold`, in row-major order.
pub fn strong_pairs(matrix: &CorrelationMatrix, threshold: f64) -> Vec<StrongPair> {
    let k = matrix.len();
    let mut out = Vec::new();
    for i in 0..k {
        for j in (i + 1)..k {
            let r = matrix.at(i, j);
            if r.abs() > threshold {
                out.push(StrongPair {
                    first: matrix.columns[i].clone(),
                    second: matrix.columns[j].clone(),
                    r,
                });
            }
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strength {
    Strong,
    Moderate,
    Weak,
}

impl Strength {
    /// Bucket a coefficient by magnitude: above 0.7 strong, above 0.3
    /// moderate, otherwise (or undefined) weak.
    pub fn of(r: f64) -> Self {
        let m = r.abs();
        if m > 0.7 {
            Strength::Strong
        } else if m > 0.3 {
            Strength::Moderate
        } else {
            Strength::Weak
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Strength::Strong => "strong",
            Strength::Moderate => "moderate",
            Strength::Weak => "weak",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures;

    fn metrics() -> Table {
        fixtures::table(
            &["x", "y", "z", "flat", "label"],
            &[
                &["1", "2", "1", "7", "a"],
                &["2", "4", "", "7", "b"],
                &["3", "6", "3", "7", "c"],
                &["4", "9", "5", "7", "d"],
                &["5", "9", "4", "7", "e"],
            ],
        )
    }

    #[test]
    fn matrix_is_symmetric_with_unit_diagonal() {
        let m = correlation_matrix(&fixtures::players(), &["player_height", "player_weight", "age", "pts"])
            .unwrap();
        assert_eq!(m.len(), 4);
        for i in 0..m.len() {
            assert_eq!(m.at(i, i), 1.0);
            for j in 0..m.len() {
                assert_eq!(m.at(i, j), m.at(j, i));
                assert!((-1.0..=1.0).contains(&m.at(i, j)));
            }
        }
    }

    #[test]
    fn perfectly_linear_columns_correlate_to_one() {
        let table = fixtures::table(
            &["a", "b", "c"],
            &[&["1", "10", "5"], &["2", "20", "4"], &["3", "30", "3"]],
        );
        let m = correlation_matrix(&table, &["a", "b", "c"]).unwrap();
        assert!((m.get("a", "b").unwrap() - 1.0).abs() < 1e-12);
        assert!((m.get("a", "c").unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn uses_complete_cases_only() {
        let table = metrics();
        let m = correlation_matrix(&table, &["x", "y", "z"]).unwrap();
        assert_eq!(m.sample_size, 4);

        // x/y restricted to the rows where z is present too
        let expected = pearson(&[1.0, 3.0, 4.0, 5.0], &[2.0, 6.0, 9.0, 9.0]);
        assert!((m.get("x", "y").unwrap() - expected).abs() < 1e-12);

        let pairwise = pearson(&[1.0, 2.0, 3.0, 4.0, 5.0], &[2.0, 4.0, 6.0, 9.0, 9.0]);
        assert!((expected - pairwise).abs() > 1e-6);
    }

    #[test]
    fn skips_flat_text_and_absent_columns() {
        let table = metrics();
        let m = correlation_matrix(&table, &["flat", "x", "label", "nope", "y", "x"]).unwrap();
        assert_eq!(m.columns, vec!["x", "y"]);
        assert_eq!(m.sample_size, 5);
    }

    #[test]
    fn fewer_than_two_usable_columns_is_reported() {
        let table = metrics();
        let err = correlation_matrix(&table, &["x", "flat"]).unwrap_err();
        assert!(matches!(err, DashError::InsufficientColumns { valid: 1 }));

        let empty = table.head(0);
        let err = correlation_matrix(&empty, &["x", "y"]).unwrap_err();
        assert!(matches!(err, DashError::InsufficientColumns { valid: 0 }));
    }

    #[test]
    fn too_few_complete_rows_is_reported() {
        let table = fixtures::table(
            &["a", "b"],
            &[&["1", ""], &["2", ""], &["", "3"], &["4", "5"]],
        );
        let err = correlation_matrix(&table, &["a", "b"]).unwrap_err();
        assert!(matches!(
            err,
            DashError::InsufficientData {
                needed: 2,
                available: 1
            }
        ));
    }

    #[test]
    fn strong_pairs_are_row_major_and_above_threshold() {
        let m = CorrelationMatrix {
            columns: vec!["a".into(), "b".into(), "c".into()],
            values: vec![
                vec![1.0, 0.9, -0.8],
                vec![0.9, 1.0, 0.5],
                vec![-0.8, 0.5, 1.0],
            ],
            sample_size: 10,
        };
        let pairs = strong_pairs(&m, 0.7);
        let names: Vec<(&str, &str)> = pairs
            .iter()
            .map(|p| (p.first.as_str(), p.second.as_str()))
            .collect();
        assert_eq!(names, vec![("a", "b"), ("a", "c")]);
        assert_eq!(pairs[1].r, -0.8);

        // strictly greater than
        assert_eq!(strong_pairs(&m, 0.9).len(), 0);
    }

    #[test]
    fn raising_the_threshold_never_adds_pairs() {
        let m = correlation_matrix(&fixtures::players(), &["player_height", "player_weight", "age", "pts"])
            .unwrap();
        let mut previous = usize::MAX;
        for step in 0..=10 {
            let found = strong_pairs(&m, step as f64 / 10.0);
            assert!(found.len() <= previous);
            assert!(found.iter().all(|p| p.r.abs() > step as f64 / 10.0));
            previous = found.len();
        }
    }

    #[test]
    fn strength_buckets_by_magnitude() {
        assert_eq!(Strength::of(0.85), Strength::Strong);
        assert_eq!(Strength::of(-0.85), Strength::Strong);
        assert_eq!(Strength::of(0.5), Strength::Moderate);
        assert_eq!(Strength::of(0.1), Strength::Weak);
        assert_eq!(Strength::of(f64::NAN), Strength::Weak);
    }
}
