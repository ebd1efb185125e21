//! Shapes of a column: histogram bins, box-plot summary, trend line and
//! category frequencies. These feed the charts directly.

use serde::Serialize;

use super::describe::frequencies;
use crate::data::model::{CellValue, Table};

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bin {
    pub lo: f64,
    pub hi: f64,
    pub count: usize,
    /// `count / (n * width)`, so the bar areas sum to one.
    pub density: f64,
}

impl Bin {
    pub fn center(&self) -> f64 {
        (self.lo + self.hi) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.hi - self.lo
    }
}

/// Equal-width bins over `[min, max]` of the finite values; the last bin is
/// closed on the right. A constant sample gets one bin of width 1 centred
/// on its value.
pub fn histogram(values: &[f64], bins: usize) -> Vec<Bin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return Vec::new();
    }
    let n = finite.len() as f64;
    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if max == min {
        return vec![Bin {
            lo: min - 0.5,
            hi: min + 0.5,
            count: finite.len(),
            density: 1.0,
        }];
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for v in &finite {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| Bin {
            lo: min + i as f64 * width,
            hi: min + (i + 1) as f64 * width,
            count,
            density: count as f64 / (n * width),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Box plot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxSummary {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Smallest value within 1.5 IQR below `q1`.
    pub lower_whisker: f64,
    /// Largest value within 1.5 IQR above `q3`.
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

pub fn box_summary(values: &[f64]) -> Option<BoxSummary> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    let q1 = quantile(&sorted, 0.25);
    let median = quantile(&sorted, 0.5);
    let q3 = quantile(&sorted, 0.75);
    let iqr = q3 - q1;
    let (low_fence, high_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

    let mut lower_whisker = f64::INFINITY;
    let mut upper_whisker = f64::NEG_INFINITY;
    let mut outliers = Vec::new();
    for &v in &sorted {
        if v < low_fence || v > high_fence {
            outliers.push(v);
        } else {
            lower_whisker = lower_whisker.min(v);
            upper_whisker = upper_whisker.max(v);
        }
    }

    Some(BoxSummary {
        q1,
        median,
        q3,
        lower_whisker,
        upper_whisker,
        outliers,
    })
}

/// Linear-interpolation quantile of an ascending, non-empty slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

// ---------------------------------------------------------------------------
// Trend line
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    pub fn at(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// `(x, y)` for every row where both columns have a number.
pub fn paired_values(table: &Table, x: &str, y: &str) -> Vec<(f64, f64)> {
    match (table.numeric_values(x), table.numeric_values(y)) {
        (Some(xs), Some(ys)) => xs
            .into_iter()
            .zip(ys)
            .filter_map(|pair| match pair {
                (Some(a), Some(b)) => Some((a, b)),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Ordinary least squares fit of `y` on `x`. `None` with fewer than two
/// points or when every `x` is the same.
pub fn linear_fit(points: &[(f64, f64)]) -> Option<LinearFit> {
    if points.len() < 2 {
        return None;
    }
    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;
    let (sxy, sxx) = points.iter().fold((0.0, 0.0), |(sxy, sxx), (x, y)| {
        (sxy + (x - mean_x) * (y - mean_y), sxx + (x - mean_x).powi(2))
    });
    if sxx == 0.0 {
        return None;
    }
    let slope = sxy / sxx;
    Some(LinearFit {
        slope,
        intercept: mean_y - slope * mean_x,
    })
}

// ---------------------------------------------------------------------------
// Category frequencies
// ---------------------------------------------------------------------------

/// The `limit` most frequent non-missing values of a column, most frequent
/// first; equal counts keep first-appearance order. Empty when the column
/// is absent.
pub fn value_counts(table: &Table, column: &str, limit: usize) -> Vec<(CellValue, usize)> {
    let Some(cells) = table.column_values(column) else {
        return Vec::new();
    };
    let mut counts = frequencies(cells);
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(limit);
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures;

    #[test]
    fn histogram_covers_every_value() {
        let values = [1.0, 2.0, 2.5, 3.0, 4.0, 5.0];
        let bins = histogram(&values, 4);
        assert_eq!(bins.len(), 4);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), values.len());
        assert_eq!(bins[0].lo, 1.0);
        assert_eq!(bins[3].hi, 5.0);
        // the maximum lands in the last bin
        assert_eq!(bins[3].count, 2);
        let area: f64 = bins.iter().map(|b| b.density * b.width()).sum();
        assert!((area - 1.0).abs() < 1e-12);
    }

    #[test]
    fn histogram_edge_cases() {
        assert!(histogram(&[], 10).is_empty());
        assert!(histogram(&[1.0, 2.0], 0).is_empty());
        let single = histogram(&[7.0, 7.0, 7.0], 5);
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].center(), 7.0);
        assert_eq!(single[0].count, 3);
    }

    #[test]
    fn box_summary_quartiles_and_outliers() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 100.0];
        let b = box_summary(&values).unwrap();
        assert_eq!(b.median, 5.5);
        assert_eq!(b.q1, 3.25);
        assert_eq!(b.q3, 7.75);
        assert_eq!(b.lower_whisker, 1.0);
        assert_eq!(b.upper_whisker, 9.0);
        assert_eq!(b.outliers, vec![100.0]);
        assert!(box_summary(&[]).is_none());
    }

    #[test]
    fn trend_line_through_exact_points() {
        let fit = linear_fit(&[(1.0, 3.0), (2.0, 5.0), (3.0, 7.0)]).unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-12);
        assert!((fit.intercept - 1.0).abs() < 1e-12);
        assert!((fit.at(10.0) - 21.0).abs() < 1e-9);
        assert!(linear_fit(&[(1.0, 1.0)]).is_none());
        assert!(linear_fit(&[(2.0, 1.0), (2.0, 5.0)]).is_none());
    }

    #[test]
    fn pairs_skip_incomplete_rows() {
        let table = fixtures::players();
        let pairs = paired_values(&table, "age", "pts");
        assert_eq!(pairs, vec![(24.0, 20.5), (29.0, 12.0), (31.0, 25.1), (26.0, 25.1)]);
        assert!(paired_values(&table, "age", "reb").is_empty());
    }

    #[test]
    fn value_counts_most_frequent_first() {
        let table = fixtures::players();
        let counts = value_counts(&table, "team_position", 2);
        assert_eq!(
            counts,
            vec![(CellValue::from("C"), 3), (CellValue::from("G"), 2)]
        );
        assert!(value_counts(&table, "country", 8).is_empty());
    }
}
