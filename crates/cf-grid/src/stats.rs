//! Summary statistics over cleansed values.

use serde::Serialize;

/// Statistics of one variable. Null values are counted but otherwise
/// ignored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableStats {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub sum: f64,
    /// `sum / non-null count`; NaN when every value is null.
    pub mean: f64,
    /// NaN when every value is null.
    pub median: f64,
    pub null_count: usize,
    /// Number of values, nulls included.
    pub count: usize,
}

impl VariableStats {
    /// Compute statistics in one pass plus a sort for the median.
    pub fn compute(values: &[Option<f64>]) -> Self {
        let mut min: Option<f64> = None;
        let mut max: Option<f64> = None;
        let mut sum = 0.0;
        let mut present = Vec::with_capacity(values.len());

        for value in values.iter().flatten().copied() {
            min = Some(min.map_or(value, |m| m.min(value)));
            max = Some(max.map_or(value, |m| m.max(value)));
            sum += value;
            present.push(value);
        }

        let null_count = values.len() - present.len();
        Self {
            min,
            max,
            sum,
            mean: sum / present.len() as f64,
            median: median(&mut present),
            null_count,
            count: values.len(),
        }
    }

    /// Number of non-null values.
    pub fn valid_count(&self) -> usize {
        self.count - self.null_count
    }
}

fn median(values: &mut [f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) / 2.0
    }
}
