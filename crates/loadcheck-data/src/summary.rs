//! Per-column descriptive statistics.

use std::fmt;

/// Count, mean, sample standard deviation, and quartiles of one column.
///
/// Statistics of an empty column are NaN; the standard deviation of a
/// single value is NaN (it uses the `n - 1` denominator).
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl ColumnSummary {
    pub(crate) fn from_values(name: &str, values: &[f64]) -> Self {
        let count = values.len();
        let mut sorted = values.to_vec();
        sorted.sort_unstable_by(f64::total_cmp);

        let mean = if count == 0 {
            f64::NAN
        } else {
            values.iter().sum::<f64>() / count as f64
        };
        let std = if count < 2 {
            f64::NAN
        } else {
            let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (count - 1) as f64).sqrt()
        };

        Self {
            name: name.to_string(),
            count,
            mean,
            std,
            min: quantile(&sorted, 0.0),
            q25: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q75: quantile(&sorted, 0.75),
            max: quantile(&sorted, 1.0),
        }
    }
}

/// Linear interpolation between the two closest ranks of sorted data.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Summaries for a set of columns, printable as a table.
#[derive(Debug, Clone, PartialEq)]
pub struct Description {
    columns: Vec<ColumnSummary>,
}

impl Description {
    pub(crate) fn new(columns: Vec<ColumnSummary>) -> Self {
        Self { columns }
    }

    #[must_use]
    pub fn columns(&self) -> &[ColumnSummary] {
        &self.columns
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnSummary> {
        self.columns.iter().find(|c| c.name == name)
    }
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.columns.iter().map(|c| c.name.len()).max().unwrap_or(0);
        writeln!(
            f,
            "{:<width$} {:>7} {:>11} {:>11} {:>11} {:>11} {:>11} {:>11} {:>11}",
            "", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
        )?;
        for c in &self.columns {
            writeln!(
                f,
                "{:<width$} {:>7} {:>11.4} {:>11.4} {:>11.4} {:>11.4} {:>11.4} {:>11.4} {:>11.4}",
                c.name, c.count, c.mean, c.std, c.min, c.q25, c.median, c.q75, c.max
            )?;
        }
        Ok(())
    }
}
