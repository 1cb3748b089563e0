use serde::Serialize;

use crate::data::Dataset;
use crate::stats;

/// Square Pearson matrix over the numeric columns, in column order.
///
/// Entries are NaN where the coefficient is undefined (zero variance or
/// fewer than two complete pairs).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, row: &str, col: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == row)?;
        let j = self.columns.iter().position(|c| c == col)?;
        Some(self.values[i][j])
    }
}

pub(super) fn correlation_matrix(dataset: &Dataset) -> CorrelationMatrix {
    let numeric: Vec<_> = dataset.columns().iter().filter(|c| c.is_numeric()).collect();
    let series: Vec<Vec<Option<f64>>> = numeric.iter().map(|c| c.floats()).collect();
    let n = numeric.len();

    let mut values = vec![vec![f64::NAN; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let r = if i == j {
                // Diagonal is 1 unless the column has no spread.
                let self_corr = stats::pearson(&series[i], &series[i]);
                if self_corr.is_nan() {
                    f64::NAN
                } else {
                    1.0
                }
            } else {
                stats::pearson(&series[i], &series[j])
            };
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        columns: numeric.iter().map(|c| c.name.clone()).collect(),
        values,
    }
}
