use std::collections::BTreeMap;

use super::model::{CellValue, Column};

// ---------------------------------------------------------------------------
// Group-by: which rows belong to each distinct key value
// ---------------------------------------------------------------------------

/// Row indices for one distinct key value.
#[derive(Debug, Clone)]
pub struct Group {
    pub key: CellValue,
    pub rows: Vec<usize>,
}

/// Partition row indices by the value of `key`.
///
/// * Null keys are dropped (they belong to no group).
/// * Groups come back sorted by key, rows within a group in table order.
pub fn group_rows(key: &Column) -> Vec<Group> {
    let mut groups: BTreeMap<&CellValue, Vec<usize>> = BTreeMap::new();
    for (idx, value) in key.values.iter().enumerate() {
        if value.is_null() {
            continue;
        }
        groups.entry(value).or_default().push(idx);
    }
    groups
        .into_iter()
        .map(|(key, rows)| Group {
            key: key.clone(),
            rows,
        })
        .collect()
}

/// Mean of `column` over the given rows, skipping nulls; NaN if none remain.
pub fn mean_over(column: &Column, rows: &[usize]) -> f64 {
    let (sum, n) = rows
        .iter()
        .filter_map(|&r| column.values[r].as_f64())
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        f64::NAN
    } else {
        sum / n as f64
    }
}
