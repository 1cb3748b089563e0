//! Dataset Profiler: the "Data Overview" page as structured data.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::Serialize;

use crate::data::{load_file, CellValue, Column, ColumnKind, DType, Dataset};
use crate::error::Result;
use crate::stats;

/// Column name and its storage dtype.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub dtype: DType,
    pub kind: ColumnKind,
}

/// `describe()`-style statistics of one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    #[serde(rename = "25%")]
    pub q25: f64,
    #[serde(rename = "50%")]
    pub median: f64,
    #[serde(rename = "75%")]
    pub q75: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingCount {
    pub column: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UniqueCount {
    pub column: String,
    pub unique: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyEntry {
    pub value: CellValue,
    pub count: usize,
}

/// Value counts of one column, most frequent first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyTable {
    pub column: String,
    pub entries: Vec<FrequencyEntry>,
}

impl FrequencyTable {
    pub fn count_of(&self, value: &CellValue) -> Option<usize> {
        self.entries
            .iter()
            .find(|e| &e.value == value)
            .map(|e| e.count)
    }
}

/// Read-only summary of a [`Dataset`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileReport {
    pub row_count: usize,
    pub column_count: usize,
    pub columns: Vec<ColumnInfo>,
    pub summary: Vec<NumericSummary>,
    /// Only columns with at least one null.
    pub missing: Vec<MissingCount>,
    pub duplicate_rows: usize,
    pub unique_counts: Vec<UniqueCount>,
    /// One table per categorical column; empty when there are none.
    pub categorical_frequencies: Vec<FrequencyTable>,
}

impl ProfileReport {
    pub fn summary_of(&self, column: &str) -> Option<&NumericSummary> {
        self.summary.iter().find(|s| s.column == column)
    }

    pub fn unique_count_of(&self, column: &str) -> Option<usize> {
        self.unique_counts
            .iter()
            .find(|u| u.column == column)
            .map(|u| u.unique)
    }
}

/// Profile a loaded dataset. Pure; never fails.
pub fn profile(dataset: &Dataset) -> ProfileReport {
    let columns = dataset
        .columns()
        .iter()
        .map(|c| ColumnInfo {
            name: c.name.clone(),
            dtype: c.dtype,
            kind: c.kind(),
        })
        .collect();

    let summary = dataset
        .columns()
        .iter()
        .filter(|c| c.is_numeric())
        .map(describe)
        .collect();

    let missing = dataset
        .columns()
        .iter()
        .map(|c| MissingCount {
            column: c.name.clone(),
            count: c.null_count(),
        })
        .filter(|m| m.count > 0)
        .collect();

    let unique_counts = dataset
        .columns()
        .iter()
        .map(|c| UniqueCount {
            column: c.name.clone(),
            unique: c.unique_count(),
        })
        .collect();

    let categorical_frequencies = dataset
        .columns()
        .iter()
        .filter(|c| !c.is_numeric())
        .map(frequency_table)
        .collect();

    ProfileReport {
        row_count: dataset.len(),
        column_count: dataset.column_count(),
        columns,
        summary,
        missing,
        duplicate_rows: duplicate_row_count(dataset),
        unique_counts,
        categorical_frequencies,
    }
}

/// Load `path` and profile it; load failures surface as `DataLoad`.
pub fn profile_file(path: &Path) -> Result<ProfileReport> {
    let dataset = load_file(path)?;
    Ok(profile(&dataset))
}

/// Count, mean, std, min, quartiles and max over the non-null values.
pub fn describe(column: &Column) -> NumericSummary {
    let mut values = column.finite_values();
    values.sort_by(f64::total_cmp);
    NumericSummary {
        column: column.name.clone(),
        count: values.len(),
        mean: stats::mean(&values),
        std: stats::sample_std(&values),
        min: values.first().copied().unwrap_or(f64::NAN),
        q25: stats::quantile_sorted(&values, 0.25),
        median: stats::quantile_sorted(&values, 0.5),
        q75: stats::quantile_sorted(&values, 0.75),
        max: values.last().copied().unwrap_or(f64::NAN),
    }
}

/// Rows whose full tuple already appeared earlier in the table.
pub fn duplicate_row_count(dataset: &Dataset) -> usize {
    let mut seen: HashSet<Vec<&CellValue>> = HashSet::with_capacity(dataset.len());
    (0..dataset.len())
        .filter(|&i| !seen.insert(dataset.row(i)))
        .count()
}

/// Value counts, descending by count; ties keep first-seen order.
pub fn frequency_table(column: &Column) -> FrequencyTable {
    let mut index: HashMap<&CellValue, usize> = HashMap::new();
    let mut entries: Vec<FrequencyEntry> = Vec::new();
    for value in column.values.iter().filter(|v| !v.is_null()) {
        match index.get(value) {
            Some(&i) => entries[i].count += 1,
            None => {
                index.insert(value, entries.len());
                entries.push(FrequencyEntry {
                    value: value.clone(),
                    count: 1,
                });
            }
        }
    }
    // Stable sort keeps first-seen order among equal counts.
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    FrequencyTable {
        column: column.name.clone(),
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_rows() -> Dataset {
        Dataset::new(vec![
            Column::numeric("PM2.5", [10.0, 10.0, 5.0]),
            Column::numeric("PM10", [20.0, 20.0, 8.0]),
        ])
        .unwrap()
    }

    #[test]
    fn repeated_row_counts_once() {
        let report = profile(&three_rows());
        assert_eq!(report.row_count, 3);
        assert_eq!(report.column_count, 2);
        assert_eq!(report.duplicate_rows, 1);
        assert_eq!(report.unique_count_of("PM2.5"), Some(2));
    }

    #[test]
    fn missing_report_omits_complete_columns() {
        let ds = Dataset::new(vec![
            Column::numeric("PM2.5", [1.0, f64::NAN, 3.0]),
            Column::numeric("PM10", [1.0, 2.0, 3.0]),
        ])
        .unwrap();
        let report = profile(&ds);
        assert_eq!(
            report.missing,
            vec![MissingCount {
                column: "PM2.5".into(),
                count: 1
            }]
        );
        assert!(report.missing.iter().all(|m| m.count > 0));
    }

    #[test]
    fn summary_covers_numeric_columns_in_order() {
        let ds = Dataset::new(vec![
            Column::numeric("TEMP", [1.0, 2.0, 3.0, 4.0]),
            Column::categorical("wd", [Some("N"), Some("N"), Some("E"), None]),
            Column::numeric("PRES", [10.0, 10.0, 10.0, 10.0]),
        ])
        .unwrap();
        let report = profile(&ds);
        let names: Vec<&str> = report.summary.iter().map(|s| s.column.as_str()).collect();
        assert_eq!(names, ["TEMP", "PRES"]);

        let temp = report.summary_of("TEMP").unwrap();
        assert_eq!(temp.count, 4);
        assert_eq!(temp.mean, 2.5);
        assert_eq!(temp.q25, 1.75);
        assert_eq!(temp.max, 4.0);
        assert_eq!(report.summary_of("PRES").unwrap().std, 0.0);
    }

    #[test]
    fn frequency_tables_only_for_categorical_columns() {
        let ds = Dataset::new(vec![
            Column::categorical("wd", [Some("E"), Some("N"), Some("N"), Some("S")]),
            Column::numeric("WSPM", [1.0, 2.0, 3.0, 4.0]),
        ])
        .unwrap();
        let report = profile(&ds);
        assert_eq!(report.categorical_frequencies.len(), 1);
        let wd = &report.categorical_frequencies[0];
        let labels: Vec<String> = wd.entries.iter().map(|e| e.value.to_string()).collect();
        assert_eq!(labels, ["N", "E", "S"]);
        assert_eq!(wd.count_of(&CellValue::Text("N".into())), Some(2));
    }

    #[test]
    fn nulls_count_as_equal_for_duplicates() {
        let ds = Dataset::new(vec![
            Column::numeric("a", [f64::NAN, f64::NAN, 1.0]),
            Column::categorical("b", [None::<&str>, None, Some("x")]),
        ])
        .unwrap();
        assert_eq!(duplicate_row_count(&ds), 1);
    }
}
