use serde::Serialize;

use crate::color::{generate_palette, Rgb};
use crate::data::columns::{
    CATEGORICAL_COLUMNS, STATION, STATION_COLUMNS, WIND_DIRECTION, WIND_GROUP_COLUMNS,
};
use crate::data::group::{group_rows, mean_over};
use crate::data::{CellValue, Dataset};
use crate::error::Result;
use crate::profile::{frequency_table, FrequencyTable};

/// One group of a grouped-mean table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRow {
    pub key: CellValue,
    /// Number of rows in the group.
    pub size: usize,
    /// One mean per value column, same order as `GroupedMeans::value_columns`.
    pub means: Vec<f64>,
    /// Height of the stacked bar: sum of the finite means.
    pub stack_total: f64,
}

/// Per-group column means, one row per observed key value, sorted by key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedMeans {
    pub group_column: String,
    pub value_columns: Vec<String>,
    pub series_colors: Vec<Rgb>,
    pub stacked: bool,
    pub rows: Vec<GroupRow>,
}

impl GroupedMeans {
    pub fn row(&self, key: &CellValue) -> Option<&GroupRow> {
        self.rows.iter().find(|r| &r.key == key)
    }

    pub fn mean(&self, key: &CellValue, column: &str) -> Option<f64> {
        let idx = self.value_columns.iter().position(|c| c == column)?;
        self.row(key).map(|r| r.means[idx])
    }
}

pub(super) fn categorical_bars(dataset: &Dataset) -> Result<Vec<FrequencyTable>> {
    CATEGORICAL_COLUMNS
        .iter()
        .map(|&name| Ok(frequency_table(dataset.require(name)?)))
        .collect()
}

pub(super) fn by_wind_direction(dataset: &Dataset) -> Result<GroupedMeans> {
    grouped_means(dataset, WIND_DIRECTION, &WIND_GROUP_COLUMNS, false)
}

pub(super) fn by_station(dataset: &Dataset) -> Result<GroupedMeans> {
    grouped_means(dataset, STATION, &STATION_COLUMNS, true)
}

fn grouped_means(
    dataset: &Dataset,
    group_column: &str,
    value_columns: &[&str],
    stacked: bool,
) -> Result<GroupedMeans> {
    let key = dataset.require(group_column)?;
    let values = value_columns
        .iter()
        .map(|&name| dataset.require(name))
        .collect::<Result<Vec<_>>>()?;

    let rows = group_rows(key)
        .into_iter()
        .map(|group| {
            let means: Vec<f64> = values.iter().map(|col| mean_over(col, &group.rows)).collect();
            let stack_total = means.iter().filter(|m| m.is_finite()).sum();
            GroupRow {
                key: group.key,
                size: group.rows.len(),
                means,
                stack_total,
            }
        })
        .collect();

    Ok(GroupedMeans {
        group_column: group_column.to_string(),
        value_columns: value_columns.iter().map(|c| c.to_string()).collect(),
        series_colors: generate_palette(value_columns.len()),
        stacked,
        rows,
    })
}
