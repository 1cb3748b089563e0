use serde::Serialize;

use crate::color::{generate_palette, Rgb};
use crate::data::columns::STATION_COLUMNS;
use crate::data::Dataset;
use crate::error::{ExplorerError, Result};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub label: String,
    pub sum: f64,
    pub fraction: f64,
    pub color: Rgb,
}

/// Column totals as fractions of their grand total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Proportions {
    pub total: f64,
    pub slices: Vec<Slice>,
}

impl Proportions {
    pub fn fraction_of(&self, label: &str) -> Option<f64> {
        self.slices
            .iter()
            .find(|s| s.label == label)
            .map(|s| s.fraction)
    }
}

pub(super) fn pollutant_shares(dataset: &Dataset) -> Result<Proportions> {
    let sums = STATION_COLUMNS
        .iter()
        .map(|&name| Ok(dataset.require(name)?.finite_values().iter().sum::<f64>()))
        .collect::<Result<Vec<f64>>>()?;

    let total: f64 = sums.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return Err(ExplorerError::UndefinedProportions { total });
    }

    let colors = generate_palette(sums.len());
    let slices = STATION_COLUMNS
        .iter()
        .zip(sums)
        .zip(colors)
        .map(|((&label, sum), color)| {
            if sum < 0.0 {
                log::warn!("column {label} sums to {sum}; its share is negative");
            }
            Slice {
                label: label.to_string(),
                sum,
                fraction: sum / total,
                color,
            }
        })
        .collect();

    Ok(Proportions { total, slices })
}
