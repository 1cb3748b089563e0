use serde::Serialize;

use super::AnalysisOptions;
use crate::data::columns::NUMERIC_COLUMNS;
use crate::data::Dataset;
use crate::error::Result;
use crate::stats::{self, DensityCurve, Histogram};

/// Histogram KDE curves stay inside the observed range.
const HISTOGRAM_KDE_CUT: f64 = 0.0;
/// Pair-plot diagonal curves extend three bandwidths past the data.
const PAIR_KDE_CUT: f64 = 3.0;

/// Binned counts plus a smoothed density for one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDistribution {
    pub column: String,
    pub observations: usize,
    pub histogram: Histogram,
    pub density: Option<DensityCurve>,
}

/// Density curve on the pair-grid diagonal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagonalPanel {
    pub column: String,
    pub density: Option<DensityCurve>,
}

/// One off-diagonal scatter cell at grid position (`row`, `col`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPanel {
    pub row: usize,
    pub col: usize,
    pub x_column: String,
    pub y_column: String,
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairGrid {
    pub columns: Vec<String>,
    pub corner: bool,
    pub diagonal: Vec<DiagonalPanel>,
    pub panels: Vec<ScatterPanel>,
}

impl PairGrid {
    pub fn panel(&self, row: usize, col: usize) -> Option<&ScatterPanel> {
        self.panels.iter().find(|p| p.row == row && p.col == col)
    }
}

pub(super) fn histograms(
    dataset: &Dataset,
    options: &AnalysisOptions,
) -> Result<Vec<ColumnDistribution>> {
    NUMERIC_COLUMNS
        .iter()
        .map(|&name| {
            let values = dataset.require(name)?.finite_values();
            Ok(ColumnDistribution {
                column: name.to_string(),
                observations: values.len(),
                histogram: stats::histogram(&values, options.histogram_bins),
                density: stats::gaussian_kde(&values, options.density_points, HISTOGRAM_KDE_CUT),
            })
        })
        .collect()
}

/// Scatter panels for every ordered pair of the numeric columns; with
/// `corner` set only the lower triangle (row > col) is kept, so each
/// unordered pair appears once.
pub(super) fn pair_grid(dataset: &Dataset, options: &AnalysisOptions) -> Result<PairGrid> {
    let series = NUMERIC_COLUMNS
        .iter()
        .map(|&name| Ok(dataset.require(name)?.floats()))
        .collect::<Result<Vec<_>>>()?;

    let diagonal = NUMERIC_COLUMNS
        .iter()
        .zip(&series)
        .map(|(&name, values)| {
            let present: Vec<f64> = values.iter().flatten().copied().collect();
            DiagonalPanel {
                column: name.to_string(),
                density: stats::gaussian_kde(&present, options.density_points, PAIR_KDE_CUT),
            }
        })
        .collect();

    let mut panels = Vec::new();
    for row in 0..series.len() {
        for col in 0..series.len() {
            let keep = if options.pair_plot_corner {
                row > col
            } else {
                row != col
            };
            if !keep {
                continue;
            }
            let points: Vec<[f64; 2]> = series[col]
                .iter()
                .zip(&series[row])
                .filter_map(|(x, y)| Some([(*x)?, (*y)?]))
                .collect();
            panels.push(ScatterPanel {
                row,
                col,
                x_column: NUMERIC_COLUMNS[col].to_string(),
                y_column: NUMERIC_COLUMNS[row].to_string(),
                points: thin(points, options.pair_plot_max_points),
            });
        }
    }
    log::debug!("pair grid built with {} scatter panels", panels.len());

    Ok(PairGrid {
        columns: NUMERIC_COLUMNS.iter().map(|c| c.to_string()).collect(),
        corner: options.pair_plot_corner,
        diagonal,
        panels,
    })
}

/// Keep every k-th point so at most `max` remain; deterministic.
fn thin(points: Vec<[f64; 2]>, max: Option<usize>) -> Vec<[f64; 2]> {
    match max {
        Some(max) if max > 0 && points.len() > max => {
            let stride = points.len().div_ceil(max);
            points.into_iter().step_by(stride).collect()
        }
        _ => points,
    }
}
