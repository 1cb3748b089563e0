//! Visualization Dispatcher: the "Exploratory Data Analysis" page.
//!
//! Each [`AnalysisKind`] maps to one computation over the numeric dataset
//! and yields structured data a renderer can draw (matrices, binned counts,
//! density curves, grouped tables, proportions). Nothing here draws.

mod correlation;
mod distribution;
mod grouped;
mod proportion;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

pub use correlation::CorrelationMatrix;
pub use distribution::{ColumnDistribution, DiagonalPanel, PairGrid, ScatterPanel};
pub use grouped::{GroupRow, GroupedMeans};
pub use proportion::{Proportions, Slice};

use crate::data::Dataset;
use crate::error::{ExplorerError, Result};
use crate::profile::FrequencyTable;

// ---------------------------------------------------------------------------
// Analysis kinds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    CorrelationHeatmap,
    Histograms,
    CategoricalBars,
    PairPlot,
    GroupedByWindDirection,
    StationComparison,
    PollutantPieChart,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 7] = [
        AnalysisKind::CorrelationHeatmap,
        AnalysisKind::Histograms,
        AnalysisKind::CategoricalBars,
        AnalysisKind::PairPlot,
        AnalysisKind::GroupedByWindDirection,
        AnalysisKind::StationComparison,
        AnalysisKind::PollutantPieChart,
    ];

    /// Label shown in the plot-type selector.
    pub fn label(self) -> &'static str {
        match self {
            AnalysisKind::CorrelationHeatmap => "Correlation Heatmap",
            AnalysisKind::Histograms => "Histograms for All Numerical Variables",
            AnalysisKind::CategoricalBars => "Bar Plots for Categorical Variables",
            AnalysisKind::PairPlot => "Pair Plot",
            AnalysisKind::GroupedByWindDirection => "Grouped Bar Chart by Wind Direction",
            AnalysisKind::StationComparison => "Station Comparison",
            AnalysisKind::PollutantPieChart => "Pie Chart of Pollutant Distribution",
        }
    }

    /// Stable machine name, e.g. `correlation_heatmap`.
    pub fn name(self) -> &'static str {
        match self {
            AnalysisKind::CorrelationHeatmap => "correlation_heatmap",
            AnalysisKind::Histograms => "histograms",
            AnalysisKind::CategoricalBars => "categorical_bars",
            AnalysisKind::PairPlot => "pair_plot",
            AnalysisKind::GroupedByWindDirection => "grouped_by_wind_direction",
            AnalysisKind::StationComparison => "station_comparison",
            AnalysisKind::PollutantPieChart => "pollutant_pie_chart",
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AnalysisKind {
    type Err = ExplorerError;

    /// Accepts either the selector label or the machine name.
    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        AnalysisKind::ALL
            .into_iter()
            .find(|k| k.label().eq_ignore_ascii_case(wanted) || k.name() == wanted)
            .ok_or_else(|| ExplorerError::UnsupportedAnalysisKind(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Options and results
// ---------------------------------------------------------------------------

/// Rendering constants shared by all analyses.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOptions {
    pub histogram_bins: usize,
    pub density_points: usize,
    /// Lower triangle plus diagonal only.
    pub pair_plot_corner: bool,
    /// Thin each scatter panel to at most this many points.
    pub pair_plot_max_points: Option<usize>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            histogram_bins: 30,
            density_points: 200,
            pair_plot_corner: true,
            pair_plot_max_points: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum AnalysisResult {
    CorrelationHeatmap(CorrelationMatrix),
    Histograms(Vec<ColumnDistribution>),
    CategoricalBars(Vec<FrequencyTable>),
    PairPlot(PairGrid),
    GroupedByWindDirection(GroupedMeans),
    StationComparison(GroupedMeans),
    PollutantPieChart(Proportions),
}

impl AnalysisResult {
    pub fn kind(&self) -> AnalysisKind {
        match self {
            AnalysisResult::CorrelationHeatmap(_) => AnalysisKind::CorrelationHeatmap,
            AnalysisResult::Histograms(_) => AnalysisKind::Histograms,
            AnalysisResult::CategoricalBars(_) => AnalysisKind::CategoricalBars,
            AnalysisResult::PairPlot(_) => AnalysisKind::PairPlot,
            AnalysisResult::GroupedByWindDirection(_) => AnalysisKind::GroupedByWindDirection,
            AnalysisResult::StationComparison(_) => AnalysisKind::StationComparison,
            AnalysisResult::PollutantPieChart(_) => AnalysisKind::PollutantPieChart,
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Run one analysis with the default options.
pub fn analyze(dataset: &Dataset, kind: AnalysisKind) -> Result<AnalysisResult> {
    analyze_with(dataset, kind, &AnalysisOptions::default())
}

/// Run one analysis by its label or machine name.
pub fn analyze_named(dataset: &Dataset, kind: &str) -> Result<AnalysisResult> {
    analyze(dataset, kind.parse()?)
}

/// Run one analysis. Empty datasets are rejected up front so no kind ever
/// returns an all-NaN or empty table.
pub fn analyze_with(
    dataset: &Dataset,
    kind: AnalysisKind,
    options: &AnalysisOptions,
) -> Result<AnalysisResult> {
    if dataset.is_empty() {
        return Err(ExplorerError::EmptyDataset);
    }
    log::debug!("running {} over {} rows", kind.name(), dataset.len());

    let result = match kind {
        AnalysisKind::CorrelationHeatmap => {
            AnalysisResult::CorrelationHeatmap(correlation::correlation_matrix(dataset))
        }
        AnalysisKind::Histograms => {
            AnalysisResult::Histograms(distribution::histograms(dataset, options)?)
        }
        AnalysisKind::CategoricalBars => {
            AnalysisResult::CategoricalBars(grouped::categorical_bars(dataset)?)
        }
        AnalysisKind::PairPlot => {
            AnalysisResult::PairPlot(distribution::pair_grid(dataset, options)?)
        }
        AnalysisKind::GroupedByWindDirection => {
            AnalysisResult::GroupedByWindDirection(grouped::by_wind_direction(dataset)?)
        }
        AnalysisKind::StationComparison => {
            AnalysisResult::StationComparison(grouped::by_station(dataset)?)
        }
        AnalysisKind::PollutantPieChart => {
            AnalysisResult::PollutantPieChart(proportion::pollutant_shares(dataset)?)
        }
    };
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Column;

    #[test]
    fn kinds_parse_from_labels_and_names() {
        for kind in AnalysisKind::ALL {
            assert_eq!(kind.label().parse::<AnalysisKind>().unwrap(), kind);
            assert_eq!(kind.name().parse::<AnalysisKind>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_kind_is_unsupported() {
        let err = "Violin Plot".parse::<AnalysisKind>().unwrap_err();
        assert_eq!(err, ExplorerError::UnsupportedAnalysisKind("Violin Plot".into()));
    }

    #[test]
    fn every_kind_rejects_an_empty_dataset() {
        let empty = Dataset::new(vec![Column::numeric("PM2.5", Vec::<f64>::new())]).unwrap();
        for kind in AnalysisKind::ALL {
            assert_eq!(analyze(&empty, kind), Err(ExplorerError::EmptyDataset));
        }
    }

    #[test]
    fn result_reports_its_kind() {
        let ds = Dataset::new(vec![Column::numeric("a", [1.0, 2.0])]).unwrap();
        let result = analyze(&ds, AnalysisKind::CorrelationHeatmap).unwrap();
        assert_eq!(result.kind(), AnalysisKind::CorrelationHeatmap);
    }
}
