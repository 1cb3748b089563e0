use std::path::PathBuf;

use confique::Config;

use crate::analysis::AnalysisOptions;
use crate::error::{ExplorerError, Result};

/// Optional settings file read from the working directory.
pub const CONFIG_FILE: &str = "airq.toml";

#[derive(Debug, Config)]
pub struct ExplorerConfig {
    /// Table with the categorical `wd` / `station` labels.
    #[config(env = "AIRQ_RAW_DATASET", default = "air_quality.csv")]
    pub raw_dataset: PathBuf,

    /// Continuous-only table used by the exploratory analyses.
    #[config(env = "AIRQ_NUMERIC_DATASET", default = "air_quality_numerical.csv")]
    pub numeric_dataset: PathBuf,

    #[config(env = "AIRQ_MODEL", default = "model.json")]
    pub model: PathBuf,

    #[config(env = "AIRQ_HISTOGRAM_BINS", default = 30)]
    pub histogram_bins: usize,

    #[config(env = "AIRQ_DENSITY_POINTS", default = 200)]
    pub density_points: usize,

    #[config(env = "AIRQ_PAIR_PLOT_CORNER", default = true)]
    pub pair_plot_corner: bool,

    #[config(env = "AIRQ_PAIR_PLOT_MAX_POINTS")]
    pub pair_plot_max_points: Option<usize>,

    /// JSON object of feature values to predict from in the report binary.
    #[config(env = "AIRQ_FEATURES")]
    pub features: Option<PathBuf>,
}

impl ExplorerConfig {
    /// Environment variables first, then `airq.toml`, then defaults.
    pub fn load() -> Result<ExplorerConfig> {
        let config = ExplorerConfig::builder()
            .env()
            .file(CONFIG_FILE)
            .load()
            .map_err(|err| ExplorerError::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.histogram_bins == 0 {
            return Err(ExplorerError::Config("histogram_bins must be positive".into()));
        }
        if self.density_points < 2 {
            return Err(ExplorerError::Config("density_points must be at least 2".into()));
        }
        Ok(())
    }

    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            histogram_bins: self.histogram_bins,
            density_points: self.density_points,
            pair_plot_corner: self.pair_plot_corner,
            pair_plot_max_points: self.pair_plot_max_points,
        }
    }
}
