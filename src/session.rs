use std::sync::Arc;

use crate::analysis::{self, AnalysisKind, AnalysisOptions, AnalysisResult};
use crate::config::ExplorerConfig;
use crate::data::{load_file, Dataset};
use crate::error::Result;
use crate::inference::{self, load_model, FeatureMap, Regressor};
use crate::profile::{self, ProfileReport};

// ---------------------------------------------------------------------------
// Session – the resources one user works against
// ---------------------------------------------------------------------------

/// Both datasets and the model, loaded once and only ever read.
///
/// Cloning is cheap and clones share the same underlying data, so a
/// session can be handed to concurrent requests without locking.
#[derive(Debug, Clone)]
pub struct Session {
    /// Table with categorical columns; backs the overview.
    pub raw: Arc<Dataset>,
    /// Continuous-only table; backs the analyses.
    pub numeric: Arc<Dataset>,
    pub model: Arc<dyn Regressor>,
    pub options: AnalysisOptions,
}

impl Session {
    pub fn new(raw: Dataset, numeric: Dataset, model: Box<dyn Regressor>) -> Self {
        Self {
            raw: Arc::new(raw),
            numeric: Arc::new(numeric),
            model: Arc::from(model),
            options: AnalysisOptions::default(),
        }
    }

    /// Load every resource named in `config`. Any failure is terminal for
    /// the session.
    pub fn open(config: &ExplorerConfig) -> Result<Self> {
        let raw = load_file(&config.raw_dataset)?;
        let numeric = load_file(&config.numeric_dataset)?;
        let model = load_model(&config.model)?;
        let mut session = Session::new(raw, numeric, model);
        session.options = config.analysis_options();
        Ok(session)
    }

    /// Overview of the raw table.
    pub fn profile(&self) -> ProfileReport {
        profile::profile(&self.raw)
    }

    pub fn analyze(&self, kind: AnalysisKind) -> Result<AnalysisResult> {
        analysis::analyze_with(&self.numeric, kind, &self.options)
    }

    /// Analysis by selector label or machine name.
    pub fn analyze_named(&self, kind: &str) -> Result<AnalysisResult> {
        self.analyze(kind.parse()?)
    }

    pub fn predict(&self, features: &FeatureMap) -> Result<f64> {
        inference::predict(self.model.as_ref(), features)
    }
}
