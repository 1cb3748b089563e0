use thiserror::Error;

/// Every failure the profiler, dispatcher and inference service surface.
///
/// Display strings are meant to be shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExplorerError {
    #[error("could not load dataset from {origin}: {reason}")]
    DataLoad { origin: String, reason: String },

    #[error("cannot aggregate over an empty dataset")]
    EmptyDataset,

    #[error("unsupported analysis kind: '{0}'")]
    UnsupportedAnalysisKind(String),

    #[error("dataset has no column named '{column}'")]
    MissingColumn { column: String },

    #[error("proportions are undefined when the total is {total}")]
    UndefinedProportions { total: f64 },

    #[error("missing required feature '{feature}'")]
    MissingFeature { feature: String },

    #[error("feature '{feature}' expects a number, got '{value}'")]
    InvalidFeatureType { feature: String, value: String },

    #[error("could not load model from {origin}: {reason}")]
    ModelLoad { origin: String, reason: String },

    #[error("model inference failed: {reason}")]
    ModelInference { reason: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ExplorerError {
    pub(crate) fn data_load(origin: impl ToString, err: anyhow::Error) -> Self {
        ExplorerError::DataLoad {
            origin: origin.to_string(),
            reason: format!("{err:#}"),
        }
    }

    pub(crate) fn model_load(origin: impl ToString, err: anyhow::Error) -> Self {
        ExplorerError::ModelLoad {
            origin: origin.to_string(),
            reason: format!("{err:#}"),
        }
    }
}

pub type Result<T, E = ExplorerError> = std::result::Result<T, E>;
