//! Inference Service: the "Modeling and Prediction" page.

pub mod model;
pub mod schema;

pub use model::{load_model, load_model_with_schema, ModelArtifact, Regressor};
pub use schema::{FeatureFrame, FeatureInput, FeatureMap, FEATURE_COLUMNS};

use crate::error::{ExplorerError, Result};

/// Validate `features` against the model's fit-time schema, assemble the
/// single-row frame in that order, and return the model's one prediction.
///
/// Nothing is retried; every failure is returned as-is.
pub fn predict(model: &dyn Regressor, features: &FeatureMap) -> Result<f64> {
    let frame = FeatureFrame::assemble(model.feature_names(), features)?;
    let output = model
        .predict(&frame)
        .map_err(|err| ExplorerError::ModelInference {
            reason: format!("{err:#}"),
        })?;
    let prediction = output
        .first()
        .copied()
        .ok_or_else(|| ExplorerError::ModelInference {
            reason: "model returned no predictions".into(),
        })?;
    log::debug!("predicted {prediction}");
    Ok(prediction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::LinearRegressor;

    #[derive(Debug)]
    struct Failing(Vec<String>);

    impl Regressor for Failing {
        fn feature_names(&self) -> &[String] {
            &self.0
        }

        fn predict(&self, _frame: &FeatureFrame) -> anyhow::Result<Vec<f64>> {
            anyhow::bail!("backend exploded")
        }
    }

    #[derive(Debug)]
    struct Silent(Vec<String>);

    impl Regressor for Silent {
        fn feature_names(&self) -> &[String] {
            &self.0
        }

        fn predict(&self, _frame: &FeatureFrame) -> anyhow::Result<Vec<f64>> {
            Ok(Vec::new())
        }
    }

    fn schema() -> Vec<String> {
        FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect()
    }

    fn features() -> FeatureMap {
        FEATURE_COLUMNS
            .iter()
            .map(|&name| (name.to_string(), FeatureInput::Number(1.0)))
            .collect()
    }

    #[test]
    fn prediction_is_deterministic() {
        let coefficients = (1..=12).map(|i| i as f64 * 0.1).collect();
        let model = LinearRegressor::new(schema(), coefficients, 3.0).unwrap();
        let first = predict(&model, &features()).unwrap();
        let second = predict(&model, &features()).unwrap();
        assert_eq!(first.to_bits(), second.to_bits());
    }

    #[test]
    fn backend_failures_become_inference_errors() {
        let err = predict(&Failing(schema()), &features()).unwrap_err();
        assert!(matches!(
            err,
            ExplorerError::ModelInference { ref reason } if reason.contains("exploded")
        ));
    }

    #[test]
    fn empty_output_is_an_inference_error() {
        let err = predict(&Silent(schema()), &features()).unwrap_err();
        assert!(matches!(err, ExplorerError::ModelInference { .. }));
    }

    #[test]
    fn validation_runs_before_the_model() {
        let mut features = features();
        features.remove("PM10");
        let err = predict(&Failing(schema()), &features).unwrap_err();
        assert_eq!(
            err,
            ExplorerError::MissingFeature {
                feature: "PM10".into()
            }
        );
    }
}
