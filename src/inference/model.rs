//! Pre-fitted regressors and their JSON artifacts.
//!
//! The service only ever sees a [`Regressor`]: a list of fit-time feature
//! names plus a `predict` over a [`FeatureFrame`]. Two artifact layouts are
//! understood:
//!
//! ```json
//! { "kind": "linear", "feature_names": [...], "coefficients": [...], "intercept": 1.5 }
//! { "kind": "forest", "feature_names": [...], "trees": [ { "children_left": [...], ... } ] }
//! ```

use std::collections::HashSet;
use std::fmt::Debug;
use std::path::Path;

use anyhow::{bail, ensure, Context};
use serde::Deserialize;

use super::schema::{FeatureFrame, FEATURE_COLUMNS};
use crate::error::{ExplorerError, Result};

/// Leaf marker in the array tree layout.
const LEAF: i64 = -1;

// ---------------------------------------------------------------------------
// Capability interface
// ---------------------------------------------------------------------------

/// An opaque, already-fitted model.
pub trait Regressor: Debug + Send + Sync {
    /// Feature names in fit-time order.
    fn feature_names(&self) -> &[String];

    /// Predict one value per row of `frame`.
    fn predict(&self, frame: &FeatureFrame) -> anyhow::Result<Vec<f64>>;
}

fn check_columns(expected: &[String], frame: &FeatureFrame) -> anyhow::Result<()> {
    ensure!(
        frame.columns() == expected,
        "frame columns {:?} do not match model features {:?}",
        frame.columns(),
        expected
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Linear model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LinearRegressor {
    feature_names: Vec<String>,
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearRegressor {
    pub fn new(
        feature_names: Vec<String>,
        coefficients: Vec<f64>,
        intercept: f64,
    ) -> anyhow::Result<Self> {
        let model = Self {
            feature_names,
            coefficients,
            intercept,
        };
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.coefficients.len() == self.feature_names.len(),
            "{} coefficients for {} features",
            self.coefficients.len(),
            self.feature_names.len()
        );
        Ok(())
    }
}

impl Regressor for LinearRegressor {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict(&self, frame: &FeatureFrame) -> anyhow::Result<Vec<f64>> {
        check_columns(&self.feature_names, frame)?;
        ensure!(
            self.coefficients.len() == frame.values().len(),
            "{} coefficients for {} features",
            self.coefficients.len(),
            frame.values().len()
        );
        let y = frame
            .values()
            .iter()
            .zip(&self.coefficients)
            .map(|(x, w)| x * w)
            .sum::<f64>()
            + self.intercept;
        Ok(vec![y])
    }
}

// ---------------------------------------------------------------------------
// Tree ensemble
// ---------------------------------------------------------------------------

/// A binary regression tree in parallel-array layout.
///
/// Node `i` is a leaf when `children_left[i] == -1`; otherwise rows with
/// `x[feature[i]] <= threshold[i]` go to `children_left[i]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RegressionTree {
    children_left: Vec<i64>,
    children_right: Vec<i64>,
    feature: Vec<i64>,
    threshold: Vec<f64>,
    value: Vec<f64>,
}

impl RegressionTree {
    fn validate(&self, num_features: usize) -> anyhow::Result<()> {
        let n = self.children_left.len();
        ensure!(n > 0, "tree has no nodes");
        for (field, len) in [
            ("children_right", self.children_right.len()),
            ("feature", self.feature.len()),
            ("threshold", self.threshold.len()),
            ("value", self.value.len()),
        ] {
            ensure!(len == n, "{field} has {len} entries, expected {n}");
        }
        for node in 0..n {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left == LEAF {
                ensure!(right == LEAF, "node {node} has only one child");
                continue;
            }
            for child in [left, right] {
                ensure!(
                    child > node as i64 && (child as usize) < n,
                    "node {node} references child {child} but tree has {n} nodes"
                );
            }
            let feature = self.feature[node];
            ensure!(
                feature >= 0 && (feature as usize) < num_features,
                "node {node} splits on feature {feature} of {num_features}"
            );
        }
        Ok(())
    }

    /// Walk from the root to a leaf. Malformed arrays are errors, and a walk
    /// longer than the node count means a cycle.
    fn predict_row(&self, row: &[f64]) -> anyhow::Result<f64> {
        let n = self.children_left.len();
        let mut node = 0usize;
        for _ in 0..=n {
            let left = *self
                .children_left
                .get(node)
                .with_context(|| format!("node {node} out of range for {n} nodes"))?;
            if left == LEAF {
                return self
                    .value
                    .get(node)
                    .copied()
                    .with_context(|| format!("leaf {node} has no value"));
            }
            let feature = self.feature.get(node).copied().unwrap_or(LEAF);
            let x = usize::try_from(feature)
                .ok()
                .and_then(|f| row.get(f))
                .with_context(|| format!("node {node} splits on missing feature {feature}"))?;
            let threshold = *self
                .threshold
                .get(node)
                .with_context(|| format!("node {node} has no threshold"))?;
            let next = if *x <= threshold {
                left
            } else {
                *self
                    .children_right
                    .get(node)
                    .with_context(|| format!("node {node} has no right child"))?
            };
            node = usize::try_from(next)
                .map_err(|_| anyhow::anyhow!("node {node} references child {next}"))?;
        }
        bail!("tree walk exceeded {n} nodes; children form a cycle")
    }
}

/// Mean of several regression trees.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ForestRegressor {
    feature_names: Vec<String>,
    trees: Vec<RegressionTree>,
}

impl ForestRegressor {
    fn validate(&self) -> anyhow::Result<()> {
        ensure!(!self.trees.is_empty(), "forest has no trees");
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.feature_names.len())
                .with_context(|| format!("tree {i}"))?;
        }
        Ok(())
    }
}

impl Regressor for ForestRegressor {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict(&self, frame: &FeatureFrame) -> anyhow::Result<Vec<f64>> {
        check_columns(&self.feature_names, frame)?;
        ensure!(!self.trees.is_empty(), "forest has no trees");
        let mut sum = 0.0;
        for (i, tree) in self.trees.iter().enumerate() {
            sum += tree
                .predict_row(frame.values())
                .with_context(|| format!("tree {i}"))?;
        }
        Ok(vec![sum / self.trees.len() as f64])
    }
}

// ---------------------------------------------------------------------------
// Artifact loading
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    Linear(LinearRegressor),
    Forest(ForestRegressor),
}

impl ModelArtifact {
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        let artifact: ModelArtifact = serde_json::from_str(text).context("parsing model JSON")?;
        Ok(artifact)
    }

    fn feature_names(&self) -> &[String] {
        match self {
            ModelArtifact::Linear(m) => &m.feature_names,
            ModelArtifact::Forest(m) => &m.feature_names,
        }
    }

    /// Structural checks, then compatibility with the expected input schema
    /// (same fields, any fit-time order).
    pub fn into_regressor(self, schema: &[&str]) -> anyhow::Result<Box<dyn Regressor>> {
        let names = self.feature_names();
        let unique: HashSet<&str> = names.iter().map(String::as_str).collect();
        ensure!(unique.len() == names.len(), "duplicate feature names in {names:?}");
        let wanted: HashSet<&str> = schema.iter().copied().collect();
        if unique != wanted {
            bail!("model features {names:?} are incompatible with the expected schema {schema:?}");
        }

        Ok(match self {
            ModelArtifact::Linear(m) => {
                m.validate()?;
                Box::new(m)
            }
            ModelArtifact::Forest(m) => {
                m.validate()?;
                Box::new(m)
            }
        })
    }
}

/// Load a JSON model artifact and check it against the air-quality schema.
pub fn load_model(path: &Path) -> Result<Box<dyn Regressor>> {
    load_model_with_schema(path, &FEATURE_COLUMNS)
}

pub fn load_model_with_schema(path: &Path, schema: &[&str]) -> Result<Box<dyn Regressor>> {
    let load = || -> anyhow::Result<Box<dyn Regressor>> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        if ext != "json" {
            bail!("unsupported model format: .{ext}");
        }
        let text = std::fs::read_to_string(path).context("reading model file")?;
        ModelArtifact::from_json(&text)?.into_regressor(schema)
    };
    let model = load().map_err(|err| ExplorerError::model_load(path.display(), err))?;
    log::info!(
        "loaded model with {} features from {}",
        model.feature_names().len(),
        path.display()
    );
    Ok(model)
}
