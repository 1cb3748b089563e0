use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ExplorerError, Result};

/// Model inputs in the order the regressor was fitted with.
pub const FEATURE_COLUMNS: [&str; 12] = [
    "PM10", "SO2", "NO2", "CO", "O3", "TEMP", "PRES", "DEWP", "RAIN", "wd", "WSPM", "station",
];

// ---------------------------------------------------------------------------
// FeatureInput – one user-supplied value
// ---------------------------------------------------------------------------

/// A value as it arrives from a form field: already a number, or text that
/// still has to be coerced. `wd` and `station` must be numeric codes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureInput {
    Number(f64),
    Text(String),
}

impl FeatureInput {
    /// Coerce to a finite float.
    pub fn as_number(&self) -> Option<f64> {
        let value = match self {
            FeatureInput::Number(v) => *v,
            FeatureInput::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

impl fmt::Display for FeatureInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureInput::Number(v) => write!(f, "{v}"),
            FeatureInput::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<f64> for FeatureInput {
    fn from(v: f64) -> Self {
        FeatureInput::Number(v)
    }
}

impl From<i64> for FeatureInput {
    fn from(v: i64) -> Self {
        FeatureInput::Number(v as f64)
    }
}

impl From<&str> for FeatureInput {
    fn from(s: &str) -> Self {
        FeatureInput::Text(s.to_string())
    }
}

impl From<String> for FeatureInput {
    fn from(s: String) -> Self {
        FeatureInput::Text(s)
    }
}

/// Feature name → user value. Iteration order is never relied upon.
pub type FeatureMap = BTreeMap<String, FeatureInput>;

// ---------------------------------------------------------------------------
// FeatureFrame – the single-row table handed to the model
// ---------------------------------------------------------------------------

/// One row of named numeric features, in fit-time column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureFrame {
    columns: Vec<String>,
    values: Vec<f64>,
}

impl FeatureFrame {
    /// Build the row by walking `schema` in order and looking each name up
    /// in `features`.
    ///
    /// Fails on the first schema field that is absent or not numeric.
    /// Fields not in the schema are ignored.
    pub fn assemble<S: AsRef<str>>(schema: &[S], features: &FeatureMap) -> Result<Self> {
        let mut columns = Vec::with_capacity(schema.len());
        let mut values = Vec::with_capacity(schema.len());
        for name in schema {
            let name = name.as_ref();
            let input = features
                .get(name)
                .ok_or_else(|| ExplorerError::MissingFeature {
                    feature: name.to_string(),
                })?;
            let value = input
                .as_number()
                .ok_or_else(|| ExplorerError::InvalidFeatureType {
                    feature: name.to_string(),
                    value: input.to_string(),
                })?;
            columns.push(name.to_string());
            values.push(value);
        }

        let extras: Vec<&str> = features
            .keys()
            .map(String::as_str)
            .filter(|k| !columns.iter().any(|c| c == k))
            .collect();
        if !extras.is_empty() {
            log::warn!("ignoring unexpected features: {}", extras.join(", "));
        }

        log::debug!("assembled feature row {columns:?}");
        Ok(FeatureFrame { columns, values })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        let idx = self.columns.iter().position(|c| c == column)?;
        Some(self.values[idx])
    }
}
