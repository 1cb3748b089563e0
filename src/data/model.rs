use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::error::{ExplorerError, Result};

// ---------------------------------------------------------------------------
// CellValue – a single cell of a column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring the Pandas dtypes we care about.
/// Used as a `HashSet` / grouping key downstream, so `CellValue` must be
/// `Eq + Ord + Hash` even though it carries floats.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Integer(i64),
    Float(f64),
    Text(String),
    Null,
}

// -- Manual Eq/Ord so we can group and deduplicate on CellValue --

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use std::cmp::Ordering;
        use CellValue::*;
        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Null, _) => Ordering::Greater,
            (_, Null) => Ordering::Less,
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Integer(a), Float(b)) => (*a as f64).total_cmp(b).then(Ordering::Less),
            (Float(a), Integer(b)) => a.total_cmp(&(*b as f64)).then(Ordering::Greater),
            (Text(a), Text(b)) => a.cmp(b),
            // Numbers sort before text.
            (Text(_), _) => Ordering::Greater,
            (_, Text(_)) => Ordering::Less,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Text(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Null => write!(f, "NaN"),
        }
    }
}

impl CellValue {
    /// Try to interpret the value as an `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

// ---------------------------------------------------------------------------
// Column – one named, typed series
// ---------------------------------------------------------------------------

/// Whether a column holds measurements or labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

/// Storage dtype, named the way Pandas reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DType {
    #[serde(rename = "int64")]
    Int64,
    #[serde(rename = "float64")]
    Float64,
    #[serde(rename = "object")]
    Object,
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DType::Int64 => write!(f, "int64"),
            DType::Float64 => write!(f, "float64"),
            DType::Object => write!(f, "object"),
        }
    }
}

/// A single named column with its inferred dtype.
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub dtype: DType,
    pub values: Vec<CellValue>,
}

impl Column {
    /// Build a column from loosely-typed cells, unifying them into one dtype.
    ///
    /// * any text cell → `object`, every non-null cell becomes text
    /// * any float cell or any null → `float64`, integers are widened
    /// * otherwise → `int64`
    pub fn from_cells(name: impl Into<String>, cells: Vec<CellValue>) -> Self {
        let has_text = cells.iter().any(|c| matches!(c, CellValue::Text(_)));
        let has_float_or_null = cells
            .iter()
            .any(|c| matches!(c, CellValue::Float(_) | CellValue::Null));

        let (dtype, values) = if has_text {
            let values = cells
                .into_iter()
                .map(|c| match c {
                    CellValue::Null => CellValue::Null,
                    CellValue::Text(s) => CellValue::Text(s),
                    other => CellValue::Text(other.to_string()),
                })
                .collect();
            (DType::Object, values)
        } else if has_float_or_null || cells.is_empty() {
            let values = cells
                .into_iter()
                .map(|c| match c {
                    CellValue::Integer(i) => CellValue::Float(i as f64),
                    CellValue::Float(v) if v.is_nan() => CellValue::Null,
                    // -0.0 and 0.0 are one value for grouping and dedup.
                    CellValue::Float(v) if v == 0.0 => CellValue::Float(0.0),
                    other => other,
                })
                .collect();
            (DType::Float64, values)
        } else {
            (DType::Int64, cells)
        };

        Column {
            name: name.into(),
            dtype,
            values,
        }
    }

    /// Numeric column from raw floats; NaN marks a missing value.
    pub fn numeric(name: impl Into<String>, values: impl IntoIterator<Item = f64>) -> Self {
        let cells = values
            .into_iter()
            .map(|v| if v.is_nan() { CellValue::Null } else { CellValue::Float(v) })
            .collect();
        Column::from_cells(name, cells)
    }

    /// Categorical column from labels; `None` marks a missing value.
    pub fn categorical<S: Into<String>>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = Option<S>>,
    ) -> Self {
        let values = values
            .into_iter()
            .map(|v| v.map_or(CellValue::Null, |s| CellValue::Text(s.into())))
            .collect();
        Column {
            name: name.into(),
            dtype: DType::Object,
            values,
        }
    }

    pub fn kind(&self) -> ColumnKind {
        match self.dtype {
            DType::Object => ColumnKind::Categorical,
            DType::Int64 | DType::Float64 => ColumnKind::Numeric,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.kind() == ColumnKind::Numeric
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Per-row numeric view; `None` for nulls and text.
    pub fn floats(&self) -> Vec<Option<f64>> {
        self.values.iter().map(CellValue::as_f64).collect()
    }

    /// Numeric values with nulls dropped.
    pub fn finite_values(&self) -> Vec<f64> {
        self.values.iter().filter_map(CellValue::as_f64).collect()
    }

    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_null()).count()
    }

    /// Number of distinct non-null values.
    pub fn unique_count(&self) -> usize {
        self.values
            .iter()
            .filter(|v| !v.is_null())
            .collect::<HashSet<_>>()
            .len()
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// An immutable table of equally long, uniquely named columns.
#[derive(Debug, Clone)]
pub struct Dataset {
    columns: Vec<Column>,
    rows: usize,
}

impl Dataset {
    /// Assemble a dataset, rejecting ragged or duplicate columns.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let rows = columns.first().map_or(0, Column::len);
        let mut seen = HashSet::new();
        for column in &columns {
            if column.len() != rows {
                return Err(ExplorerError::DataLoad {
                    origin: "<in-memory>".into(),
                    reason: format!(
                        "column '{}' has {} values but '{}' has {rows}",
                        column.name,
                        column.len(),
                        columns[0].name
                    ),
                });
            }
            if !seen.insert(column.name.as_str()) {
                return Err(ExplorerError::DataLoad {
                    origin: "<in-memory>".into(),
                    reason: format!("duplicate column name '{}'", column.name),
                });
            }
        }
        Ok(Dataset { columns, rows })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Like [`Dataset::column`] but fails with `MissingColumn`.
    pub fn require(&self, name: &str) -> Result<&Column> {
        self.column(name).ok_or_else(|| ExplorerError::MissingColumn {
            column: name.to_string(),
        })
    }

    /// The ordered tuple of cell values of one row.
    pub fn row(&self, index: usize) -> Vec<&CellValue> {
        self.columns.iter().map(|c| &c.values[index]).collect()
    }
}
