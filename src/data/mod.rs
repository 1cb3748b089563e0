//! Data layer: core types, loading, column sets and grouping.
//!
//! Architecture:
//! ```text
//!  .csv / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader  │  parse file → Dataset
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ Dataset  │  Vec<Column>, typed cells, equal lengths
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  group   │  key column → ordered row indices per value
//!   └──────────┘
//! ```

pub mod columns;
pub mod group;
pub mod loader;
pub mod model;

pub use loader::load_file;
pub use model::{CellValue, Column, ColumnKind, DType, Dataset};
