//! Profiling, exploratory analysis and PM2.5 inference over air-quality
//! station data.
//!
//! The three entry points are independent and take explicit handles:
//!
//! * [`profile::profile`] – shape, dtypes, statistics, nulls, duplicates
//! * [`analysis::analyze`] – one of the [`analysis::AnalysisKind`] charts
//! * [`inference::predict`] – one prediction from a feature map
//!
//! [`session::Session`] bundles the datasets and model for a user.

pub mod analysis;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod inference;
pub mod profile;
pub mod session;
pub mod stats;

pub use error::{ExplorerError, Result};
