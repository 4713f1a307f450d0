//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the tabular input (`Dataset`) and model definitions (`RegressionSpec`)
//! - run configuration (`RunConfig`, `PrepConfig`, `DatasetSource`)
//! - fit outputs (`RegressionResult`, `RegressionOutcome`)

pub mod config;
pub mod types;

pub use config::*;
pub use types::*;
